use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{Level, debug, info};

use catsaw_adb::{AdbClient, DeviceBridge, select_device};
use catsaw_logs::{
    LogParser, LogcatEvent, LogcatStream, PackageMatch, RenderSink, StreamController,
    match_packages,
};
use catsaw_tui::{
    Action, AppState, Event, EventHandler, KeyBindings, KeyContext, LogViewScreen, Prompt,
    Scrollback, Settings, Tui, default_config_path, load_settings,
};

/// Lines moved by PageUp/PageDown
const PAGE: usize = 20;

/// catsaw - An interactive filter for adb logcat
#[derive(Parser, Debug)]
#[command(name = "catsaw")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Only show the app whose package name matches this pattern
    #[arg(short, long, value_name = "PATTERN")]
    package: Option<String>,

    /// Serial of the device to read from (required with several devices)
    #[arg(short, long)]
    serial: Option<String>,

    /// Settings file (defaults to ~/.catsaw/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Rendered lines kept for scrolling back
    #[arg(long)]
    buffer_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args)?;

    let result = run_app(args).await;

    // The terminal has been restored by now
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

fn settings_for(args: &Args) -> Settings {
    match args.config.clone().or_else(default_config_path) {
        Some(path) => load_settings(&path),
        None => Settings::default(),
    }
}

async fn run_app(args: Args) -> Result<()> {
    let settings = settings_for(&args);
    debug!("settings: {:?}", settings);

    // Pick the device before touching the terminal so errors print cleanly
    let client = AdbClient::new(settings.adb.path.clone());
    let devices = client.devices().context("Failed to list devices")?;
    let device = select_device(&devices, args.serial.as_deref())?;
    let client = client.with_serial(device.serial.clone());
    let year = client
        .session_year()
        .with_context(|| format!("Failed to query device {}", device.serial))?;
    info!("using device {} (year {})", device.serial, year);

    let mut controller = StreamController::new(year, settings.filter.controller_options());
    let mut scrollback = Scrollback::new(args.buffer_size.unwrap_or(settings.ui.scrollback));
    let mut parser = LogParser::new();

    let (logcat_tx, mut logcat_rx) = mpsc::unbounded_channel::<LogcatEvent>();
    let mut stream = LogcatStream::start(&client, logcat_tx).context("Failed to start logcat")?;

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(settings.ui.tick_rate_ms));
    let keybindings = KeyBindings::new();

    let mut state = AppState::new(device.serial.clone());
    state.ui_state.show_status = settings.ui.show_status;

    if let Some(term) = &args.package {
        controller.begin_interaction();
        search_packages(term, &mut state, &mut controller, &mut scrollback, &client);
    }

    let mut exit_code = None;
    let mut stream_ended = false;

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let context = if state.ui_state.prompt.is_text() {
                            KeyContext::TextInput
                        } else if state.ui_state.prompt.is_menu() {
                            KeyContext::Menu
                        } else {
                            KeyContext::LogView
                        };

                        if let Some(mut action) = keybindings.get_action(context, &key) {
                            // Any key closes the help overlay
                            if state.ui_state.help_visible && action != Action::Quit {
                                action = Action::ToggleHelp;
                            }
                            handle_action(&mut state, &mut controller, &mut scrollback, &client, action);
                        }
                    }
                    Event::Tick => {}
                    Event::Resize(_, _) => {
                        state.render_dirty = true;
                    }
                    Event::Error(e) => {
                        state.show_error(e);
                    }
                }
            }

            Some(event) = logcat_rx.recv() => {
                match event {
                    LogcatEvent::Chunk(bytes) => {
                        let records = parser.feed(&bytes);
                        controller.ingest(records, &client, &mut scrollback);
                    }
                    LogcatEvent::Stderr(line) => {
                        controller.diagnostic(&line, &mut scrollback);
                        scrollback.status(&controller.snapshot());
                    }
                    LogcatEvent::Exited { code } => {
                        parser.finish();
                        exit_code = code;
                        stream_ended = true;
                    }
                }
                state.render_dirty = true;
            }
        }

        if state.should_quit || stream_ended {
            break;
        }

        state.lines_evicted(scrollback.take_evicted());

        if state.render_dirty {
            let fallback = controller.snapshot();
            tui.terminal().draw(|frame| {
                LogViewScreen::render(frame, &mut state, &scrollback, &fallback)
            })?;
            state.render_dirty = false;
        }
    }

    // Cleanup
    stream.stop();
    events.shutdown();
    tui.restore()?;

    if stream_ended {
        match exit_code {
            Some(code) => println!("logcat exited with status {}", code),
            None => println!("logcat exited"),
        }
    }

    Ok(())
}

fn handle_action(
    state: &mut AppState,
    controller: &mut StreamController,
    scrollback: &mut Scrollback,
    client: &AdbClient,
    action: Action,
) {
    state.render_dirty = true;

    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::DismissError => {
            state.dismiss_error();
        }

        // Prompts hold the stream while they are open
        Action::OpenLevelMenu => {
            if controller.begin_interaction() {
                state.open_prompt(Prompt::level_menu(controller.filter().min_level));
            }
        }
        Action::OpenSearch => {
            if controller.begin_interaction() {
                state.open_prompt(Prompt::Search {
                    input: String::new(),
                });
            }
        }
        Action::OpenPackageSearch => {
            if controller.begin_interaction() {
                state.open_prompt(Prompt::PackageSearch {
                    input: String::new(),
                });
            }
        }

        Action::ClearLevel => controller.set_min_level(None, scrollback),
        Action::ClearSearch => controller.clear_highlight(scrollback),
        Action::ClearPackage => controller.clear_process(scrollback),
        Action::ToggleFreeze => {
            controller.toggle_freeze(scrollback);
        }
        Action::TogglePause => {
            controller.toggle_pause(scrollback);
        }
        Action::InsertSeparator => scrollback.separator(),
        Action::ToggleStatus => {
            state.ui_state.show_status = !state.ui_state.show_status;
        }

        // Text prompts
        Action::PromptInput(c) => {
            if let Some(input) = state.ui_state.prompt.input_mut() {
                input.push(c);
            }
        }
        Action::PromptBackspace => {
            if let Some(input) = state.ui_state.prompt.input_mut() {
                input.pop();
            }
        }
        Action::PromptClear => {
            if let Some(input) = state.ui_state.prompt.input_mut() {
                input.clear();
            }
        }
        Action::PromptSubmit => match state.close_prompt() {
            Prompt::Search { input } => match controller.set_highlight(&input, scrollback) {
                Ok(()) => controller.end_interaction(scrollback),
                Err(e) => {
                    // Keep the prompt open so the pattern can be fixed
                    state.open_prompt(Prompt::Search { input });
                    state.show_error(e.to_string());
                }
            },
            Prompt::PackageSearch { input } => {
                search_packages(&input, state, controller, scrollback, client);
            }
            other => state.open_prompt(other),
        },
        Action::PromptCancel | Action::MenuCancel => {
            state.close_prompt();
            controller.end_interaction(scrollback);
        }

        // Menus
        Action::MenuUp => state.ui_state.prompt.menu_up(),
        Action::MenuDown => state.ui_state.prompt.menu_down(),
        Action::SetLevel(level) => {
            if matches!(state.ui_state.prompt, Prompt::LevelMenu { .. }) {
                state.close_prompt();
                controller.set_min_level(Some(level), scrollback);
                controller.end_interaction(scrollback);
            }
        }
        Action::MenuSelect => {
            let prompt = state.close_prompt();
            if let Some(level) = prompt.selected_level() {
                controller.set_min_level(Some(level), scrollback);
            } else if let Some(name) = prompt.selected_package() {
                controller.select_process(name, client, scrollback);
            }
            controller.end_interaction(scrollback);
        }

        // Scrollback
        Action::ScrollUp(n) => state.scroll_up(n),
        Action::ScrollDown(n) => state.scroll_down(n),
        Action::PageUp => state.scroll_up(PAGE),
        Action::PageDown => state.scroll_down(PAGE),
        Action::ScrollToTop => state.scroll_to_top(),
        Action::ScrollToBottom => state.scroll_to_bottom(),
    }
}

/// Find packages matching `term` and monitor the result
///
/// Expects the controller to be interacting; a menu stays open when several
/// packages match, otherwise the interaction ends here.
fn search_packages(
    term: &str,
    state: &mut AppState,
    controller: &mut StreamController,
    scrollback: &mut Scrollback,
    client: &AdbClient,
) {
    let listing = client.list_packages();
    match match_packages(&listing, term) {
        Ok(PackageMatch::One(name)) => {
            controller.select_process(&name, client, scrollback);
            controller.end_interaction(scrollback);
        }
        Ok(PackageMatch::Many(names)) => {
            state.open_prompt(Prompt::package_menu(names));
        }
        Ok(PackageMatch::None) => {
            controller.end_interaction(scrollback);
            state.show_error("No matches found");
        }
        Err(e) => {
            state.open_prompt(Prompt::PackageSearch {
                input: term.to_string(),
            });
            state.show_error(e.to_string());
        }
    }
}
