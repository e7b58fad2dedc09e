//! TUI components for catsaw
//!
//! This crate provides the terminal user interface for catsaw, including
//! state management, keybindings, settings, event handling and the log view.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Prompt, UiState};
pub use config::{KeyBinding, KeyBindings, KeyContext, Settings, default_config_path, load_settings};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{EngineStatus, HelpOverlay, ListSelector, PromptBar, StatusBar};
pub use ui::screens::LogViewScreen;
pub use ui::{Layout, Scrollback, ScrollbackLine, Theme};
