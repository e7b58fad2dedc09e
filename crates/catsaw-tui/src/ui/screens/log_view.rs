use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::app::{AppState, Prompt};
use crate::ui::components::{EngineStatus, HelpOverlay, ListSelector, PromptBar, StatusBar, log_view_hints};
use crate::ui::scrollback::{DIAGNOSTIC_MARKER, Scrollback, ScrollbackLine};
use crate::ui::{Layout, Theme};
use catsaw_types::{RenderedLine, Severity, StatusSnapshot};

/// The single screen of the viewer: scrollback, prompt and status
pub struct LogViewScreen;

impl LogViewScreen {
    /// Draw the whole screen
    ///
    /// `fallback` is shown when the scrollback's own status is hidden.
    pub fn render(
        frame: &mut Frame,
        state: &mut AppState,
        scrollback: &Scrollback,
        fallback: &StatusSnapshot,
    ) {
        let show_prompt = state.ui_state.prompt.is_text() || state.ui_state.error_message.is_some();
        let status_rows = if state.ui_state.show_status { 2 } else { 1 };
        let (header, logs, prompt, status) = Layout::main(frame.area(), show_prompt, status_rows);

        let snapshot = scrollback.last_status().unwrap_or(fallback);

        Self::render_header(frame, header, state, snapshot);
        Self::render_logs(frame, logs, state, scrollback);
        if let Some(area) = prompt {
            Self::render_prompt(frame, area, state);
        }
        Self::render_status(frame, status, state, snapshot);

        if state.ui_state.prompt.is_menu() {
            Self::render_menu(frame, logs, state, snapshot);
        }

        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState, snapshot: &StatusSnapshot) {
        let app = snapshot.identity_label.as_deref().unwrap_or("all processes");
        let title = Line::from(vec![
            Span::styled(" catsaw", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(state.device.as_str(), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(app.to_string(), Theme::text_highlight()),
        ]);

        frame.render_widget(Paragraph::new(title), area);
    }

    fn render_logs(frame: &mut Frame, area: Rect, state: &mut AppState, scrollback: &Scrollback) {
        let total = scrollback.len();
        let height = area.height as usize;

        // Follow mode pins the view to the newest lines
        let max_scroll = total.saturating_sub(height);
        if state.ui_state.auto_scroll || state.ui_state.log_scroll > max_scroll {
            state.ui_state.log_scroll = max_scroll;
        }

        let lines: Vec<Line> = scrollback
            .window(state.ui_state.log_scroll, height)
            .map(|line| Self::format_line(line, area.width as usize))
            .collect();

        frame.render_widget(Paragraph::new(lines), area);

        if total > height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None);
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(state.ui_state.log_scroll);

            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }

    /// Turn one scrollback row into a styled line
    pub fn format_line(line: &ScrollbackLine, width: usize) -> Line<'static> {
        match line {
            ScrollbackLine::Record(rendered) => Self::format_record(rendered),
            ScrollbackLine::Diagnostic(text) => Line::from(Span::styled(
                format!("{}{}", DIAGNOSTIC_MARKER, text),
                Theme::diagnostic(),
            )),
            ScrollbackLine::Notice(text) => {
                Line::from(Span::styled(format!("» {}", text), Theme::notice()))
            }
            ScrollbackLine::Separator => {
                Line::from(Span::styled("─".repeat(width.max(1)), Theme::separator()))
            }
        }
    }

    fn format_record(rendered: &RenderedLine) -> Line<'static> {
        let spans: Vec<Span<'static>> = rendered
            .segments
            .iter()
            .map(|segment| {
                let style = if segment.highlighted {
                    Theme::record_match(rendered.severity)
                } else {
                    Theme::record(rendered.severity)
                };
                Span::styled(segment.text.clone(), style)
            })
            .collect();
        Line::from(spans)
    }

    fn render_prompt(frame: &mut Frame, area: Rect, state: &AppState) {
        let error = state.ui_state.error_message.as_deref();
        let label = match &state.ui_state.prompt {
            Prompt::Search { .. } => "Search",
            Prompt::PackageSearch { .. } => "Package",
            _ => {
                if let Some(err) = error {
                    let line = Line::from(vec![
                        Span::styled(format!(" ⚠ {}", err), Theme::error()),
                        Span::styled("  [Esc] Dismiss", Theme::text_dim()),
                    ]);
                    frame.render_widget(Paragraph::new(line), area);
                }
                return;
            }
        };

        let input = state.ui_state.prompt.input().unwrap_or_default();
        frame.render_widget(PromptBar::new(label, input).error(error), area);
    }

    fn render_status(frame: &mut Frame, area: Rect, state: &AppState, snapshot: &StatusSnapshot) {
        let mut hints_area = area;
        if state.ui_state.show_status && area.height > 1 {
            let engine_area = Rect::new(area.x, area.y, area.width, 1);
            frame.render_widget(EngineStatus::new(snapshot), engine_area);
            hints_area = Rect::new(area.x, area.y + 1, area.width, 1);
        }

        let follow = if state.ui_state.auto_scroll { "following ▼" } else { "scrolled" };
        frame.render_widget(
            StatusBar::new().hints(log_view_hints()).right(follow),
            hints_area,
        );
    }

    fn render_menu(frame: &mut Frame, area: Rect, state: &mut AppState, snapshot: &StatusSnapshot) {
        let current_level = snapshot
            .level_label
            .as_deref()
            .map(|label| label.trim_start_matches('≥'));

        match &mut state.ui_state.prompt {
            Prompt::LevelMenu { list_state } => {
                let selector = ListSelector::new(" Minimum level ").items(
                    Severity::ALL
                        .iter()
                        .map(|level| (level.label(), Some(level.label()) == current_level)),
                );
                let popup = Layout::centered(area, 30, selector.height());
                frame.render_stateful_widget(selector, popup, list_state);
            }
            Prompt::PackageMenu { items, list_state } => {
                let selector = ListSelector::new(" Select package ")
                    .items(items.iter().map(|name| (name.as_str(), false)));
                let width = items.iter().map(|n| n.len() as u16).max().unwrap_or(0) + 8;
                let popup = Layout::centered(area, width.max(30), selector.height());
                frame.render_stateful_widget(selector, popup, list_state);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsaw_types::Segment;
    use ratatui::{Terminal, backend::TestBackend};

    fn rendered_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_format_record_styles_matches() {
        let line = ScrollbackLine::Record(RenderedLine {
            severity: Some(Severity::Error),
            segments: vec![Segment::plain("a "), Segment::highlighted("boom"), Segment::plain(" b")],
        });
        let formatted = LogViewScreen::format_line(&line, 80);
        assert_eq!(formatted.spans.len(), 3);
        assert_eq!(formatted.spans[1].content, "boom");
        assert_eq!(formatted.spans[1].style, Theme::record_match(Some(Severity::Error)));
        assert_eq!(formatted.spans[0].style, Theme::record(Some(Severity::Error)));
    }

    #[test]
    fn test_format_diagnostic_and_separator() {
        let diag = LogViewScreen::format_line(&ScrollbackLine::Diagnostic("offline".into()), 80);
        assert_eq!(diag.spans[0].content, "adb: offline");

        let sep = LogViewScreen::format_line(&ScrollbackLine::Separator, 5);
        assert_eq!(sep.spans[0].content, "─────");
    }

    #[test]
    fn test_follow_mode_shows_newest_lines() {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let mut state = AppState::new("emulator-5554");
        let mut scrollback = Scrollback::new(100);
        for i in 0..20 {
            scrollback.push(ScrollbackLine::Notice(format!("line {}", i)));
        }

        terminal
            .draw(|frame| {
                LogViewScreen::render(frame, &mut state, &scrollback, &StatusSnapshot::default())
            })
            .unwrap();

        let text = rendered_text(&terminal);
        assert!(text.contains("line 19"));
        assert!(!text.contains("line 14"));
        assert!(text.contains("LIVE"));
        assert!(text.contains("emulator-5554"));
        // 8 rows: header, 5 log rows, 2 status rows
        assert_eq!(state.ui_state.log_scroll, 15);
    }

    #[test]
    fn test_prompt_row_shows_input() {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        let mut state = AppState::new("device");
        state.open_prompt(Prompt::Search {
            input: "boom".into(),
        });
        let scrollback = Scrollback::new(10);

        terminal
            .draw(|frame| {
                LogViewScreen::render(frame, &mut state, &scrollback, &StatusSnapshot::default())
            })
            .unwrap();

        assert!(rendered_text(&terminal).contains("Search: boom"));
    }
}
