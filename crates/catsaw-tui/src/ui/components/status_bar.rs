use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::Theme;
use catsaw_types::StatusSnapshot;

/// Status bar showing keyboard shortcuts
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<String>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Right text only when it does not overlap the hints
        if let Some(right) = self.right_text {
            let width = right.width() as u16;
            let right_span = Span::styled(&right, Theme::status_bar());
            let right_x = area.x + area.width.saturating_sub(width + 2);
            if right_x > area.x + line_width + 2 {
                buf.set_span(right_x, area.y, &right_span, width);
            }
        }
    }
}

/// Hints for the log view
pub fn log_view_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("l/L", "Level"),
        ("s/S", "Search"),
        ("p/P", "Package"),
        ("Space", "Pause"),
        ("f", "Freeze"),
        ("?", "Help"),
        ("q", "Quit"),
    ]
}

/// One-line rendering of the engine status
pub struct EngineStatus<'a> {
    snapshot: &'a StatusSnapshot,
}

impl<'a> EngineStatus<'a> {
    pub fn new(snapshot: &'a StatusSnapshot) -> Self {
        Self { snapshot }
    }

    /// Filter description shown after the state badge
    pub fn describe(snapshot: &StatusSnapshot) -> String {
        let mut parts = Vec::new();
        if let Some(identity) = &snapshot.identity_label {
            parts.push(format!("app {}", identity));
        }
        if let Some(level) = &snapshot.level_label {
            parts.push(format!("level {}", level));
        }
        if let Some(highlight) = &snapshot.highlight_label {
            parts.push(format!("search {}", highlight));
        }
        if snapshot.freeze_on_match {
            parts.push("freeze on match".to_string());
        }
        if snapshot.suppressed > 0 {
            parts.push(format!("{} suppressed", snapshot.suppressed));
        }
        if snapshot.buffered > 0 {
            parts.push(format!("{} buffered", snapshot.buffered));
        }
        if parts.is_empty() {
            "no filters".to_string()
        } else {
            parts.join(" · ")
        }
    }
}

impl Widget for EngineStatus<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", self.snapshot.state.label()),
                Theme::stream_state(self.snapshot.state),
            ),
            Span::styled(format!(" {}", Self::describe(self.snapshot)), Theme::status_bar()),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);

        let total = format!("{} suppressed total ", self.snapshot.suppressed_total);
        let width = total.width() as u16;
        let right_x = area.x + area.width.saturating_sub(width);
        if right_x > area.x + line.width() as u16 + 1 {
            buf.set_string(right_x, area.y, &total, Theme::status_bar());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsaw_types::StreamState;

    #[test]
    fn test_describe_without_filters() {
        assert_eq!(EngineStatus::describe(&StatusSnapshot::default()), "no filters");
    }

    #[test]
    fn test_describe_lists_active_filters() {
        let snapshot = StatusSnapshot {
            state: StreamState::Paused,
            suppressed: 12,
            buffered: 3,
            identity_label: Some("com.example (1234)".into()),
            level_label: Some("≥Warn".into()),
            highlight_label: Some("/boom/".into()),
            freeze_on_match: true,
            ..Default::default()
        };
        assert_eq!(
            EngineStatus::describe(&snapshot),
            "app com.example (1234) · level ≥Warn · search /boom/ · freeze on match · 12 suppressed · 3 buffered"
        );
    }

    #[test]
    fn test_render_shows_state_badge() {
        let snapshot = StatusSnapshot {
            state: StreamState::Paused,
            ..Default::default()
        };
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        EngineStatus::new(&snapshot).render(area, &mut buf);

        let row: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(row.starts_with(" PAUSED "));
        assert!(row.trim_end().ends_with("0 suppressed total"));
    }
}
