use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::ui::Theme;

/// Single-line text prompt with a label and cursor
pub struct PromptBar<'a> {
    label: &'a str,
    input: &'a str,
    error: Option<&'a str>,
}

impl<'a> PromptBar<'a> {
    pub fn new(label: &'a str, input: &'a str) -> Self {
        Self {
            label,
            input,
            error: None,
        }
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }
}

impl Widget for PromptBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            Span::styled(
                format!(" {}: ", self.label),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(self.input, Theme::text_highlight()),
            Span::styled(
                "█",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ];

        if let Some(err) = self.error {
            spans.push(Span::styled(format!("  ⚠ {}", err), Theme::error()));
        } else {
            spans.push(Span::styled(
                "  [Enter] Apply  [Esc] Cancel",
                Theme::text_dim(),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
