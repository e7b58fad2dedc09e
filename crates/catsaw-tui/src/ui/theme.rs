use ratatui::style::{Color, Modifier, Style};

use catsaw_types::{Severity, StreamState};

/// Color theme for the application
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Reset;
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    pub const PRIMARY: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::Yellow;

    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    pub fn border() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn text_highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    // Log lines
    pub fn record(severity: Option<Severity>) -> Style {
        match severity {
            Some(level) => Style::default().fg(level.color()),
            None => Self::text(),
        }
    }

    /// Matched text inside a record
    pub fn record_match(severity: Option<Severity>) -> Style {
        Self::record(severity)
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD)
    }

    pub fn diagnostic() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn notice() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn separator() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    // Lists
    pub fn list_item() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn list_item_selected() -> Style {
        Style::default()
            .fg(Self::BG)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn list_item_current() -> Style {
        Style::default()
            .fg(Self::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    // Status bar
    pub fn status_bar() -> Style {
        Style::default().fg(Self::FG).bg(Color::DarkGray)
    }

    pub fn status_bar_key() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    pub fn stream_state(state: StreamState) -> Style {
        let bg = match state {
            StreamState::Active => Self::SUCCESS,
            StreamState::Interacting => Self::PRIMARY,
            StreamState::Paused => Self::WARNING,
        };
        Style::default()
            .fg(Color::Black)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }
}
