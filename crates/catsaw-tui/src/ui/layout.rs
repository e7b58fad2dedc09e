use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Split the screen into header, log area, optional prompt row and status rows
    pub fn main(area: Rect, prompt: bool, status_rows: u16) -> (Rect, Rect, Option<Rect>, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                         // Header
                Constraint::Min(1),                            // Logs
                Constraint::Length(if prompt { 1 } else { 0 }), // Prompt
                Constraint::Length(status_rows),               // Status
            ])
            .split(area);

        let prompt_area = if prompt { Some(chunks[2]) } else { None };
        (chunks[0], chunks[1], prompt_area, chunks[3])
    }

    /// A box of the given size centered in `area`, clipped to fit
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(2));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}
