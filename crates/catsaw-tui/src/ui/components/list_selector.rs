use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::ui::Theme;

/// Popup list used by the level and package menus
pub struct ListSelector<'a> {
    items: Vec<ListItem<'a>>,
    title: &'a str,
}

impl<'a> ListSelector<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            items: Vec::new(),
            title,
        }
    }

    /// Add items from an iterator of (display_text, is_current) tuples
    pub fn items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        self.items = items
            .into_iter()
            .map(|(text, is_current)| {
                let text = text.into();
                let content = if is_current {
                    Line::from(Span::styled(
                        format!("{} (current)", text),
                        Theme::list_item_current(),
                    ))
                } else {
                    Line::from(Span::styled(text, Theme::list_item()))
                };
                ListItem::new(content)
            })
            .collect();
        self
    }

    /// Rows needed to show every item inside the border
    pub fn height(&self) -> u16 {
        self.items.len() as u16 + 2
    }
}

impl StatefulWidget for ListSelector<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(self.title, Theme::title()));

        let list = List::new(self.items)
            .block(block)
            .highlight_style(Theme::list_item_selected())
            .highlight_symbol("▶ ");

        StatefulWidget::render(list, area, buf, state);
    }
}
