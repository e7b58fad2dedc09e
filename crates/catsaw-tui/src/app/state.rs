use ratatui::widgets::ListState;

use catsaw_types::Severity;

/// What the bottom prompt area is currently asking for
#[derive(Debug, Default)]
pub enum Prompt {
    #[default]
    None,

    /// Free text for the highlight pattern
    Search { input: String },

    /// Free text for the package search
    PackageSearch { input: String },

    /// Pick a minimum severity
    LevelMenu { list_state: ListState },

    /// Pick one of several matching packages
    PackageMenu {
        items: Vec<String>,
        list_state: ListState,
    },
}

impl Prompt {
    pub fn level_menu(current: Option<Severity>) -> Self {
        let selected = current.map(|s| s.ordinal() as usize).unwrap_or(0);
        Self::LevelMenu {
            list_state: ListState::default().with_selected(Some(selected)),
        }
    }

    pub fn package_menu(items: Vec<String>) -> Self {
        Self::PackageMenu {
            items,
            list_state: ListState::default().with_selected(Some(0)),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Search { .. } | Self::PackageSearch { .. })
    }

    pub fn is_menu(&self) -> bool {
        matches!(self, Self::LevelMenu { .. } | Self::PackageMenu { .. })
    }

    /// Text typed so far, for text prompts
    pub fn input(&self) -> Option<&str> {
        match self {
            Self::Search { input } | Self::PackageSearch { input } => Some(input.as_str()),
            _ => None,
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Search { input } | Self::PackageSearch { input } => Some(input),
            _ => None,
        }
    }

    fn menu_len(&self) -> usize {
        match self {
            Self::LevelMenu { .. } => Severity::ALL.len(),
            Self::PackageMenu { items, .. } => items.len(),
            _ => 0,
        }
    }

    fn list_state_mut(&mut self) -> Option<&mut ListState> {
        match self {
            Self::LevelMenu { list_state } | Self::PackageMenu { list_state, .. } => {
                Some(list_state)
            }
            _ => None,
        }
    }

    /// Move the menu selection up, wrapping around
    pub fn menu_up(&mut self) {
        let len = self.menu_len();
        if let Some(state) = self.list_state_mut() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            state.select(Some(i));
        }
    }

    /// Move the menu selection down, wrapping around
    pub fn menu_down(&mut self) {
        let len = self.menu_len();
        if let Some(state) = self.list_state_mut() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(i) if i + 1 < len => i + 1,
                _ => 0,
            };
            state.select(Some(i));
        }
    }

    fn selected(&self) -> Option<usize> {
        match self {
            Self::LevelMenu { list_state } | Self::PackageMenu { list_state, .. } => {
                list_state.selected()
            }
            _ => None,
        }
    }

    /// Severity under the cursor of the level menu
    pub fn selected_level(&self) -> Option<Severity> {
        match self {
            Self::LevelMenu { .. } => Severity::ALL.get(self.selected()?).copied(),
            _ => None,
        }
    }

    /// Package under the cursor of the package menu
    pub fn selected_package(&self) -> Option<&str> {
        match self {
            Self::PackageMenu { items, .. } => items.get(self.selected()?).map(String::as_str),
            _ => None,
        }
    }
}

/// UI-specific transient state
pub struct UiState {
    pub prompt: Prompt,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Show the engine status line?
    pub show_status: bool,

    /// Scroll position in the scrollback
    pub log_scroll: usize,

    /// Follow mode: stick to the newest line
    pub auto_scroll: bool,

    /// Error message to display (if any)
    pub error_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            prompt: Prompt::None,
            help_visible: false,
            show_status: true,
            log_scroll: 0,
            auto_scroll: true,
            error_message: None,
        }
    }
}

/// Global application state
pub struct AppState {
    /// Serial of the device being viewed
    pub device: String,

    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Dirty flag for rendering - only render when true
    pub render_dirty: bool,
}

impl AppState {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ui_state: UiState::default(),
            should_quit: false,
            render_dirty: true,
        }
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.ui_state.error_message = Some(message.into());
        self.render_dirty = true;
    }

    pub fn dismiss_error(&mut self) {
        self.ui_state.error_message = None;
        self.render_dirty = true;
    }

    pub fn open_prompt(&mut self, prompt: Prompt) {
        self.ui_state.prompt = prompt;
        self.ui_state.error_message = None;
        self.render_dirty = true;
    }

    /// Close the prompt, returning what it held
    pub fn close_prompt(&mut self) -> Prompt {
        self.render_dirty = true;
        std::mem::take(&mut self.ui_state.prompt)
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.ui_state.auto_scroll = false;
        self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.ui_state.auto_scroll = false;
        // Clamped to the scrollback length at render time
        self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_add(n);
    }

    pub fn scroll_to_top(&mut self) {
        self.ui_state.auto_scroll = false;
        self.ui_state.log_scroll = 0;
    }

    /// Jump to the newest line and resume following
    pub fn scroll_to_bottom(&mut self) {
        self.ui_state.auto_scroll = true;
    }

    /// Keep the viewport on the same lines after `n` were evicted from the front
    pub fn lines_evicted(&mut self, n: usize) {
        if !self.ui_state.auto_scroll {
            self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_sub(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_menu_starts_on_current_level() {
        let prompt = Prompt::level_menu(Some(Severity::Warn));
        assert_eq!(prompt.selected_level(), Some(Severity::Warn));
        assert!(prompt.is_menu());
        assert!(!prompt.is_text());
    }

    #[test]
    fn test_menu_navigation_wraps() {
        let mut prompt = Prompt::level_menu(None);
        prompt.menu_up();
        assert_eq!(prompt.selected_level(), Some(Severity::Fatal));
        prompt.menu_down();
        assert_eq!(prompt.selected_level(), Some(Severity::Verbose));
        prompt.menu_down();
        assert_eq!(prompt.selected_level(), Some(Severity::Debug));
    }

    #[test]
    fn test_package_menu_selection() {
        let mut prompt = Prompt::package_menu(vec!["a.b".into(), "c.d".into()]);
        assert_eq!(prompt.selected_package(), Some("a.b"));
        prompt.menu_down();
        assert_eq!(prompt.selected_package(), Some("c.d"));
        assert_eq!(prompt.selected_level(), None);
    }

    #[test]
    fn test_text_prompt_input() {
        let mut prompt = Prompt::Search {
            input: String::new(),
        };
        prompt.input_mut().unwrap().push_str("boom");
        assert_eq!(prompt.input(), Some("boom"));
        assert!(prompt.is_open());
        assert!(!Prompt::None.is_open());
    }

    #[test]
    fn test_scrolling_leaves_follow_mode() {
        let mut state = AppState::new("emulator-5554");
        state.scroll_down(5);
        assert!(!state.ui_state.auto_scroll);
        state.scroll_up(2);
        assert_eq!(state.ui_state.log_scroll, 3);

        state.lines_evicted(2);
        assert_eq!(state.ui_state.log_scroll, 1);

        state.scroll_to_bottom();
        assert!(state.ui_state.auto_scroll);
    }

    #[test]
    fn test_close_prompt_returns_contents() {
        let mut state = AppState::new("x");
        state.open_prompt(Prompt::PackageSearch {
            input: "example".into(),
        });
        let prompt = state.close_prompt();
        assert_eq!(prompt.input(), Some("example"));
        assert!(!state.ui_state.prompt.is_open());
    }
}
