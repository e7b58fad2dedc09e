mod help_overlay;
mod list_selector;
mod prompt;
mod status_bar;

pub use help_overlay::HelpOverlay;
pub use list_selector::ListSelector;
pub use prompt::PromptBar;
pub use status_bar::{EngineStatus, StatusBar, log_view_hints};
