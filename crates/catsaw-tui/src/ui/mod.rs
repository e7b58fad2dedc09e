pub mod components;
mod layout;
pub mod screens;
mod scrollback;
mod theme;

pub use layout::Layout;
pub use scrollback::{DIAGNOSTIC_MARKER, Scrollback, ScrollbackLine};
pub use theme::Theme;
