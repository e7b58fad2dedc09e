//! Keybindings and the settings file

mod keybindings;
mod settings;

pub use keybindings::{KeyBinding, KeyBindings, KeyContext};
pub use settings::{
    AdbSettings, FilterSettings, Settings, UiSettings, default_config_path, load_settings,
};
