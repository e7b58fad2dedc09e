use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    LogView,
    TextInput,
    Menu,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings, active in every context
        let mut global = HashMap::new();
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Log view: filter commands and scrollback navigation
        let mut log_view = HashMap::new();
        log_view.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        log_view.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        log_view.insert(KeyBinding::shift(KeyCode::Char('?')), Action::ToggleHelp);
        log_view.insert(KeyBinding::new(KeyCode::Esc), Action::DismissError);
        // Filters: lowercase sets, uppercase clears
        log_view.insert(KeyBinding::new(KeyCode::Char('l')), Action::OpenLevelMenu);
        log_view.insert(KeyBinding::shift(KeyCode::Char('L')), Action::ClearLevel);
        log_view.insert(KeyBinding::new(KeyCode::Char('s')), Action::OpenSearch);
        log_view.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        log_view.insert(KeyBinding::shift(KeyCode::Char('S')), Action::ClearSearch);
        log_view.insert(KeyBinding::new(KeyCode::Char('p')), Action::OpenPackageSearch);
        log_view.insert(KeyBinding::shift(KeyCode::Char('P')), Action::ClearPackage);
        log_view.insert(KeyBinding::new(KeyCode::Char('f')), Action::ToggleFreeze);
        // Stream control
        log_view.insert(KeyBinding::new(KeyCode::Char(' ')), Action::TogglePause);
        log_view.insert(KeyBinding::new(KeyCode::Enter), Action::InsertSeparator);
        log_view.insert(KeyBinding::new(KeyCode::Char('t')), Action::ToggleStatus);
        // Line navigation
        log_view.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        log_view.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        log_view.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        log_view.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        // Page navigation
        log_view.insert(KeyBinding::ctrl(KeyCode::Char('f')), Action::PageDown);
        log_view.insert(KeyBinding::ctrl(KeyCode::Char('b')), Action::PageUp);
        log_view.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        log_view.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        log_view.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        // Top/bottom
        log_view.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        log_view.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        log_view.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        log_view.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        bindings.insert(KeyContext::LogView, log_view);

        // Text prompts (search pattern, package search)
        let mut text_input = HashMap::new();
        text_input.insert(KeyBinding::new(KeyCode::Enter), Action::PromptSubmit);
        text_input.insert(KeyBinding::new(KeyCode::Esc), Action::PromptCancel);
        text_input.insert(KeyBinding::new(KeyCode::Backspace), Action::PromptBackspace);
        text_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PromptClear);
        bindings.insert(KeyContext::TextInput, text_input);

        // Menus (level picker, package picker)
        let mut menu = HashMap::new();
        menu.insert(KeyBinding::new(KeyCode::Up), Action::MenuUp);
        menu.insert(KeyBinding::new(KeyCode::Down), Action::MenuDown);
        menu.insert(KeyBinding::new(KeyCode::Char('k')), Action::MenuUp);
        menu.insert(KeyBinding::new(KeyCode::Char('j')), Action::MenuDown);
        menu.insert(KeyBinding::new(KeyCode::Enter), Action::MenuSelect);
        menu.insert(KeyBinding::new(KeyCode::Esc), Action::MenuCancel);
        menu.insert(KeyBinding::new(KeyCode::Char('q')), Action::MenuCancel);
        bindings.insert(KeyContext::Menu, menu);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        if let Some(action) = self
            .bindings
            .get(&KeyContext::Global)
            .and_then(|global| global.get(&binding))
        {
            return Some(action.clone());
        }

        let plain = key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT;

        // Level shortcuts inside the level menu
        if context == KeyContext::Menu && plain {
            if let KeyCode::Char(c) = key.code {
                if let Some(level) = catsaw_types::Severity::from_char(c.to_ascii_uppercase()) {
                    return Some(Action::SetLevel(level));
                }
            }
        }

        // Printable characters go into text prompts
        if context == KeyContext::TextInput {
            if let KeyCode::Char(c) = key.code {
                if plain {
                    return Some(Action::PromptInput(c));
                }
            }
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsaw_types::Severity;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shifted(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_command_keys() {
        let kb = KeyBindings::new();
        let ctx = KeyContext::LogView;
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Char('l'))), Some(Action::OpenLevelMenu));
        assert_eq!(kb.get_action(ctx, &shifted('L')), Some(Action::ClearLevel));
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Char('s'))), Some(Action::OpenSearch));
        assert_eq!(kb.get_action(ctx, &shifted('S')), Some(Action::ClearSearch));
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Char('p'))), Some(Action::OpenPackageSearch));
        assert_eq!(kb.get_action(ctx, &shifted('P')), Some(Action::ClearPackage));
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Enter)), Some(Action::InsertSeparator));
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Char(' '))), Some(Action::TogglePause));
    }

    #[test]
    fn test_quit_keys_work_everywhere() {
        let kb = KeyBindings::new();
        for ctx in [KeyContext::LogView, KeyContext::TextInput, KeyContext::Menu] {
            assert_eq!(kb.get_action(ctx, &ctrl('c')), Some(Action::Quit));
            assert_eq!(kb.get_action(ctx, &ctrl('d')), Some(Action::Quit));
        }
    }

    #[test]
    fn test_text_input_captures_characters() {
        let kb = KeyBindings::new();
        let ctx = KeyContext::TextInput;
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Char('q'))), Some(Action::PromptInput('q')));
        assert_eq!(kb.get_action(ctx, &shifted('L')), Some(Action::PromptInput('L')));
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Enter)), Some(Action::PromptSubmit));
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Esc)), Some(Action::PromptCancel));
        assert_eq!(kb.get_action(ctx, &ctrl('x')), None);
    }

    #[test]
    fn test_menu_level_shortcuts() {
        let kb = KeyBindings::new();
        let ctx = KeyContext::Menu;
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Char('w'))), Some(Action::SetLevel(Severity::Warn)));
        assert_eq!(kb.get_action(ctx, &shifted('E')), Some(Action::SetLevel(Severity::Error)));
        // Navigation keys win over shortcuts
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Char('j'))), Some(Action::MenuDown));
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Enter)), Some(Action::MenuSelect));
    }

    #[test]
    fn test_menu_shortcuts_ignore_control_keys() {
        let kb = KeyBindings::new();
        let ctx = KeyContext::Menu;
        assert_eq!(kb.get_action(ctx, &key(KeyCode::Char('d'))), Some(Action::SetLevel(Severity::Debug)));
        assert_eq!(kb.get_action(ctx, &ctrl('d')), Some(Action::Quit));
        assert_eq!(kb.get_action(ctx, &ctrl('w')), None);
    }
}
