use catsaw_types::Severity;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,

    // Filter commands
    OpenLevelMenu,
    SetLevel(Severity),
    ClearLevel,
    OpenSearch,
    ClearSearch,
    OpenPackageSearch,
    ClearPackage,
    ToggleFreeze,

    // Stream control
    TogglePause,
    InsertSeparator,
    ToggleStatus,

    // Text prompts
    PromptInput(char),
    PromptBackspace,
    PromptClear,
    PromptSubmit,
    PromptCancel,

    // Menus
    MenuUp,
    MenuDown,
    MenuSelect,
    MenuCancel,

    // Scrollback navigation
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,

    DismissError,
}
