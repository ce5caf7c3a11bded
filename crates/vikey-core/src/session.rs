// Vikey Session Context
// Flags shared by the pipeline and the injector between keystrokes

use std::fmt;

/// Why the engine buffer was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetReason {
    /// Another app or text field took focus
    FocusChanged,
    /// Arrow keys, navigation combos or a mouse click moved the caret
    CursorMoved,
    /// A Command/Control/Option shortcut
    Shortcut,
    Tab,
    ForwardDelete,
    /// A held key auto-repeated; the repeats never reached the engine
    Repeat,
    /// Vietnamese typing switched off or on
    ModeToggled,
    MacrosChanged,
    /// Settings reloaded
    Reload,
}

impl ResetReason {
    /// The engine must not restore words typed after this reset, since
    /// the text around the caret is unknown
    pub fn moves_cursor(self) -> bool {
        matches!(self, ResetReason::CursorMoved)
    }
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResetReason::FocusChanged => "focus-changed",
            ResetReason::CursorMoved => "cursor-moved",
            ResetReason::Shortcut => "shortcut",
            ResetReason::Tab => "tab",
            ResetReason::ForwardDelete => "forward-delete",
            ResetReason::Repeat => "repeat",
            ResetReason::ModeToggled => "mode-toggled",
            ResetReason::MacrosChanged => "macros-changed",
            ResetReason::Reload => "reload",
        };
        write!(f, "{}", name)
    }
}

/// State that outlives a single keystroke but not the focused text field.
///
/// `typing_mid_sentence` is set once the caret has been moved into
/// existing text. The injector then never sends the Forward-Delete that
/// clears inline autocomplete, since it would eat real text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub typing_mid_sentence: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context after a reset for `reason`
    pub fn after_reset(self, reason: ResetReason) -> Self {
        match reason {
            ResetReason::CursorMoved => Self {
                typing_mid_sentence: true,
            },
            ResetReason::FocusChanged | ResetReason::ModeToggled => Self::default(),
            _ => self,
        }
    }
}
