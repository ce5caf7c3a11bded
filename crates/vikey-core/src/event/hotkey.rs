// Vikey Hotkeys
// Chord matching on key-down and the modifier-only release state machine

use strum_macros::Display;

use crate::combo::Hotkey;
use crate::modifier::{Modifier, Modifiers};
use crate::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum HotkeyAction {
    ToggleVietnamese,
    UndoTyping,
    Toolbar,
    ConvertTool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBindings {
    pub toggle_vietnamese: Option<Hotkey>,
    pub undo_typing: Option<Hotkey>,
    pub toolbar: Option<Hotkey>,
    pub convert_tool: Option<Hotkey>,
}

impl Default for HotkeyBindings {
    /// Ctrl-Shift toggles Vietnamese; nothing else is bound
    fn default() -> Self {
        Self {
            toggle_vietnamese: Some(Hotkey::modifier_only(
                Modifiers::empty()
                    .with(Modifier::Control)
                    .with(Modifier::Shift),
            )),
            undo_typing: None,
            toolbar: None,
            convert_tool: None,
        }
    }
}

impl HotkeyBindings {
    pub fn none() -> Self {
        Self {
            toggle_vietnamese: None,
            undo_typing: None,
            toolbar: None,
            convert_tool: None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (HotkeyAction, Hotkey)> {
        [
            (HotkeyAction::ToggleVietnamese, self.toggle_vietnamese),
            (HotkeyAction::UndoTyping, self.undo_typing),
            (HotkeyAction::Toolbar, self.toolbar),
            (HotkeyAction::ConvertTool, self.convert_tool),
        ]
        .into_iter()
        .filter_map(|(action, hotkey)| hotkey.map(|h| (action, h)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierOnly {
    Idle,
    /// Exactly the bound modifiers are held; fires once all are released
    Reached(HotkeyAction, Modifiers),
    /// Something else was pressed meanwhile; wait for a full release
    Cancelled,
}

/// Matches hotkeys against the key stream. Touched only from the hook
/// thread.
#[derive(Debug, Clone)]
pub struct HotkeyMatcher {
    bindings: HotkeyBindings,
    state: ModifierOnly,
}

impl Default for HotkeyMatcher {
    fn default() -> Self {
        Self::new(HotkeyBindings::default())
    }
}

impl HotkeyMatcher {
    pub fn new(bindings: HotkeyBindings) -> Self {
        Self {
            bindings,
            state: ModifierOnly::Idle,
        }
    }

    pub fn bindings(&self) -> &HotkeyBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: HotkeyBindings) {
        self.bindings = bindings;
        self.state = ModifierOnly::Idle;
    }

    /// A non-modifier key went down. Returns the chord it completes.
    pub fn on_key_down(&mut self, key: Key, held: Modifiers) -> Option<HotkeyAction> {
        if self.state != ModifierOnly::Idle {
            self.state = ModifierOnly::Cancelled;
        }
        self.bindings
            .iter()
            .find(|(_, hotkey)| hotkey.matches_chord(key, held))
            .map(|(action, _)| action)
    }

    /// The held modifier set changed. Returns a modifier-only action when
    /// its modifiers were held alone and have now all been released.
    pub fn on_flags_changed(&mut self, held: Modifiers) -> Option<HotkeyAction> {
        let held = held.chord_part();
        if held.is_empty() {
            let fired = match self.state {
                ModifierOnly::Reached(action, _) => Some(action),
                _ => None,
            };
            self.state = ModifierOnly::Idle;
            return fired;
        }

        self.state = match self.state {
            ModifierOnly::Idle => self
                .bindings
                .iter()
                .find(|(_, hotkey)| {
                    hotkey.is_modifier_only() && hotkey.modifiers().chord_part() == held
                })
                .map(|(action, hotkey)| ModifierOnly::Reached(action, hotkey.modifiers().chord_part()))
                .unwrap_or(ModifierOnly::Idle),
            ModifierOnly::Reached(action, target) => {
                if target.is_superset_of(held) {
                    ModifierOnly::Reached(action, target)
                } else {
                    ModifierOnly::Cancelled
                }
            }
            ModifierOnly::Cancelled => ModifierOnly::Cancelled,
        };
        None
    }
}
