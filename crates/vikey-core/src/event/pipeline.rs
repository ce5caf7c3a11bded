// Vikey Event Interception Pipeline
// Per-keystroke gates between the system hook, the engine and the injector
//
// Every key-down runs through the gates below in order; the first one
// that applies decides the verdict:
// 1. our own synthetic events pass
// 2. modifier changes feed the modifier-only hotkeys, key-ups pass
// 3. auto-repeat resets the engine and passes
// 4. hotkey chords are swallowed and dispatched
// 5. Vietnamese off, excluded apps and passthrough targets pass
// 6. shortcuts reset the engine and pass
// 7. Backspace, navigation, Tab and Forward-Delete
// 8. characters go to the engine; word breaks only when it wants them

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use super::hotkey::{HotkeyAction, HotkeyBindings, HotkeyMatcher};
use crate::input::{AppFilter, EventKind, Keystroke};
use crate::output::{CharacterInjector, InjectionEdit};
use crate::session::{ResetReason, SessionContext};
use crate::settings::EngineSettings;
use crate::trace::{EventSink, PassReason, TraceEvent};
use crate::transform::{EngineResult, MacroTable, SpellDictionary, TransliterationEngine};
use crate::window::{FocusInfo, FocusProvider, InjectionMethod, InjectionStrategy, InjectionStrategySelector};
use crate::Key;

/// What the hook does with the original event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Swallow,
}

/// Requests for the application, sent to the main thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    VietnameseChanged(bool),
    ShowToolbar,
    ShowConvertTool,
}

/// Changes applied on the hook thread before the next keystroke
pub enum PipelineControl {
    SetVietnamese(bool),
    SetSettings(EngineSettings),
    SetMacros(MacroTable),
    SetDictionary(Option<Arc<dyn SpellDictionary>>),
    SetHotkeys(HotkeyBindings),
    SetFilter(AppFilter),
}

pub struct EventInterceptionPipeline {
    engine: TransliterationEngine,
    injector: Arc<CharacterInjector>,
    selector: Arc<dyn InjectionStrategySelector>,
    focus: Arc<dyn FocusProvider>,
    filter: AppFilter,
    hotkeys: HotkeyMatcher,
    session: SessionContext,
    last_focus: Option<FocusInfo>,
    vietnamese: bool,
    gate_timeout: Option<Duration>,
    commands: Option<Sender<AppCommand>>,
    control: Option<Receiver<PipelineControl>>,
    sink: Arc<dyn EventSink>,
}

impl EventInterceptionPipeline {
    pub fn new(
        engine: TransliterationEngine,
        injector: Arc<CharacterInjector>,
        selector: Arc<dyn InjectionStrategySelector>,
        focus: Arc<dyn FocusProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            engine,
            injector,
            selector,
            focus,
            filter: AppFilter::default(),
            hotkeys: HotkeyMatcher::default(),
            session: SessionContext::new(),
            last_focus: None,
            vietnamese: true,
            gate_timeout: None,
            commands: None,
            control: None,
            sink,
        }
    }

    pub fn with_filter(mut self, filter: AppFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_hotkeys(mut self, bindings: HotkeyBindings) -> Self {
        self.hotkeys.set_bindings(bindings);
        self
    }

    /// Bound the wait for a previous injection. Unbounded by default.
    pub fn with_gate_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.gate_timeout = timeout;
        self
    }

    pub fn with_commands(mut self, commands: Sender<AppCommand>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn with_control(mut self, control: Receiver<PipelineControl>) -> Self {
        self.control = Some(control);
        self
    }

    pub fn with_vietnamese(mut self, enabled: bool) -> Self {
        self.vietnamese = enabled;
        self
    }

    pub fn engine(&self) -> &TransliterationEngine {
        &self.engine
    }

    pub fn session(&self) -> SessionContext {
        self.session
    }

    pub fn is_vietnamese(&self) -> bool {
        self.vietnamese
    }

    /// Run one event through the gates
    pub fn handle(&mut self, stroke: &Keystroke) -> Verdict {
        self.apply_control();
        self.sink.emit(TraceEvent::KeyReceived {
            key: stroke.key,
            character: stroke.character,
            kind: stroke.kind,
        });

        if stroke.is_synthetic() {
            return self.pass(PassReason::Synthetic);
        }

        match stroke.kind {
            EventKind::FlagsChanged => {
                if let Some(action) = self.hotkeys.on_flags_changed(stroke.modifiers) {
                    self.dispatch(action);
                }
                return self.pass(PassReason::FlagsChanged);
            }
            EventKind::KeyUp => return self.pass(PassReason::KeyUp),
            EventKind::MouseDown => {
                self.reset(ResetReason::CursorMoved);
                return self.pass(PassReason::Navigation);
            }
            EventKind::KeyDown => {}
        }

        if stroke.repeat {
            self.reset(ResetReason::Repeat);
            return self.pass(PassReason::Repeat);
        }

        if let Some(action) = self.hotkeys.on_key_down(stroke.key, stroke.modifiers) {
            self.dispatch(action);
            return Verdict::Swallow;
        }

        if !self.vietnamese {
            return self.pass(PassReason::Disabled);
        }

        let focus = self.current_focus();
        if self.filter.is_excluded(&focus) {
            return self.pass(PassReason::ExcludedApp);
        }
        let strategy = self.selector.confirmed_method(&focus);
        if strategy.method == InjectionMethod::Passthrough {
            return self.pass(PassReason::PassthroughMethod);
        }

        if stroke.modifiers.is_combo() {
            let reason = if stroke.key.is_navigation() {
                ResetReason::CursorMoved
            } else {
                ResetReason::Shortcut
            };
            self.reset(reason);
            return self.pass(PassReason::Combo);
        }

        match stroke.key {
            Key::DELETE => {
                self.wait_for_injection();
                let result = self.engine.process_backspace();
                return self.apply(result, &strategy);
            }
            Key::TAB => {
                self.reset(ResetReason::Tab);
                return self.pass(PassReason::Navigation);
            }
            Key::FORWARD_DELETE => {
                self.reset(ResetReason::ForwardDelete);
                return self.pass(PassReason::Navigation);
            }
            key if key.is_navigation() => {
                self.reset(ResetReason::CursorMoved);
                return self.pass(PassReason::Navigation);
            }
            _ => {}
        }

        let Some(ch) = stroke.character else {
            return self.pass(PassReason::NoCharacter);
        };

        self.wait_for_injection();
        let result = if self.engine.is_word_break(ch) {
            if !self.engine.wants_word_break(ch) {
                return self.pass(PassReason::Unchanged);
            }
            self.engine.process_word_break(ch)
        } else {
            self.engine.process_key(ch, stroke.key, stroke.is_uppercase())
        };
        self.apply(result, &strategy)
    }

    fn pass(&self, reason: PassReason) -> Verdict {
        self.sink.emit(TraceEvent::Passed(reason));
        Verdict::Pass
    }

    fn apply(&mut self, result: EngineResult, strategy: &InjectionStrategy) -> Verdict {
        let Some(edit) = InjectionEdit::from_result(&result) else {
            return self.pass(PassReason::Unchanged);
        };
        self.sink.emit(TraceEvent::EngineEdit {
            backspace_count: edit.backspace_count,
            text: edit.text.clone(),
        });
        self.injector.inject(&edit, strategy, &self.session);
        Verdict::Swallow
    }

    fn wait_for_injection(&self) {
        if !self.injector.gate().wait_until_free(self.gate_timeout) {
            self.sink.emit(TraceEvent::GateTimeout);
        }
    }

    /// Focus now, resetting the engine when it moved since the last key
    /// Focused target, resetting the engine when it changed. A failed
    /// query keeps the last known target.
    fn current_focus(&mut self) -> FocusInfo {
        let focus = match self.focus.focused() {
            Ok(focus) => focus,
            Err(e) => {
                log::trace!("Focus query failed: {}", e);
                return self.last_focus.clone().unwrap_or_default();
            }
        };
        if self.last_focus.as_ref().is_some_and(|last| *last != focus) {
            self.reset(ResetReason::FocusChanged);
        }
        self.last_focus = Some(focus.clone());
        focus
    }

    fn reset(&mut self, reason: ResetReason) {
        if reason.moves_cursor() {
            self.engine.reset_with_cursor_moved();
        } else {
            self.engine.reset();
        }
        self.session = self.session.after_reset(reason);
        self.selector.clear_method_cache();
        self.sink.emit(TraceEvent::Reset(reason));
    }

    fn set_vietnamese(&mut self, enabled: bool) {
        if self.vietnamese != enabled {
            self.vietnamese = enabled;
            self.reset(ResetReason::ModeToggled);
            log::info!("Vietnamese typing {}", if enabled { "on" } else { "off" });
        }
    }

    fn send(&self, command: AppCommand) {
        if let Some(commands) = &self.commands {
            if commands.send(command).is_err() {
                log::warn!("Application command channel closed");
            }
        }
    }

    fn dispatch(&mut self, action: HotkeyAction) {
        self.sink.emit(TraceEvent::Hotkey(action));
        match action {
            HotkeyAction::ToggleVietnamese => {
                self.set_vietnamese(!self.vietnamese);
                self.send(AppCommand::VietnameseChanged(self.vietnamese));
            }
            HotkeyAction::UndoTyping => {
                if !self.vietnamese {
                    return;
                }
                let focus = self.current_focus();
                let strategy = self.selector.confirmed_method(&focus);
                self.wait_for_injection();
                let result = self.engine.undo_typing();
                self.apply(result, &strategy);
            }
            HotkeyAction::Toolbar => self.send(AppCommand::ShowToolbar),
            HotkeyAction::ConvertTool => self.send(AppCommand::ShowConvertTool),
        }
    }

    fn apply_control(&mut self) {
        let Some(control) = &self.control else {
            return;
        };
        let pending: Vec<PipelineControl> = control.try_iter().collect();
        for change in pending {
            match change {
                PipelineControl::SetVietnamese(enabled) => self.set_vietnamese(enabled),
                PipelineControl::SetSettings(settings) => {
                    self.engine.set_settings(settings);
                    self.reset(ResetReason::Reload);
                }
                PipelineControl::SetMacros(macros) => {
                    self.engine.set_macros(macros);
                    self.reset(ResetReason::MacrosChanged);
                }
                PipelineControl::SetDictionary(dictionary) => {
                    self.engine.set_dictionary(dictionary);
                }
                PipelineControl::SetHotkeys(bindings) => self.hotkeys.set_bindings(bindings),
                PipelineControl::SetFilter(filter) => self.filter = filter,
            }
        }
    }
}
