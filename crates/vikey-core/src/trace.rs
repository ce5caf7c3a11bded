// Vikey Trace Events
// Typed debug events from the pipeline and injector, sent to one sink

use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;

use crate::event::HotkeyAction;
use crate::input::EventKind;
use crate::session::ResetReason;
use crate::window::InjectionMethod;
use crate::Key;

/// Why a keystroke went to the app untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// Carries our sentinel
    Synthetic,
    KeyUp,
    FlagsChanged,
    Repeat,
    /// Vietnamese typing is off
    Disabled,
    ExcludedApp,
    PassthroughMethod,
    Combo,
    Navigation,
    /// The key produces no character
    NoCharacter,
    /// The engine had nothing to rewrite
    Unchanged,
}

impl fmt::Display for PassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PassReason::Synthetic => "synthetic",
            PassReason::KeyUp => "key-up",
            PassReason::FlagsChanged => "flags-changed",
            PassReason::Repeat => "repeat",
            PassReason::Disabled => "disabled",
            PassReason::ExcludedApp => "excluded-app",
            PassReason::PassthroughMethod => "passthrough-method",
            PassReason::Combo => "combo",
            PassReason::Navigation => "navigation",
            PassReason::NoCharacter => "no-character",
            PassReason::Unchanged => "unchanged",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    KeyReceived {
        key: Key,
        character: Option<char>,
        kind: EventKind,
    },
    Passed(PassReason),
    EngineEdit {
        backspace_count: usize,
        text: String,
    },
    InjectionStarted {
        method: InjectionMethod,
        backspace_count: usize,
        text: String,
    },
    InjectionFinished {
        method: InjectionMethod,
        elapsed: Duration,
    },
    Fallback {
        from: InjectionMethod,
        to: InjectionMethod,
    },
    /// Posting a synthetic event failed; the rest of the edit was still sent
    PostFailed(String),
    GateTimeout,
    Reset(ResetReason),
    Hotkey(HotkeyAction),
}

/// Receiver for trace events. Shared between the hook thread and the
/// injector, so implementations must be cheap and thread safe.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TraceEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: TraceEvent) {
        match &event {
            TraceEvent::KeyReceived { .. } | TraceEvent::Passed(_) => {
                log::trace!("{:?}", event)
            }
            TraceEvent::PostFailed(msg) => log::warn!("Synthetic event failed: {}", msg),
            TraceEvent::GateTimeout => {
                log::warn!("Injection gate wait timed out; continuing")
            }
            TraceEvent::Fallback { from, to } => {
                log::info!("Injection fell back from {} to {}", from, to)
            }
            _ => log::debug!("{:?}", event),
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: TraceEvent) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: TraceEvent) {
        self.events.lock().push(event);
    }
}
