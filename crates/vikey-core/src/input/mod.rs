// Vikey Input Layer
// Hook events and app filtering

mod event;
mod filter;

pub use event::{qwerty_char, EventKind, Keystroke, SENTINEL};
pub use filter::{AppFilter, MIRRORING_APPS, OVERLAY_LAUNCHERS};
