// Vikey Output Layer
// Synthetic events, the injection gate and the character injector

mod accessibility;
mod event;
mod gate;
mod injector;

pub use accessibility::{splice, AccessibilityProbe, FocusedText, NoAccessibility};
pub use event::{EventPoster, PostChannel, PostError, SyntheticEvent, SyntheticKind};
pub use gate::{GateGuard, InjectionGate};
pub use injector::{chunk_utf16, CharacterInjector, InjectionEdit, MAX_CHUNK_UNITS};
