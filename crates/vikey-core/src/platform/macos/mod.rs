//! macOS binding
//!
//! Quartz event tap, CGEvent posting and the accessibility queries that
//! back the platform-neutral pipeline.

mod ax;
mod poster;
mod tap;

pub use ax::{is_trusted, AxFocusProvider, AxProbe};
pub use poster::{flags_for, modifiers_from, CgEventPoster, ProxySlot};
pub use tap::{keystroke_from, run_event_tap, TapError};
