// Vikey Event Module
// The interception pipeline and hotkey matching

pub mod hotkey;
pub mod pipeline;

pub use hotkey::{HotkeyAction, HotkeyBindings, HotkeyMatcher};
pub use pipeline::{AppCommand, EventInterceptionPipeline, PipelineControl, Verdict};
