// Vikey Output Layer - Synthetic Events
// Key and Unicode events we post, and the trait that posts them

use crate::input::SENTINEL;
use crate::modifier::Modifiers;
use crate::Key;

/// Error types for event posting
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Failed to create event source")]
    SourceCreation,

    #[error("Failed to create event: {0}")]
    EventCreation(String),

    #[error("No tap proxy to post through")]
    NoProxy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticKind {
    Key {
        key: Key,
        down: bool,
        modifiers: Modifiers,
    },
    /// Key event carrying a Unicode string instead of a key code
    Text(String),
}

/// An event to post. `user_data` is always the sentinel so the hook
/// recognises it on the way back in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticEvent {
    pub kind: SyntheticKind,
    pub user_data: i64,
}

impl SyntheticEvent {
    pub fn key(key: Key, down: bool, modifiers: Modifiers) -> Self {
        Self {
            kind: SyntheticKind::Key {
                key,
                down,
                modifiers,
            },
            user_data: SENTINEL,
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            kind: SyntheticKind::Text(text.to_string()),
            user_data: SENTINEL,
        }
    }

    /// Press and release of `key`
    pub fn tap(key: Key, modifiers: Modifiers) -> [Self; 2] {
        [
            Self::key(key, true, modifiers),
            Self::key(key, false, modifiers),
        ]
    }
}

/// Where an event enters the system event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostChannel {
    /// Right after our own tap, ahead of the keystroke being processed
    Proxy,
    /// At session level, behind anything already queued
    Session,
}

pub trait EventPoster: Send + Sync {
    fn post(&self, event: &SyntheticEvent, channel: PostChannel) -> Result<(), PostError>;
}
