// Vikey macOS Event Poster
// Posts synthetic key and Unicode events through CGEvent

use std::ffi::c_void;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;

use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, CGEventType, EventField};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

use crate::modifier::{Modifier, Modifiers};
use crate::output::{EventPoster, PostChannel, PostError, SyntheticEvent, SyntheticKind};

/// Tap proxy of the callback currently running, null outside it
pub type ProxySlot = Arc<AtomicPtr<c_void>>;

const FLAGS: [(Modifier, CGEventFlags); 6] = [
    (Modifier::Shift, CGEventFlags::CGEventFlagShift),
    (Modifier::Control, CGEventFlags::CGEventFlagControl),
    (Modifier::Option, CGEventFlags::CGEventFlagAlternate),
    (Modifier::Command, CGEventFlags::CGEventFlagCommand),
    (Modifier::CapsLock, CGEventFlags::CGEventFlagAlphaShift),
    (Modifier::Function, CGEventFlags::CGEventFlagSecondaryFn),
];

pub fn flags_for(modifiers: Modifiers) -> CGEventFlags {
    let mut flags = CGEventFlags::CGEventFlagNull;
    for (modifier, flag) in FLAGS {
        if modifiers.contains(modifier) {
            flags |= flag;
        }
    }
    flags
}

pub fn modifiers_from(flags: CGEventFlags) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    for (modifier, flag) in FLAGS {
        if flags.contains(flag) {
            modifiers.insert(modifier);
        }
    }
    modifiers
}

pub struct CgEventPoster {
    proxy: ProxySlot,
}

impl CgEventPoster {
    pub fn new(proxy: ProxySlot) -> Self {
        Self { proxy }
    }

    fn build(&self, event: &SyntheticEvent) -> Result<CGEvent, PostError> {
        // CGEventSource is not Send, so one is made per event
        let source = CGEventSource::new(CGEventSourceStateID::Private)
            .map_err(|_| PostError::SourceCreation)?;

        let cg_event = match &event.kind {
            SyntheticKind::Key {
                key,
                down,
                modifiers,
            } => {
                let cg_event = CGEvent::new_keyboard_event(source, key.code(), *down)
                    .map_err(|_| PostError::EventCreation(format!("key {}", key)))?;
                cg_event.set_flags(flags_for(*modifiers));
                cg_event
            }
            SyntheticKind::Text(text) => {
                let cg_event = CGEvent::new_keyboard_event(source, 0, true)
                    .map_err(|_| PostError::EventCreation(format!("text {:?}", text)))?;
                let utf16: Vec<u16> = text.encode_utf16().collect();
                cg_event.set_string_from_utf16_unchecked(&utf16);
                // Held modifiers must not leak into the inserted text
                cg_event.set_flags(CGEventFlags::CGEventFlagNull);
                cg_event
            }
        };
        cg_event.set_integer_value_field(EventField::EVENT_SOURCE_USER_DATA, event.user_data);
        Ok(cg_event)
    }
}

impl EventPoster for CgEventPoster {
    fn post(&self, event: &SyntheticEvent, channel: PostChannel) -> Result<(), PostError> {
        let cg_event = self.build(event)?;
        let proxy = self.proxy.load(Ordering::Acquire);
        match channel {
            PostChannel::Proxy if !proxy.is_null() => cg_event.post_from_tap(proxy as _),
            PostChannel::Proxy => {
                log::trace!("No tap proxy, posting at session level");
                cg_event.post(CGEventTapLocation::Session);
            }
            PostChannel::Session => cg_event.post(CGEventTapLocation::Session),
        }

        // A Unicode event also needs its key-up
        if matches!(event.kind, SyntheticKind::Text(_)) {
            let up = self.build(event)?;
            up.set_type(CGEventType::KeyUp);
            match channel {
                PostChannel::Proxy if !proxy.is_null() => up.post_from_tap(proxy as _),
                _ => up.post(CGEventTapLocation::Session),
            }
        }
        Ok(())
    }
}
