// Vikey macOS Event Tap
// Keyboard hook on the session event stream, driving the pipeline

use std::cell::RefCell;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::Arc;
use std::time::Duration;

use core_foundation::base::TCFType;
use core_foundation::mach_port::CFMachPortRef;
use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
    CGEventTapProxy, CGEventType, EventField,
};

use super::ax::is_trusted;
use super::poster::{modifiers_from, ProxySlot};
use crate::event::{EventInterceptionPipeline, Verdict};
use crate::input::{EventKind, Keystroke};
use crate::Key;

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

/// Error types for the event tap
#[derive(Debug, thiserror::Error)]
pub enum TapError {
    #[error("Accessibility permission not granted; enable it in System Settings > Privacy & Security > Accessibility")]
    NotTrusted,

    #[error("Failed to create event tap")]
    TapCreation,

    #[error("Failed to create run loop source")]
    RunLoopSource,
}

/// Convert a tapped event into a keystroke. None for event types the
/// pipeline does not look at.
pub fn keystroke_from(event_type: CGEventType, event: &CGEvent) -> Option<Keystroke> {
    let kind = match event_type {
        CGEventType::KeyDown => EventKind::KeyDown,
        CGEventType::KeyUp => EventKind::KeyUp,
        CGEventType::FlagsChanged => EventKind::FlagsChanged,
        CGEventType::LeftMouseDown | CGEventType::RightMouseDown => {
            return Some(Keystroke::mouse_down());
        }
        _ => return None,
    };

    let key = Key(event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16);
    let modifiers = modifiers_from(event.get_flags());
    let user_data = event.get_integer_value_field(EventField::EVENT_SOURCE_USER_DATA);
    let stroke = match kind {
        EventKind::KeyDown => Keystroke::key_down(key, modifiers).with_repeat(
            event.get_integer_value_field(EventField::KEYBOARD_EVENT_AUTOREPEAT) != 0,
        ),
        EventKind::KeyUp => Keystroke::key_up(key, modifiers),
        _ => Keystroke::flags_changed(key, modifiers),
    };
    Some(stroke.with_user_data(user_data))
}

/// Install the tap and run the current thread's run loop until `running`
/// is cleared. Every keystroke goes through `pipeline` inside the tap
/// callback; synthetic events posted meanwhile go through `proxy`.
pub fn run_event_tap(
    pipeline: EventInterceptionPipeline,
    proxy: ProxySlot,
    running: Arc<AtomicBool>,
) -> Result<(), TapError> {
    if !is_trusted() {
        return Err(TapError::NotTrusted);
    }

    let pipeline = RefCell::new(pipeline);
    let tap_port: Arc<AtomicPtr<c_void>> = Arc::new(AtomicPtr::new(std::ptr::null_mut()));
    let callback_port = tap_port.clone();

    let callback = move |tap_proxy: CGEventTapProxy,
                         event_type: CGEventType,
                         event: &CGEvent|
          -> Option<CGEvent> {
        if matches!(
            event_type,
            CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput
        ) {
            let port = callback_port.load(Ordering::Acquire);
            if !port.is_null() {
                log::warn!("Event tap was disabled, re-enabling");
                unsafe { CGEventTapEnable(port as CFMachPortRef, true) };
            }
            return None;
        }

        let stroke = keystroke_from(event_type, event)?;
        let Ok(mut pipeline) = pipeline.try_borrow_mut() else {
            return None;
        };

        proxy.store(tap_proxy as *mut c_void, Ordering::Release);
        let verdict = pipeline.handle(&stroke);
        proxy.store(std::ptr::null_mut(), Ordering::Release);

        if verdict == Verdict::Swallow {
            event.set_type(CGEventType::Null);
        }
        None
    };

    let event_tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::Default,
        vec![
            CGEventType::KeyDown,
            CGEventType::KeyUp,
            CGEventType::FlagsChanged,
            CGEventType::LeftMouseDown,
            CGEventType::RightMouseDown,
        ],
        callback,
    )
    .map_err(|_| TapError::TapCreation)?;

    tap_port.store(
        event_tap.mach_port.as_concrete_TypeRef() as *mut c_void,
        Ordering::Release,
    );
    event_tap.enable();

    let run_loop_source = event_tap
        .mach_port
        .create_runloop_source(0)
        .map_err(|_| TapError::RunLoopSource)?;
    let run_loop = CFRunLoop::get_current();
    run_loop.add_source(&run_loop_source, unsafe { kCFRunLoopCommonModes });

    log::info!("Event tap installed");
    while running.load(Ordering::SeqCst) {
        CFRunLoop::run_in_mode(
            unsafe { kCFRunLoopDefaultMode },
            Duration::from_millis(100),
            true,
        );
    }

    tap_port.store(std::ptr::null_mut(), Ordering::Release);
    log::info!("Event tap stopped");
    Ok(())
}
