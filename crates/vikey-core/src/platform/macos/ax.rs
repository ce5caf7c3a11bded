// Vikey macOS Accessibility
// Focused element queries through the AXUIElement API

use std::collections::HashMap;
use std::ffi::c_void;
use std::path::Path;

use core_foundation::base::{CFRange, CFType, CFTypeRef, TCFType};
use core_foundation::bundle::{CFBundle, CFBundleGetIdentifier};
use core_foundation::string::{CFString, CFStringRef};
use core_foundation::url::CFURL;
use parking_lot::Mutex;

use crate::output::{AccessibilityProbe, FocusedText};
use crate::window::{FocusInfo, FocusProvider, WindowError};

type AXError = i32;

const AX_ERROR_SUCCESS: AXError = 0;
const AX_VALUE_CF_RANGE_TYPE: u32 = 4;

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXUIElementCreateSystemWide() -> CFTypeRef;
    fn AXUIElementCopyAttributeValue(
        element: CFTypeRef,
        attribute: CFStringRef,
        value: *mut CFTypeRef,
    ) -> AXError;
    fn AXUIElementSetAttributeValue(
        element: CFTypeRef,
        attribute: CFStringRef,
        value: CFTypeRef,
    ) -> AXError;
    fn AXUIElementGetPid(element: CFTypeRef, pid: *mut i32) -> AXError;
    fn AXValueCreate(value_type: u32, value: *const c_void) -> CFTypeRef;
    fn AXValueGetValue(value: CFTypeRef, value_type: u32, out: *mut c_void) -> bool;
}

/// Whether this process may observe and post keyboard events
pub fn is_trusted() -> bool {
    unsafe { AXIsProcessTrusted() }
}

/// An owned AXUIElement
struct Element(CFType);

impl Element {
    fn system_wide() -> Option<Self> {
        let raw = unsafe { AXUIElementCreateSystemWide() };
        if raw.is_null() {
            return None;
        }
        Some(Self(unsafe { CFType::wrap_under_create_rule(raw) }))
    }

    fn focused() -> Option<Self> {
        Self::system_wide()?.element("AXFocusedUIElement")
    }

    fn attribute(&self, name: &'static str) -> Option<CFType> {
        let name = CFString::from_static_string(name);
        let mut value: CFTypeRef = std::ptr::null();
        let err = unsafe {
            AXUIElementCopyAttributeValue(
                self.0.as_CFTypeRef(),
                name.as_concrete_TypeRef(),
                &mut value,
            )
        };
        if err != AX_ERROR_SUCCESS || value.is_null() {
            return None;
        }
        Some(unsafe { CFType::wrap_under_create_rule(value) })
    }

    fn element(&self, name: &'static str) -> Option<Element> {
        self.attribute(name).map(Element)
    }

    fn string(&self, name: &'static str) -> Option<String> {
        self.attribute(name)?
            .downcast::<CFString>()
            .map(|s| s.to_string())
    }

    fn range(&self, name: &'static str) -> Option<CFRange> {
        let value = self.attribute(name)?;
        let mut range = CFRange::init(0, 0);
        let ok = unsafe {
            AXValueGetValue(
                value.as_CFTypeRef(),
                AX_VALUE_CF_RANGE_TYPE,
                &mut range as *mut CFRange as *mut c_void,
            )
        };
        ok.then_some(range)
    }

    fn set(&self, name: &'static str, value: &CFType) -> bool {
        let name = CFString::from_static_string(name);
        let err = unsafe {
            AXUIElementSetAttributeValue(
                self.0.as_CFTypeRef(),
                name.as_concrete_TypeRef(),
                value.as_CFTypeRef(),
            )
        };
        err == AX_ERROR_SUCCESS
    }

    fn pid(&self) -> Option<i32> {
        let mut pid = 0;
        let err = unsafe { AXUIElementGetPid(self.0.as_CFTypeRef(), &mut pid) };
        (err == AX_ERROR_SUCCESS).then_some(pid)
    }
}

fn range_value(location: usize, length: usize) -> Option<CFType> {
    let range = CFRange::init(location as isize, length as isize);
    let raw = unsafe {
        AXValueCreate(
            AX_VALUE_CF_RANGE_TYPE,
            &range as *const CFRange as *const c_void,
        )
    };
    if raw.is_null() {
        return None;
    }
    Some(unsafe { CFType::wrap_under_create_rule(raw) })
}

/// Executable path of a process
fn executable_path(pid: i32) -> Option<String> {
    let mut buf = vec![0u8; libc::PROC_PIDPATHINFO_MAXSIZE as usize];
    let len = unsafe {
        libc::proc_pidpath(pid, buf.as_mut_ptr() as *mut c_void, buf.len() as u32)
    };
    if len <= 0 {
        return None;
    }
    buf.truncate(len as usize);
    String::from_utf8(buf).ok()
}

/// Bundle identifier of the `.app` containing `executable`
fn bundle_identifier(executable: &str) -> Option<String> {
    let bundle_dir = Path::new(executable)
        .ancestors()
        .find(|p| p.extension().is_some_and(|ext| ext == "app"))?;
    let url = CFURL::from_path(bundle_dir, true)?;
    let bundle = CFBundle::new(url)?;
    let id = unsafe { CFBundleGetIdentifier(bundle.as_concrete_TypeRef()) };
    if id.is_null() {
        return None;
    }
    Some(unsafe { CFString::wrap_under_get_rule(id) }.to_string())
}

/// Focus queries against the system-wide accessibility element.
/// App identities are cached per pid.
#[derive(Default)]
pub struct AxFocusProvider {
    app_ids: Mutex<HashMap<i32, String>>,
}

impl AxFocusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn app_id(&self, pid: i32) -> Option<String> {
        if let Some(id) = self.app_ids.lock().get(&pid) {
            return Some(id.clone());
        }
        let path = executable_path(pid)?;
        let id = bundle_identifier(&path).unwrap_or(path);
        self.app_ids.lock().insert(pid, id.clone());
        Some(id)
    }
}

impl FocusProvider for AxFocusProvider {
    fn focused(&self) -> Result<FocusInfo, WindowError> {
        if !is_trusted() {
            return Err(WindowError::NotTrusted);
        }
        let system = Element::system_wide()
            .ok_or_else(|| WindowError::QueryFailed("no system-wide element".to_string()))?;

        let mut info = FocusInfo::new();
        if let Some(pid) = system.element("AXFocusedApplication").and_then(|app| app.pid()) {
            info.pid = Some(pid);
            info.app_id = self.app_id(pid);
        }

        let element = system
            .element("AXFocusedUIElement")
            .ok_or(WindowError::NoFocusedElement)?;
        info.role = element.string("AXRole");
        if let Some(owner) = element.pid().filter(|pid| Some(*pid) != info.pid) {
            info.element_app_id = self.app_id(owner);
        }
        Ok(info)
    }
}

/// Reads and writes the focused text control
#[derive(Debug, Clone, Copy, Default)]
pub struct AxProbe;

impl AccessibilityProbe for AxProbe {
    fn has_text_after_cursor(&self) -> Option<bool> {
        let element = Element::focused()?;
        let value = element.string("AXValue")?;
        let range = element.range("AXSelectedTextRange")?;
        let end = (range.location + range.length).max(0) as usize;
        let units: Vec<u16> = value.encode_utf16().collect();
        if end >= units.len() {
            return Some(false);
        }
        let after = String::from_utf16_lossy(&units[end..]);
        Some(after.chars().any(|c| !c.is_whitespace()))
    }

    fn focused_text(&self) -> Option<FocusedText> {
        let element = Element::focused()?;
        let value = element.string("AXValue")?;
        let range = element.range("AXSelectedTextRange")?;
        if range.location < 0 || range.length < 0 {
            return None;
        }
        Some(FocusedText {
            value,
            caret: range.location as usize,
            selection_len: range.length as usize,
        })
    }

    fn set_focused_text(&self, text: &FocusedText) -> bool {
        let Some(element) = Element::focused() else {
            return false;
        };
        let value = CFString::new(&text.value);
        if !element.set("AXValue", &value.as_CFType()) {
            return false;
        }
        match range_value(text.caret, 0) {
            Some(range) => element.set("AXSelectedTextRange", &range),
            None => false,
        }
    }
}
