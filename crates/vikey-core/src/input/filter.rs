// Vikey Input Layer - App Filtering
// Decides which focused apps get their keystrokes passed straight through

use crate::window::FocusInfo;

/// Screen mirroring and remote desktop clients. Keystrokes typed into
/// them are processed by the remote machine's own input method.
pub const MIRRORING_APPS: &[&str] = &[
    "com.apple.ScreenContinuity",
    "com.apple.ScreenSharing",
    "com.teamviewer.TeamViewer",
    "com.microsoft.rdc.macos",
    "com.parsec.www",
    "com.utmapp.UTM",
];

/// Launchers that take keyboard focus while another app stays frontmost
pub const OVERLAY_LAUNCHERS: &[&str] = &[
    "com.apple.Spotlight",
    "com.raycast.macos",
    "com.runningwithcrayons.Alfred",
];

/// Excluded-app check.
///
/// An app is excluded when the user listed it or it is a mirroring
/// client. The element owner wins over the frontmost app: typing into
/// Spotlight over an excluded app is still transliterated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppFilter {
    excluded: Vec<String>,
    overlay_launchers: Vec<String>,
}

impl Default for AppFilter {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AppFilter {
    /// Filter excluding `excluded` plus the built-in mirroring clients
    pub fn new(excluded: Vec<String>) -> Self {
        let mut all: Vec<String> = MIRRORING_APPS.iter().map(|s| s.to_string()).collect();
        for app in excluded {
            if !all.contains(&app) {
                all.push(app);
            }
        }
        Self {
            excluded: all,
            overlay_launchers: OVERLAY_LAUNCHERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    pub fn is_overlay(&self, app_id: &str) -> bool {
        self.overlay_launchers.iter().any(|a| a == app_id)
    }

    pub fn is_excluded(&self, focus: &FocusInfo) -> bool {
        if let Some(owner) = focus.element_app_id.as_deref() {
            if self.is_overlay(owner) {
                return false;
            }
        }
        focus
            .target_app()
            .is_some_and(|app| self.excluded.iter().any(|e| e == app))
    }
}
