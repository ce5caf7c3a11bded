// Vikey Platform Bindings

#[cfg(target_os = "macos")]
pub mod macos;
