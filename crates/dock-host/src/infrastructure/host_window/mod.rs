//! Host window adapters.

pub mod recording;

#[cfg(target_os = "windows")]
pub mod windows;

pub use recording::{HostCall, RecordingHostWindow};
