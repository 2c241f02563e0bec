//! Screen geometry providers.

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

pub use mock::MockScreenGeometry;
