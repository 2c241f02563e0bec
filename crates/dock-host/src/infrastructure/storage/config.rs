//! TOML preferences for the dock host.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\SidebarDock\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/sidebar-dock/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/SidebarDock/config.toml`
//!
//! # Example
//!
//! ```toml
//! [general]
//! log_level = "info"
//! visible_on_startup = true
//!
//! [dock]
//! mode = "docked"
//! edge = "right"
//! expanded_width = 320
//! compact_width = 60
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section, or
//! a missing key all fall back to the built-in values.  `edge` only accepts
//! `"left"` and `"right"`; anything else is a parse error.
//!
//! `dock.mode` is written back with the mode that was actually applied, so a
//! forced fallback to Floating is remembered across restarts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dock_core::{CompactState, DockEdge, Mode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::dock_controller::DockSettings;
use crate::application::presentation::PresentationSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The values parsed but are not usable together.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level preferences stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub dock: DockConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Show the sidebar as soon as the host starts.
    #[serde(default)]
    pub visible_on_startup: bool,
}

/// Dock mode and band geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DockConfig {
    /// Requested mode; overwritten with the applied mode.
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub edge: DockEdge,
    /// Logical units.
    #[serde(default = "default_expanded_width")]
    pub expanded_width: f64,
    /// Logical units.
    #[serde(default = "default_compact_width")]
    pub compact_width: f64,
    #[serde(default)]
    pub start_compact: bool,
    /// Docking is refused for this long after a forced fallback.  0 disables.
    #[serde(default = "default_redock_cooldown_ms")]
    pub redock_cooldown_ms: u64,
}

/// Transition timings.  Purely cosmetic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresentationConfig {
    #[serde(default = "default_slide_offset")]
    pub slide_offset: f64,
    #[serde(default = "default_entrance_slide_ms")]
    pub entrance_slide_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub entrance_fade_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub resize_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub exit_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_expanded_width() -> f64 {
    320.0
}
fn default_compact_width() -> f64 {
    60.0
}
fn default_redock_cooldown_ms() -> u64 {
    2_000
}
fn default_slide_offset() -> f64 {
    50.0
}
fn default_entrance_slide_ms() -> u64 {
    250
}
fn default_fade_ms() -> u64 {
    200
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            visible_on_startup: false,
        }
    }
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Floating,
            edge: DockEdge::Right,
            expanded_width: default_expanded_width(),
            compact_width: default_compact_width(),
            start_compact: false,
            redock_cooldown_ms: default_redock_cooldown_ms(),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            slide_offset: default_slide_offset(),
            entrance_slide_ms: default_entrance_slide_ms(),
            entrance_fade_ms: default_fade_ms(),
            resize_ms: default_fade_ms(),
            exit_ms: default_fade_ms(),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl AppConfig {
    /// Checks the values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] unless
    /// `0 < compact_width < expanded_width` and the slide offset is finite
    /// and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dock = &self.dock;
        if !dock.expanded_width.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "expanded_width must be finite, got {}",
                dock.expanded_width
            )));
        }
        if !(dock.compact_width > 0.0 && dock.compact_width < dock.expanded_width) {
            return Err(ConfigError::Invalid(format!(
                "compact_width ({}) must be > 0 and < expanded_width ({})",
                dock.compact_width, dock.expanded_width
            )));
        }
        let offset = self.presentation.slide_offset;
        if !(offset.is_finite() && offset >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "slide_offset must be finite and non-negative, got {offset}"
            )));
        }
        Ok(())
    }

    pub fn compact_state(&self) -> CompactState {
        CompactState {
            is_compact: self.dock.start_compact,
            ..CompactState::new(self.dock.expanded_width, self.dock.compact_width)
        }
    }

    /// Dock settings, with the width taken from the starting compact state.
    pub fn dock_settings(&self) -> DockSettings {
        DockSettings {
            edge: self.dock.edge,
            width: self.compact_state().current_width(),
            redock_cooldown: Duration::from_millis(self.dock.redock_cooldown_ms),
        }
    }

    pub fn presentation_settings(&self) -> PresentationSettings {
        let p = &self.presentation;
        PresentationSettings {
            slide_offset: p.slide_offset,
            entrance_slide: Duration::from_millis(p.entrance_slide_ms),
            entrance_fade: Duration::from_millis(p.entrance_fade_ms),
            resize: Duration::from_millis(p.resize_ms),
            exit: Duration::from_millis(p.exit_ms),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads and validates `AppConfig` from `path`, returning the defaults if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::Invalid`] if validation fails.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let cfg = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<AppConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// [`load_from`] at the platform path.
///
/// # Errors
///
/// See [`load_from`]; also [`ConfigError::NoPlatformConfigDir`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_from(&config_file_path()?)
}

/// [`save_to`] at the platform path.
///
/// # Errors
///
/// See [`save_to`]; also [`ConfigError::NoPlatformConfigDir`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_to(&config_file_path()?, config)
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SidebarDock"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("sidebar-dock"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SidebarDock")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
