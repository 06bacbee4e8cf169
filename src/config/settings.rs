//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Settings for the remote fact-check endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Full URL of the fact-check endpoint.
    pub endpoint: String,
    /// Bearer credential — `None` (or empty) when the server requires no
    /// authentication.
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/api/fact-check".into(),
            api_key: None,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Settings for the audio capture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Wall-clock milliseconds of audio accumulated per dispatch window.
    ///
    /// Dispatch happens on the first frame delivered *after* this much time
    /// has elapsed, so actual windows are "at least" this long.
    pub window_ms: u64,
    /// How often (ms) the session re-enumerates audio devices to pick up
    /// sources that appeared after the session started.
    pub rescan_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            window_ms: 5_000,
            rescan_ms: 2_000,
        }
    }
}

// ---------------------------------------------------------------------------
// OverlayConfig
// ---------------------------------------------------------------------------

/// Overlay widget appearance and auto-dismiss behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Milliseconds a verdict panel stays visible before auto-dismissing.
    pub result_dismiss_ms: u64,
    /// Milliseconds an error panel stays visible before auto-dismissing.
    pub error_dismiss_ms: u64,
    /// Keep the overlay floating above all other windows.
    pub always_on_top: bool,
    /// Last saved overlay position `(x, y)` in screen pixels.  `None` means
    /// let the OS / window manager pick a position on first launch.
    pub window_position: Option<(f32, f32)>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            result_dismiss_ms: 10_000,
            error_dismiss_ms: 5_000,
            always_on_top: true,
            window_position: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ControlConfig
// ---------------------------------------------------------------------------

/// Control-surface settings, including the persisted on/off toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Global key that toggles fact-checking on and off (e.g. `"F8"`).
    pub toggle_key: String,
    /// Whether fact-checking is active.  Persisted across launches so the
    /// session resumes automatically when the app starts.
    pub active: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            toggle_key: "F8".into(),
            active: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use factwatch::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote fact-check endpoint settings.
    pub api: ApiConfig,
    /// Capture window / device rescan settings.
    pub capture: CaptureConfig,
    /// Overlay widget settings.
    pub overlay: OverlayConfig,
    /// Toggle hotkey and persisted active flag.
    pub control: ControlConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            capture: CaptureConfig::default(),
            overlay: OverlayConfig::default(),
            control: ControlConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
