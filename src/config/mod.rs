//! Configuration module — settings structs, TOML persistence, app paths.
//!
//! Settings live in `settings.toml` under the platform config directory
//! (resolved by [`AppPaths`]). A missing file yields [`AppConfig::default`]
//! so first-run needs no special casing.

pub mod paths;
pub mod settings;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use paths::AppPaths;
pub use settings::{ApiConfig, AppConfig, CaptureConfig, ControlConfig, OverlayConfig};
