//! Capture session — the orchestrator between control, audio, and overlay.
//!
//! # Architecture
//!
//! ```text
//! ControlEvent ──▶ SessionHandle ──SessionMsg──▶ capture thread
//!                                                 │ SourceTracker (cpal taps)
//!                                                 │ SampleBuffer
//!                                                 │ dispatch clock + generation
//!                                                 ▼
//!                                      AnalysisClient::submit (tokio task)
//!                                                 │
//!                                                 ▼
//!                                      OverlayUpdate ──▶ UI thread
//! ```

pub mod controller;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{SessionController, SessionHandle, SessionMsg};
