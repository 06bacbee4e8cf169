//! FactWatch — live audio fact-checking overlay.
//!
//! FactWatch taps the host's audio input devices while a session is active,
//! accumulates raw sample frames into 5-second windows, encodes each window
//! as 16-bit PCM wrapped in base64, submits it to a remote fact-check
//! endpoint, and renders the returned verdict in a transient always-on-top
//! overlay widget.
//!
//! # Architecture
//!
//! ```text
//! ControlListener (rdev thread)
//!        │ ControlEvent
//!        ▼
//! control router (tokio task) ──▶ SessionController (capture thread)
//!                                     │ owns SourceTracker + SampleBuffer
//!                                     │
//!   AudioTap (cpal callback) ──Frame──┤
//!                                     │ 5 s window elapsed
//!                                     ▼
//!                            encode_window → AnalysisClient::submit (tokio)
//!                                     │
//!                                     ▼ OverlayUpdate
//!                            FactWatchApp (egui) → Overlay state machine
//! ```
//!
//! The capture thread owns all cpal streams (they are not `Send`); the only
//! async work is the HTTP exchange with the fact-check service.

pub mod analysis;
pub mod app;
pub mod audio;
pub mod config;
pub mod control;
pub mod overlay;
pub mod session;
