//! Overlay presenter — transient on-screen panels for session state.
//!
//! [`Overlay`] is the pure state machine (testable, no UI types);
//! [`widget`] renders its current state into the egui frame.  The session
//! never touches the overlay directly — it pushes [`OverlayUpdate`]s over a
//! channel and the UI thread applies them.

pub mod state;
pub mod widget;

pub use state::{Overlay, OverlayState};

use crate::analysis::FactCheckVerdict;

// ---------------------------------------------------------------------------
// OverlayUpdate
// ---------------------------------------------------------------------------

/// State transitions pushed from the session to the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayUpdate {
    /// Session started; waiting for audio content.
    Starting,
    /// A window was dispatched; analysis is in flight.
    Loading,
    /// A verdict arrived for the most recent dispatch.
    Result(FactCheckVerdict),
    /// A dispatch failed with a human-readable message.
    Error(String),
    /// Session stopped; hide everything.
    Hide,
}
