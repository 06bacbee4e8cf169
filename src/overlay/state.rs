//! Overlay state machine with auto-dismiss deadlines.
//!
//! [`Overlay`] holds the single per-app overlay state.  Transitions are
//! caller-driven: the session pushes [`OverlayUpdate`]s and the frame loop
//! calls [`poll`] to apply an expired deadline — there is no internal timer
//! thread.  The pending deadline is one `Option<Instant>`, so "at most one
//! auto-dismiss timer" holds structurally; every transition replaces it.
//!
//! [`poll`]: Overlay::poll

use std::time::{Duration, Instant};

use crate::analysis::FactCheckVerdict;
use crate::config::OverlayConfig;

use super::OverlayUpdate;

// ---------------------------------------------------------------------------
// OverlayState
// ---------------------------------------------------------------------------

/// What the overlay is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    /// Nothing rendered.
    Hidden,
    /// Session just started; waiting for the first audio window.
    Starting,
    /// A window has been dispatched; waiting for the verdict.
    Loading,
    /// A verdict arrived and is on screen.
    Result(FactCheckVerdict),
    /// A dispatch failed; the message is on screen.
    Error(String),
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// The single overlay presenter.
///
/// Repeated calls with identical state simply re-render — every `show_*`
/// method is safe to call at any time from any prior state.
pub struct Overlay {
    state: OverlayState,
    /// When to auto-hide, if the current state has a dismiss timer.
    deadline: Option<Instant>,
    result_dismiss: Duration,
    error_dismiss: Duration,
}

impl Overlay {
    /// Create a hidden overlay with explicit dismiss durations.
    pub fn new(result_dismiss: Duration, error_dismiss: Duration) -> Self {
        Self {
            state: OverlayState::Hidden,
            deadline: None,
            result_dismiss,
            error_dismiss,
        }
    }

    /// Create a hidden overlay from config.
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(
            Duration::from_millis(config.result_dismiss_ms),
            Duration::from_millis(config.error_dismiss_ms),
        )
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Show the "session started, waiting for audio" panel.  No dismiss
    /// timer — the next state change supersedes it.
    pub fn show_starting(&mut self) {
        self.state = OverlayState::Starting;
        self.deadline = None;
    }

    /// Show the "analyzing audio" panel.  No dismiss timer.
    pub fn show_loading(&mut self) {
        self.state = OverlayState::Loading;
        self.deadline = None;
    }

    /// Show a verdict; auto-hides after the result dismiss duration unless
    /// superseded.
    pub fn show_results(&mut self, verdict: FactCheckVerdict) {
        self.show_results_at(verdict, Instant::now());
    }

    /// Show an error message; auto-hides after the error dismiss duration
    /// unless superseded.
    pub fn show_error(&mut self, message: String) {
        self.show_error_at(message, Instant::now());
    }

    /// Hide the overlay and cancel any pending dismiss.
    pub fn hide(&mut self) {
        self.state = OverlayState::Hidden;
        self.deadline = None;
    }

    /// Apply an update pushed by the session.
    ///
    /// Responses arriving out of window order simply overwrite each other —
    /// the visible state is whichever arrived last.
    pub fn apply(&mut self, update: OverlayUpdate) {
        match update {
            OverlayUpdate::Starting => self.show_starting(),
            OverlayUpdate::Loading => self.show_loading(),
            OverlayUpdate::Result(verdict) => self.show_results(verdict),
            OverlayUpdate::Error(message) => self.show_error(message),
            OverlayUpdate::Hide => self.hide(),
        }
    }

    /// Hide the overlay if its dismiss deadline has passed.
    ///
    /// Called once per frame by the UI.  Returns `true` when the overlay
    /// was hidden by this call.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.hide();
                true
            }
            _ => false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Current state.
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Whether anything should be rendered.
    pub fn is_visible(&self) -> bool {
        self.state != OverlayState::Hidden
    }

    /// Pending auto-dismiss deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    // ── Clock-injectable variants (used by poll tests) ───────────────────

    fn show_results_at(&mut self, verdict: FactCheckVerdict, now: Instant) {
        self.state = OverlayState::Result(verdict);
        self.deadline = Some(now + self.result_dismiss);
    }

    fn show_error_at(&mut self, message: String, now: Instant) {
        self.state = OverlayState::Error(message);
        self.deadline = Some(now + self.error_dismiss);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Claim, ConfidenceLevel};

    fn make_overlay() -> Overlay {
        Overlay::new(Duration::from_millis(10_000), Duration::from_millis(5_000))
    }

    fn make_verdict(summary: &str) -> FactCheckVerdict {
        FactCheckVerdict {
            summary: summary.into(),
            confidence_level: ConfidenceLevel::High,
            claims: vec![Claim {
                text: "X".into(),
                is_fact: true,
                confidence: 0.9,
            }],
            error: None,
        }
    }

    // ---- Transitions -------------------------------------------------------

    #[test]
    fn starts_hidden() {
        let overlay = make_overlay();
        assert!(!overlay.is_visible());
        assert!(overlay.deadline().is_none());
    }

    #[test]
    fn starting_and_loading_have_no_deadline() {
        let mut overlay = make_overlay();
        overlay.show_starting();
        assert!(overlay.is_visible());
        assert!(overlay.deadline().is_none());

        overlay.show_loading();
        assert_eq!(overlay.state(), &OverlayState::Loading);
        assert!(overlay.deadline().is_none());
    }

    #[test]
    fn hide_cancels_pending_deadline() {
        let mut overlay = make_overlay();
        overlay.show_results(make_verdict("Test"));
        assert!(overlay.deadline().is_some());

        overlay.hide();
        assert!(!overlay.is_visible());
        assert!(overlay.deadline().is_none());
    }

    #[test]
    fn new_transition_replaces_prior_deadline() {
        let mut overlay = make_overlay();
        overlay.show_error("boom".into());
        let first = overlay.deadline().expect("error deadline");

        overlay.show_results(make_verdict("Test"));
        let second = overlay.deadline().expect("result deadline");
        // Result gets the longer (10 s) window, so the deadline moved out.
        assert!(second > first);

        overlay.show_loading();
        assert!(overlay.deadline().is_none());
    }

    #[test]
    fn repeated_identical_state_re_renders() {
        let mut overlay = make_overlay();
        overlay.show_starting();
        overlay.show_starting();
        assert_eq!(overlay.state(), &OverlayState::Starting);
    }

    // ---- Auto-dismiss ------------------------------------------------------

    #[test]
    fn result_auto_hides_after_ten_seconds() {
        let mut overlay = make_overlay();
        let t0 = Instant::now();
        overlay.show_results_at(make_verdict("Test"), t0);

        assert!(!overlay.poll(t0 + Duration::from_millis(9_999)));
        assert!(overlay.is_visible());

        assert!(overlay.poll(t0 + Duration::from_millis(10_000)));
        assert!(!overlay.is_visible());
    }

    #[test]
    fn error_auto_hides_after_five_seconds() {
        let mut overlay = make_overlay();
        let t0 = Instant::now();
        overlay.show_error_at("transport down".into(), t0);

        assert!(!overlay.poll(t0 + Duration::from_millis(4_999)));
        assert!(overlay.poll(t0 + Duration::from_millis(5_000)));
        assert!(!overlay.is_visible());
    }

    #[test]
    fn poll_without_deadline_is_a_no_op() {
        let mut overlay = make_overlay();
        overlay.show_loading();
        assert!(!overlay.poll(Instant::now() + Duration::from_secs(3600)));
        assert!(overlay.is_visible());
    }

    // ---- apply / ordering --------------------------------------------------

    #[test]
    fn apply_routes_updates() {
        let mut overlay = make_overlay();

        overlay.apply(OverlayUpdate::Starting);
        assert_eq!(overlay.state(), &OverlayState::Starting);

        overlay.apply(OverlayUpdate::Loading);
        assert_eq!(overlay.state(), &OverlayState::Loading);

        overlay.apply(OverlayUpdate::Result(make_verdict("Test")));
        assert!(matches!(overlay.state(), OverlayState::Result(v) if v.summary == "Test"));

        overlay.apply(OverlayUpdate::Error("oops".into()));
        assert_eq!(overlay.state(), &OverlayState::Error("oops".into()));

        overlay.apply(OverlayUpdate::Hide);
        assert!(!overlay.is_visible());
    }

    /// Overlapping responses resolve last-write-wins by arrival order, even
    /// when that is not window order.
    #[test]
    fn later_arrival_overwrites_earlier_window() {
        let mut overlay = make_overlay();
        overlay.apply(OverlayUpdate::Result(make_verdict("second window")));
        overlay.apply(OverlayUpdate::Result(make_verdict("first window")));

        assert!(
            matches!(overlay.state(), OverlayState::Result(v) if v.summary == "first window")
        );
    }
}
