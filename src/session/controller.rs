//! Capture session controller — owns taps, buffer, and the dispatch clock.
//!
//! [`SessionController`] runs on a dedicated OS thread because cpal streams
//! are not `Send`; the thread that opens a tap must also be the one that
//! drops it.  Everything reaches the controller as a [`SessionMsg`] over a
//! std mpsc channel: control start/stop, frames from the tap callbacks, and
//! shutdown.  The only async work — the HTTP exchange — is spawned onto the
//! tokio runtime via a [`Handle`].
//!
//! # Flow
//!
//! ```text
//! SessionMsg::Start ──▶ bump generation, reset clock, attach_all, overlay Starting
//! SessionMsg::Frame ──▶ buffer.append; if ≥ window_ms since last dispatch:
//!                         drain → overlay Loading → encode → spawn submit
//! SessionMsg::Stop  ──▶ detach_all, clear buffer, bump generation, overlay Hide
//! (rescan tick)     ──▶ attach_all for devices that appeared mid-session
//! ```
//!
//! Each dispatch is tagged with the session generation at the moment it was
//! sent.  Start and stop both bump the generation, so a response that lands
//! after the session stopped (or restarted) is discarded instead of
//! repainting the overlay.  Responses within one generation remain
//! last-write-wins by arrival order.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc::{self, RecvTimeoutError},
    Arc,
};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::analysis::AnalysisClient;
use crate::audio::{encode_window, AttachOutcome, Frame, SampleBuffer, SourceTracker};
use crate::config::CaptureConfig;
use crate::overlay::OverlayUpdate;

// ---------------------------------------------------------------------------
// SessionMsg
// ---------------------------------------------------------------------------

/// Messages handled by the capture thread.
#[derive(Debug)]
pub enum SessionMsg {
    /// Begin capturing (idempotent).
    Start,
    /// Stop capturing and hide the overlay (idempotent).
    Stop,
    /// One mono frame from a tap callback.
    Frame(Frame),
    /// Exit the capture thread.
    Shutdown,
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Handle to the running capture thread.
///
/// Dropping the handle shuts the thread down cleanly.
pub struct SessionHandle {
    tx: mpsc::Sender<SessionMsg>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl SessionHandle {
    /// Request session start.  A no-op when already capturing.
    pub fn start(&self) {
        let _ = self.tx.send(SessionMsg::Start);
    }

    /// Request session stop.  A no-op when idle.
    pub fn stop(&self) {
        let _ = self.tx.send(SessionMsg::Stop);
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(SessionMsg::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// The capture-thread state machine.
///
/// At most one session is active per controller; `start` while capturing and
/// `stop` while idle are both no-ops.
pub struct SessionController {
    window: Duration,
    rescan: Duration,
    client: Arc<dyn AnalysisClient>,
    overlay_tx: UnboundedSender<OverlayUpdate>,
    rt: Handle,
    /// Sender cloned into tap callbacks so frames land on this thread.
    frame_tx: mpsc::Sender<SessionMsg>,
    /// Bumped on every start and stop; stale dispatches compare against it.
    generation: Arc<AtomicU64>,

    capturing: bool,
    tracker: SourceTracker,
    buffer: SampleBuffer,
    last_dispatch: Instant,
}

impl SessionController {
    /// Spawn the capture thread and return its handle.
    ///
    /// # Arguments
    ///
    /// * `config`     — window and rescan intervals.
    /// * `client`     — analysis client used for every dispatch.
    /// * `overlay_tx` — channel to the UI overlay.
    /// * `rt`         — tokio handle for spawning submit tasks.
    pub fn spawn(
        config: &CaptureConfig,
        client: Arc<dyn AnalysisClient>,
        overlay_tx: UnboundedSender<OverlayUpdate>,
        rt: Handle,
    ) -> SessionHandle {
        let (tx, rx) = mpsc::channel::<SessionMsg>();

        // The controller owns cpal streams, which are not `Send`, so it must
        // be constructed on the capture thread itself.
        let config = config.clone();
        let frame_tx = tx.clone();
        let thread = std::thread::Builder::new()
            .name("capture".into())
            .spawn(move || {
                let controller = Self::new(&config, client, overlay_tx, rt, frame_tx);
                controller.run(rx)
            })
            .expect("failed to spawn capture thread");

        SessionHandle {
            tx,
            thread: Some(thread),
        }
    }

    fn new(
        config: &CaptureConfig,
        client: Arc<dyn AnalysisClient>,
        overlay_tx: UnboundedSender<OverlayUpdate>,
        rt: Handle,
        frame_tx: mpsc::Sender<SessionMsg>,
    ) -> Self {
        Self {
            window: Duration::from_millis(config.window_ms),
            rescan: Duration::from_millis(config.rescan_ms),
            client,
            overlay_tx,
            rt,
            frame_tx,
            generation: Arc::new(AtomicU64::new(0)),
            capturing: false,
            tracker: SourceTracker::new(),
            buffer: SampleBuffer::new(),
            last_dispatch: Instant::now(),
        }
    }

    // ── Main loop ────────────────────────────────────────────────────────

    /// Process messages until shutdown, rescanning for new devices while
    /// capturing.
    fn run(mut self, rx: mpsc::Receiver<SessionMsg>) {
        let mut last_rescan = Instant::now();

        loop {
            match rx.recv_timeout(self.rescan) {
                Ok(SessionMsg::Start) => self.start_capture(),
                Ok(SessionMsg::Stop) => self.stop_capture(),
                Ok(SessionMsg::Frame(frame)) => self.handle_frame(frame),
                Ok(SessionMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            // Frames keep the channel busy, so the rescan runs on elapsed
            // time rather than on recv timeouts alone.
            if self.capturing && last_rescan.elapsed() >= self.rescan {
                let outcome = self.tracker.attach_all(&self.frame_sink());
                if outcome.attached > 0 {
                    log::info!(
                        "session: attached {} new source(s) on rescan",
                        outcome.attached
                    );
                }
                self.report_attach_failures(&outcome);
                last_rescan = Instant::now();
            }
        }

        self.stop_capture();
        log::info!("session: capture thread shutting down");
    }

    // ── State transitions ────────────────────────────────────────────────

    /// Begin a capture session.  Idempotent — a second start while
    /// capturing changes nothing.
    fn start_capture(&mut self) {
        if self.capturing {
            log::debug!("session: start ignored, already capturing");
            return;
        }

        self.capturing = true;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.buffer.clear();
        self.last_dispatch = Instant::now();

        let outcome = self.tracker.attach_all(&self.frame_sink());
        log::info!("session: started, {} source(s) attached", outcome.attached);

        let _ = self.overlay_tx.send(OverlayUpdate::Starting);
        self.report_attach_failures(&outcome);
    }

    /// Tear the session down.  Idempotent.
    ///
    /// In-flight requests are not cancelled; bumping the generation makes
    /// their eventual responses stale so they never reach the overlay.
    fn stop_capture(&mut self) {
        if !self.capturing {
            return;
        }

        self.capturing = false;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tracker.detach_all();
        self.buffer.clear();

        log::info!("session: stopped");
        let _ = self.overlay_tx.send(OverlayUpdate::Hide);
    }

    /// Append a delivered frame and dispatch when the window interval has
    /// elapsed.
    ///
    /// Frames can straggle in after stop (the tap callback races the
    /// detach); they are dropped silently.
    fn handle_frame(&mut self, frame: Frame) {
        if !self.capturing {
            return;
        }

        self.buffer.append(frame.samples);

        // Wall-clock gate: dispatch cadence is only as precise as frame
        // delivery, so windows are "at least" window_ms long.
        if self.last_dispatch.elapsed() >= self.window {
            self.dispatch();
            self.last_dispatch = Instant::now();
        }
    }

    // ── Dispatch ─────────────────────────────────────────────────────────

    /// Drain the current window, encode it, and submit it for analysis.
    ///
    /// Skipped entirely when no frames were buffered.  The overlay shows
    /// Loading as soon as the window is handed off; the spawned task
    /// resolves it to a Result or Error unless the session generation moved
    /// on in the meantime.
    fn dispatch(&mut self) {
        let Some(window) = self.buffer.drain() else {
            log::debug!("session: dispatch skipped, empty window");
            return;
        };

        let _ = self.overlay_tx.send(OverlayUpdate::Loading);

        let payload = encode_window(&window);
        log::debug!(
            "session: dispatching window of {} samples ({} b64 chars)",
            window.len(),
            payload.len()
        );

        let client = Arc::clone(&self.client);
        let overlay_tx = self.overlay_tx.clone();
        let generation = Arc::clone(&self.generation);
        let sent_gen = generation.load(Ordering::SeqCst);

        self.rt.spawn(async move {
            let outcome = client.submit(&payload).await;

            if generation.load(Ordering::SeqCst) != sent_gen {
                log::debug!("session: discarding response from a stale dispatch");
                return;
            }

            let update = match outcome {
                Ok(verdict) => match verdict.error {
                    // Application-level failure inside a 2xx body.
                    Some(message) => OverlayUpdate::Error(message),
                    None => OverlayUpdate::Result(verdict),
                },
                Err(e) => OverlayUpdate::Error(e.to_string()),
            };
            let _ = overlay_tx.send(update);
        });
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Surface capability failures from an attach sweep to the overlay.
    ///
    /// Capturing continues in degraded form — the session stays alive with
    /// whatever sources did open — but the user sees that something is
    /// wrong instead of a silent, sourceless session.
    fn report_attach_failures(&self, outcome: &AttachOutcome) {
        if let Some(message) = outcome.error_message() {
            log::warn!("session: {message}");
            let _ = self.overlay_tx.send(OverlayUpdate::Error(message));
        }
    }

    /// Closure handed to every tap; forwards frames back to this thread.
    fn frame_sink(&self) -> impl Fn(Frame) + Send + Clone + 'static {
        let tx = self.frame_tx.clone();
        move |frame| {
            let _ = tx.send(SessionMsg::Frame(frame));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Claim, ConfidenceLevel, FactCheckVerdict, MockAnalysisClient};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

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

    /// Controller with a zero-length window so the first frame dispatches.
    fn make_controller(
        client: Arc<dyn AnalysisClient>,
    ) -> (SessionController, UnboundedReceiver<OverlayUpdate>) {
        let config = CaptureConfig {
            window_ms: 0,
            rescan_ms: 60_000,
        };
        let (overlay_tx, overlay_rx) = unbounded_channel();
        let (frame_tx, _frame_rx) = mpsc::channel();

        let controller =
            SessionController::new(&config, client, overlay_tx, Handle::current(), frame_tx);
        (controller, overlay_rx)
    }

    fn make_frame(len: usize) -> Frame {
        Frame {
            samples: vec![0.25; len],
            sample_rate: 48_000,
        }
    }

    /// Drain every update currently in the channel.
    fn drain_updates(rx: &mut UnboundedReceiver<OverlayUpdate>) -> Vec<OverlayUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    // -----------------------------------------------------------------------
    // Start / stop idempotence
    // -----------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread")]
    async fn start_twice_behaves_like_start_once() {
        let (mut ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(
            make_verdict("unused"),
        )));

        ctrl.start_capture();
        let gen_after_first = ctrl.generation.load(Ordering::SeqCst);
        ctrl.start_capture();

        assert!(ctrl.capturing);
        assert_eq!(ctrl.generation.load(Ordering::SeqCst), gen_after_first);
        // Exactly one Starting update — the second start was a no-op.
        assert_eq!(drain_updates(&mut rx), vec![OverlayUpdate::Starting]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_while_idle_is_a_no_op() {
        let (mut ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(
            make_verdict("unused"),
        )));

        ctrl.stop_capture();
        assert!(!ctrl.capturing);
        assert!(drain_updates(&mut rx).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_hides_overlay_and_discards_buffer() {
        let (mut ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(
            make_verdict("unused"),
        )));

        ctrl.start_capture();
        ctrl.buffer.append(vec![0.5; 100]);
        ctrl.stop_capture();

        assert!(ctrl.buffer.is_empty());
        let updates = drain_updates(&mut rx);
        assert_eq!(updates.last(), Some(&OverlayUpdate::Hide));
    }

    // -----------------------------------------------------------------------
    // Frame handling and dispatch
    // -----------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread")]
    async fn frames_before_start_are_dropped() {
        let (mut ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(
            make_verdict("unused"),
        )));

        ctrl.handle_frame(make_frame(4096));
        assert!(ctrl.buffer.is_empty());
        assert!(drain_updates(&mut rx).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn elapsed_window_dispatches_and_resolves_verdict() {
        let (mut ctrl, mut rx) =
            make_controller(Arc::new(MockAnalysisClient::ok(make_verdict("Test"))));

        ctrl.start_capture();
        ctrl.handle_frame(make_frame(4096));
        settle().await;

        let updates = drain_updates(&mut rx);
        assert_eq!(updates[0], OverlayUpdate::Starting);
        assert_eq!(updates[1], OverlayUpdate::Loading);
        match &updates[2] {
            OverlayUpdate::Result(verdict) => {
                assert_eq!(verdict.summary, "Test");
                assert_eq!(verdict.claims[0].confidence_percent(), 90);
            }
            other => panic!("expected Result, got {other:?}"),
        }
        // Window was handed off: buffer must be empty for the next window.
        assert!(ctrl.buffer.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dispatch_with_empty_buffer_is_skipped() {
        let (mut ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(
            make_verdict("unused"),
        )));

        ctrl.start_capture();
        let _ = drain_updates(&mut rx);

        ctrl.dispatch();
        settle().await;
        // No Loading, no Result — nothing was sent.
        assert!(drain_updates(&mut rx).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn transport_failure_surfaces_as_overlay_error() {
        let (mut ctrl, mut rx) =
            make_controller(Arc::new(MockAnalysisClient::err("relay unavailable")));

        ctrl.start_capture();
        ctrl.handle_frame(make_frame(4096));
        settle().await;

        let updates = drain_updates(&mut rx);
        match updates.last() {
            Some(OverlayUpdate::Error(message)) => {
                assert!(message.contains("relay unavailable"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
        // Errors are terminal for the dispatch only — the session survives.
        assert!(ctrl.capturing);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn application_error_field_surfaces_as_overlay_error() {
        let mut verdict = make_verdict("Failed to process audio");
        verdict.error = Some("decoder crashed".into());
        let (mut ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(verdict)));

        ctrl.start_capture();
        ctrl.handle_frame(make_frame(4096));
        settle().await;

        let updates = drain_updates(&mut rx);
        assert_eq!(
            updates.last(),
            Some(&OverlayUpdate::Error("decoder crashed".into()))
        );
    }

    // -----------------------------------------------------------------------
    // Capability failures
    // -----------------------------------------------------------------------

    /// A tap that fails to open must reach the overlay as an error while
    /// the session keeps capturing from whatever did open.
    #[tokio::test(flavor = "multi_thread")]
    async fn tap_failures_surface_as_overlay_error_without_stopping() {
        let (mut ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(
            make_verdict("unused"),
        )));

        ctrl.start_capture();
        let _ = drain_updates(&mut rx);

        ctrl.report_attach_failures(&AttachOutcome {
            attached: 1,
            failed: 2,
            enumeration_failed: false,
        });

        let updates = drain_updates(&mut rx);
        match updates.last() {
            Some(OverlayUpdate::Error(message)) => {
                assert!(message.contains("2 audio source(s)"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
        assert!(ctrl.capturing);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn enumeration_failure_surfaces_as_overlay_error() {
        let (ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(
            make_verdict("unused"),
        )));

        ctrl.report_attach_failures(&AttachOutcome {
            enumeration_failed: true,
            ..AttachOutcome::default()
        });

        assert_eq!(
            drain_updates(&mut rx),
            vec![OverlayUpdate::Error(
                "Failed to enumerate audio sources".into()
            )]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clean_attach_sweep_sends_no_error() {
        let (ctrl, mut rx) = make_controller(Arc::new(MockAnalysisClient::ok(
            make_verdict("unused"),
        )));

        ctrl.report_attach_failures(&AttachOutcome {
            attached: 3,
            ..AttachOutcome::default()
        });

        assert!(drain_updates(&mut rx).is_empty());
    }

    // -----------------------------------------------------------------------
    // Stale responses
    // -----------------------------------------------------------------------

    /// A response that lands after stop() must not repaint the overlay.
    #[tokio::test(flavor = "multi_thread")]
    async fn response_after_stop_is_discarded() {
        let client = MockAnalysisClient::ok(make_verdict("too late")).with_delay_ms(100);
        let (mut ctrl, mut rx) = make_controller(Arc::new(client));

        ctrl.start_capture();
        ctrl.handle_frame(make_frame(4096));
        ctrl.stop_capture();

        tokio::time::sleep(Duration::from_millis(250)).await;

        let updates = drain_updates(&mut rx);
        assert_eq!(
            updates,
            vec![
                OverlayUpdate::Starting,
                OverlayUpdate::Loading,
                OverlayUpdate::Hide,
            ]
        );
    }

    /// Restarting invalidates responses from the previous session instance.
    #[tokio::test(flavor = "multi_thread")]
    async fn response_from_previous_session_is_discarded_after_restart() {
        let client = MockAnalysisClient::ok(make_verdict("from old session")).with_delay_ms(100);
        let (mut ctrl, mut rx) = make_controller(Arc::new(client));

        ctrl.start_capture();
        ctrl.handle_frame(make_frame(4096));
        ctrl.stop_capture();
        ctrl.start_capture();

        tokio::time::sleep(Duration::from_millis(250)).await;

        let updates = drain_updates(&mut rx);
        assert!(!updates
            .iter()
            .any(|u| matches!(u, OverlayUpdate::Result(_))));
    }

    // -----------------------------------------------------------------------
    // Thread lifecycle
    // -----------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread")]
    async fn spawned_handle_starts_and_shuts_down_cleanly() {
        let config = CaptureConfig {
            window_ms: 5_000,
            rescan_ms: 60_000,
        };
        let (overlay_tx, mut overlay_rx) = unbounded_channel();

        let handle = SessionController::spawn(
            &config,
            Arc::new(MockAnalysisClient::ok(make_verdict("unused"))),
            overlay_tx,
            Handle::current(),
        );

        handle.start();
        settle().await;
        assert_eq!(overlay_rx.recv().await, Some(OverlayUpdate::Starting));

        handle.stop();
        settle().await;
        assert_eq!(overlay_rx.recv().await, Some(OverlayUpdate::Hide));

        drop(handle); // joins the capture thread
    }
}
