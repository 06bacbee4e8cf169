//! Overlay window — egui/eframe application.
//!
//! [`FactWatchApp`] is the top-level [`eframe::App`].  It owns the
//! [`Overlay`] state machine and the receiving end of the session's update
//! channel; each frame it drains pending [`OverlayUpdate`]s, applies any
//! expired auto-dismiss deadline, and renders the current panel through
//! [`overlay::widget`].
//!
//! The window is a compact, borderless, transparent, always-on-top float in
//! the floating-widget style; it stays fully transparent while the overlay
//! is hidden.
//!
//! [`overlay::widget`]: crate::overlay::widget

use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::overlay::{widget, Overlay, OverlayUpdate};

// ---------------------------------------------------------------------------
// FactWatchApp
// ---------------------------------------------------------------------------

/// eframe application — the floating fact-check overlay.
pub struct FactWatchApp {
    /// The overlay state machine (single instance per app).
    overlay: Overlay,
    /// Updates pushed by the session and its dispatch tasks.
    overlay_rx: mpsc::UnboundedReceiver<OverlayUpdate>,
    /// Spinner animation phase, advanced each frame.
    spinner_phase: f32,
}

impl FactWatchApp {
    /// Create the app around a configured [`Overlay`] and the session's
    /// update channel.
    pub fn new(overlay: Overlay, overlay_rx: mpsc::UnboundedReceiver<OverlayUpdate>) -> Self {
        Self {
            overlay,
            overlay_rx,
            spinner_phase: 0.0,
        }
    }

    /// Drain all pending overlay updates (non-blocking) and apply expired
    /// dismiss deadlines.
    fn apply_pending(&mut self, now: Instant) {
        while let Ok(update) = self.overlay_rx.try_recv() {
            self.overlay.apply(update);
        }
        self.overlay.poll(now);
    }
}

impl eframe::App for FactWatchApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // Fully transparent window background; panels paint their own fill.
        [0.0, 0.0, 0.0, 0.0]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_pending(Instant::now());
        self.spinner_phase += 0.15;

        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(widget::preferred_size(
            self.overlay.state(),
        )));

        if self.overlay.is_visible() {
            let panel_frame = egui::Frame::new()
                .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 24, 235))
                .corner_radius(8)
                .inner_margin(egui::Margin::same(10));

            egui::CentralPanel::default()
                .frame(panel_frame)
                .show(ctx, |ui| {
                    if widget::draw(ui, self.overlay.state(), self.spinner_phase) {
                        self.overlay.hide();
                    }
                });
        } else {
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |_ui| {});
        }

        // Dismiss deadlines must fire even with no input events.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
