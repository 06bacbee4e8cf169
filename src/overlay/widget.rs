//! egui rendering for the overlay panels.
//!
//! Pure draw functions over [`OverlayState`] — all state lives in the
//! [`Overlay`](super::Overlay) machine, so the widget layer holds nothing
//! but pixels.  Layout follows the floating-widget style: compact, dark,
//! frameless, one panel per state.

use egui::{Color32, RichText};

use crate::analysis::{Claim, ConfidenceLevel, FactCheckVerdict};

use super::OverlayState;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

const TEXT_DIM: Color32 = Color32::from_rgb(150, 150, 150);
const TEXT_MAIN: Color32 = Color32::from_rgb(220, 220, 220);
const ACCENT_BLUE: Color32 = Color32::from_rgb(68, 136, 255);
const CLAIM_TRUE: Color32 = Color32::from_rgb(80, 200, 120);
const CLAIM_FALSE: Color32 = Color32::from_rgb(255, 90, 90);
const ERROR_ORANGE: Color32 = Color32::from_rgb(255, 160, 60);

/// Tint for the verdict header by overall confidence.
fn confidence_color(level: ConfidenceLevel) -> Color32 {
    match level {
        ConfidenceLevel::High => CLAIM_TRUE,
        ConfidenceLevel::Medium => Color32::from_rgb(230, 200, 90),
        ConfidenceLevel::Low => ERROR_ORANGE,
    }
}

/// One of four spinner glyphs, advanced by the caller's animation phase.
fn spinner_char(phase: f32) -> char {
    const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
    FRAMES[(phase as usize) % FRAMES.len()]
}

// ---------------------------------------------------------------------------
// draw
// ---------------------------------------------------------------------------

/// Render the current overlay state into `ui`.
///
/// Returns `true` when the close control was clicked so the caller can
/// `hide()` the overlay.
pub fn draw(ui: &mut egui::Ui, state: &OverlayState, spinner_phase: f32) -> bool {
    let mut close_clicked = false;

    // Header row: title + close control.
    ui.horizontal(|ui| {
        ui.label(RichText::new("Fact Check").color(TEXT_DIM).size(12.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add(
                    egui::Button::new(RichText::new("x").color(TEXT_DIM).size(12.0)).frame(false),
                )
                .clicked()
            {
                close_clicked = true;
            }
        });
    });
    ui.separator();

    match state {
        OverlayState::Hidden => {}
        OverlayState::Starting => draw_status(
            ui,
            spinner_phase,
            "Audio Fact Checker Activated",
            "Waiting for audio content...",
        ),
        OverlayState::Loading => draw_status(
            ui,
            spinner_phase,
            "Analyzing audio content...",
            "Checking facts in real-time",
        ),
        OverlayState::Result(verdict) => draw_result(ui, verdict),
        OverlayState::Error(message) => draw_error(ui, message),
    }

    close_clicked
}

/// Preferred window size for the current state, so the viewport can shrink
/// to fit small panels.
pub fn preferred_size(state: &OverlayState) -> egui::Vec2 {
    match state {
        OverlayState::Hidden => egui::vec2(220.0, 40.0),
        OverlayState::Starting | OverlayState::Loading => egui::vec2(280.0, 80.0),
        OverlayState::Error(_) => egui::vec2(300.0, 90.0),
        OverlayState::Result(verdict) => {
            let rows = verdict.claims.len().min(6) as f32;
            egui::vec2(320.0, 110.0 + rows * 22.0)
        }
    }
}

// ---------------------------------------------------------------------------
// State-specific panels
// ---------------------------------------------------------------------------

/// Spinner + primary line + dim subtitle (Starting and Loading share this
/// shape).
fn draw_status(ui: &mut egui::Ui, spinner_phase: f32, title: &str, subtitle: &str) {
    ui.add_space(6.0);
    ui.label(
        RichText::new(format!("{} {title}", spinner_char(spinner_phase)))
            .color(ACCENT_BLUE)
            .size(13.0),
    );
    ui.label(RichText::new(subtitle).color(TEXT_DIM).size(11.0));
}

/// Verdict card: summary with confidence tint, then one row per claim.
fn draw_result(ui: &mut egui::Ui, verdict: &FactCheckVerdict) {
    ui.add_space(4.0);
    ui.label(
        RichText::new("Fact Check Result")
            .color(confidence_color(verdict.confidence_level))
            .size(13.0)
            .strong(),
    );
    ui.label(RichText::new(&verdict.summary).color(TEXT_MAIN).size(12.0));

    if !verdict.claims.is_empty() {
        ui.add_space(4.0);
        for claim in &verdict.claims {
            draw_claim(ui, claim);
        }
    }
}

/// One claim row: ✓/✗ icon, claim text, right-aligned percentage.
fn draw_claim(ui: &mut egui::Ui, claim: &Claim) {
    let (icon, color) = if claim.is_fact {
        ("✓", CLAIM_TRUE)
    } else {
        ("✗", CLAIM_FALSE)
    };

    ui.horizontal(|ui| {
        ui.label(RichText::new(icon).color(color).size(12.0));
        ui.label(RichText::new(&claim.text).color(TEXT_MAIN).size(11.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("{}%", claim.confidence_percent()))
                    .color(TEXT_DIM)
                    .size(11.0),
            );
        });
    });
}

/// Error banner.
fn draw_error(ui: &mut egui::Ui, message: &str) {
    ui.add_space(6.0);
    ui.label(
        RichText::new(format!("⚠ Error: {message}"))
            .color(ERROR_ORANGE)
            .size(12.0),
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
