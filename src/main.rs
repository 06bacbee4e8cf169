//! Application entry point — FactWatch.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the analysis client ([`ApiClient`]) from config.
//! 5. Create the overlay-update and control channels.
//! 6. Spawn the capture-session thread ([`SessionController`]).
//! 7. Honour the persisted toggle — start the session when it was active.
//! 8. Spawn the control router task and the toggle-key listener thread.
//! 9. Run [`eframe::run_native`] — blocks the main thread until the overlay
//!    window is closed.

use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;

use factwatch::{
    analysis::{AnalysisClient, ApiClient},
    app::FactWatchApp,
    config::AppConfig,
    control::{parse_key, route_control, ControlEvent, ControlListener},
    overlay::{Overlay, OverlayUpdate},
    session::SessionController,
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_decorations(false)
        .with_transparent(true)
        .with_inner_size([280.0, 80.0])
        .with_min_inner_size([220.0, 40.0])
        .with_resizable(false);

    if config.overlay.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.overlay.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("FactWatch starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 workers — dispatch requests are the only async work)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Analysis client
    let client: Arc<dyn AnalysisClient> = Arc::new(ApiClient::from_config(&config.api));
    log::info!("Fact-check endpoint: {}", config.api.endpoint);

    // 5. Channels
    let (overlay_tx, overlay_rx) = mpsc::unbounded_channel::<OverlayUpdate>();
    let (control_tx, control_rx) = mpsc::channel::<ControlEvent>(16);

    // 6. Capture-session thread
    let session = SessionController::spawn(
        &config.capture,
        Arc::clone(&client),
        overlay_tx,
        rt.handle().clone(),
    );

    // 7. Persisted toggle — resume fact-checking from the last run.
    if config.control.active {
        log::info!("Persisted toggle is active; starting session");
        session.start();
    }

    // 8. Control router task + toggle-key listener thread
    rt.spawn(route_control(control_rx, session, config.clone()));

    let toggle_key = parse_key(&config.control.toggle_key).unwrap_or_else(|| {
        log::warn!(
            "Unknown toggle key '{}'; falling back to F8",
            config.control.toggle_key
        );
        rdev::Key::F8
    });
    let _control_listener = ControlListener::start(toggle_key, control_tx);

    // 9. Overlay window (blocks until closed)
    let overlay = Overlay::from_config(&config.overlay);
    let app = FactWatchApp::new(overlay, overlay_rx);
    let options = native_options(&config);

    eframe::run_native(
        "FactWatch",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
