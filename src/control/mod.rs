//! Control surface — start/stop signals routed to the session.
//!
//! Two inbound paths exist: the global toggle hotkey, which emits
//! [`ControlEvent::Toggle`], and explicit [`ControlEvent::Start`]/[`Stop`]
//! signals.  `Start` and `Stop` are the programmatic control seam — no
//! built-in producer emits them today, but an external control surface
//! (an IPC endpoint, a tray menu) would send them over the same channel
//! and [`route_control`] already handles them.  All three resolve to the
//! same `SessionHandle::start`/`stop` pair; the toggle additionally flips
//! and persists the "is fact-checking active" flag so the session resumes
//! on the next launch.
//!
//! [`Stop`]: ControlEvent::Stop

pub mod listener;

pub use listener::{parse_key, ControlListener};

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::session::SessionHandle;

// ---------------------------------------------------------------------------
// ControlEvent
// ---------------------------------------------------------------------------

/// Inbound control signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Begin fact-checking.
    Start,
    /// Stop fact-checking.
    Stop,
    /// Flip the current state (hotkey press).
    Toggle,
}

// ---------------------------------------------------------------------------
// route_control
// ---------------------------------------------------------------------------

/// Route control events to the session until the channel closes.
///
/// Runs as a tokio task.  `config` carries the persisted toggle state;
/// every state change is written back to `settings.toml` so the toggle
/// survives restarts.  A failed save is logged and the session proceeds —
/// persistence is best-effort.
pub async fn route_control(
    mut rx: mpsc::Receiver<ControlEvent>,
    session: SessionHandle,
    mut config: AppConfig,
) {
    while let Some(event) = rx.recv().await {
        let activate = match event {
            ControlEvent::Start => true,
            ControlEvent::Stop => false,
            ControlEvent::Toggle => !config.control.active,
        };

        if activate {
            log::info!("control: fact-checking on");
            session.start();
        } else {
            log::info!("control: fact-checking off");
            session.stop();
        }

        if config.control.active != activate {
            config.control.active = activate;
            if let Err(e) = config.save() {
                log::warn!("control: failed to persist toggle state: {e}");
            }
        }
    }

    log::info!("control: channel closed, router shutting down");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_resolution_flips_active_flag() {
        // The routing rule itself: Start/Stop are absolute, Toggle inverts.
        let resolve = |event: ControlEvent, active: bool| match event {
            ControlEvent::Start => true,
            ControlEvent::Stop => false,
            ControlEvent::Toggle => !active,
        };

        assert!(resolve(ControlEvent::Start, false));
        assert!(resolve(ControlEvent::Start, true));
        assert!(!resolve(ControlEvent::Stop, true));
        assert!(resolve(ControlEvent::Toggle, false));
        assert!(!resolve(ControlEvent::Toggle, true));
    }
}
