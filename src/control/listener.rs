//! Dedicated OS-thread toggle-key listener using `rdev::listen`.
//!
//! `rdev::listen` is a blocking call that must live on its own OS thread.
//! [`ControlListener`] owns that thread and a stop flag; dropping it sets
//! the flag so the callback silently ignores further events.
//!
//! # Shutdown caveat
//!
//! `rdev::listen` has no graceful shutdown API.  Setting the stop flag
//! prevents events from being forwarded, but the OS thread itself will
//! remain blocked in the rdev event loop until the process exits.  This is
//! safe — rdev holds no resources that need explicit cleanup.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::ControlEvent;

// ---------------------------------------------------------------------------
// ControlListener
// ---------------------------------------------------------------------------

/// Handle to a running toggle-key listener thread.
///
/// Construct one with [`ControlListener::start`].  Drop it to stop
/// forwarding events.
pub struct ControlListener {
    /// Shared stop flag — set `true` on [`Drop`].
    stop: Arc<AtomicBool>,
    /// Kept alive so the thread is not detached prematurely; never joined
    /// because `rdev::listen` never returns.
    _thread: std::thread::JoinHandle<()>,
}

impl ControlListener {
    /// Spawn a dedicated OS thread that emits [`ControlEvent::Toggle`] on
    /// `tx` whenever `key` is pressed.
    ///
    /// Key releases are ignored — the toggle fires on the press edge only.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to create the thread (extremely unlikely).
    pub fn start(key: rdev::Key, tx: mpsc::Sender<ControlEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("control-listener".into())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    if stop_clone.load(Ordering::Relaxed) {
                        return;
                    }

                    if let rdev::EventType::KeyPress(k) = event.event_type {
                        if k == key {
                            // blocking_send is safe from non-async threads.
                            let _ = tx.blocking_send(ControlEvent::Toggle);
                        }
                    }
                });

                if let Err(e) = result {
                    log::error!("control-listener: rdev::listen exited with error: {e:?}");
                }
            })
            .expect("failed to spawn control-listener thread");

        Self {
            stop,
            _thread: thread,
        }
    }
}

impl Drop for ControlListener {
    /// Set the stop flag so the rdev callback stops forwarding events.
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Parse a toggle-key name from a config string into an [`rdev::Key`].
///
/// The toggle is expected to be a function key or one of a few named keys;
/// unrecognised names return `None` so callers can fall back to the default
/// binding.
///
/// # Examples
///
/// ```
/// use factwatch::control::parse_key;
///
/// assert_eq!(parse_key("F8"), Some(rdev::Key::F8));
/// assert_eq!(parse_key("Pause"), Some(rdev::Key::Pause));
/// assert_eq!(parse_key("not-a-key"), None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    use rdev::Key;
    match key_str {
        "F1" => Some(Key::F1),
        "F2" => Some(Key::F2),
        "F3" => Some(Key::F3),
        "F4" => Some(Key::F4),
        "F5" => Some(Key::F5),
        "F6" => Some(Key::F6),
        "F7" => Some(Key::F7),
        "F8" => Some(Key::F8),
        "F9" => Some(Key::F9),
        "F10" => Some(Key::F10),
        "F11" => Some(Key::F11),
        "F12" => Some(Key::F12),
        "ScrollLock" => Some(Key::ScrollLock),
        "Pause" => Some(Key::Pause),
        "Insert" => Some(Key::Insert),
        "Home" => Some(Key::Home),
        "End" => Some(Key::End),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
