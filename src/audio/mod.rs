//! Audio pipeline — device taps → frame accumulation → window encoding.
//!
//! # Pipeline
//!
//! ```text
//! input device → AudioTap (cpal callback) → Frame → SampleBuffer
//!             → drain() every 5 s → encode_window → base64 payload
//! ```
//!
//! The [`SourceTracker`] decides which devices get taps; the session owns
//! the [`SampleBuffer`] and the dispatch clock.

pub mod buffer;
pub mod encode;
pub mod tap;
pub mod tracker;

pub use buffer::SampleBuffer;
pub use encode::encode_window;
pub use tap::{downmix_to_mono, AudioTap, Frame, TapError};
pub use tracker::{AttachOutcome, SourceTracker};
