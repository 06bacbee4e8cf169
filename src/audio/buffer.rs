//! Frame-accumulation buffer for one dispatch window.
//!
//! [`SampleBuffer`] collects the mono `f32` frames delivered by the audio
//! taps until the session decides a window is due, then [`drain`]s them into
//! one contiguous sequence.  Unlike a ring buffer it never discards data —
//! growth within a window is bounded in practice by the 5-second dispatch
//! interval and the device sample rate.
//!
//! [`drain`]: SampleBuffer::drain
//!
//! # Example
//!
//! ```rust
//! use factwatch::audio::SampleBuffer;
//!
//! let mut buf = SampleBuffer::new();
//! buf.append(vec![0.1, 0.2]);
//! buf.append(vec![0.3]);
//! assert_eq!(buf.drain(), Some(vec![0.1, 0.2, 0.3]));
//! assert!(buf.is_empty());
//! ```

// ---------------------------------------------------------------------------
// SampleBuffer
// ---------------------------------------------------------------------------

/// Accumulates audio frames in arrival order until the window is drained.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    /// Frames exactly as delivered, oldest first.
    frames: Vec<Vec<f32>>,
    /// Running total of samples across all frames (kept so `drain` can
    /// allocate the output in one go).
    total_len: usize,
}

impl SampleBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frame of mono samples.
    ///
    /// Frames are stored as delivered; nothing is merged or reordered.
    pub fn append(&mut self, frame: Vec<f32>) {
        self.total_len += frame.len();
        self.frames.push(frame);
    }

    /// Concatenate all appended frames in arrival order, clear the buffer,
    /// and return the contiguous window.
    ///
    /// Returns `None` when no frames were appended so the caller can skip
    /// the dispatch entirely.
    pub fn drain(&mut self) -> Option<Vec<f32>> {
        if self.frames.is_empty() {
            return None;
        }

        let mut window = Vec::with_capacity(self.total_len);
        for frame in self.frames.drain(..) {
            window.extend_from_slice(&frame);
        }
        self.total_len = 0;

        Some(window)
    }

    /// Discard all frames without producing a window.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.total_len = 0;
    }

    /// Total number of samples currently buffered.
    pub fn len(&self) -> usize {
        self.total_len
    }

    /// Returns `true` when no frames are buffered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames appended since the last drain/clear.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Buffered duration in seconds, assuming `sample_rate` Hz mono.
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.total_len as f32 / sample_rate as f32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
