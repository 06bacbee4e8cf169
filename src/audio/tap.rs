//! Per-device audio tap via `cpal`.
//!
//! An [`AudioTap`] wraps one cpal input stream on one device.  The callback
//! runs on the platform's real-time audio thread; each delivered buffer is
//! downmixed to mono and handed to the session as a [`Frame`].  The tap is a
//! RAII guard — dropping it stops the underlying stream, which is how the
//! session detaches all sources in bulk on stop.

use cpal::traits::{DeviceTrait, StreamTrait};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One buffer of mono audio as delivered by a tap callback.
///
/// Samples are `f32` amplitudes in `[-1.0, 1.0]` at the device's native
/// rate — no resampling is performed anywhere in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Mono PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this frame in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
}

// ---------------------------------------------------------------------------
// TapError
// ---------------------------------------------------------------------------

/// Errors that can occur while opening a tap on a device.
///
/// Tap failures never abort the session — the tracker logs them and moves on
/// to the next device.
#[derive(Debug, Error)]
pub enum TapError {
    #[error("failed to query device name: {0}")]
    Name(#[from] cpal::DeviceNameError),

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// AudioTap
// ---------------------------------------------------------------------------

/// A running input stream on one audio device.
///
/// Dropping the tap drops the cpal stream, which stops audio delivery.
pub struct AudioTap {
    _stream: cpal::Stream,
    device_name: String,
    sample_rate: u32,
}

impl AudioTap {
    /// Open a tap on `device` and start delivering [`Frame`]s to `on_frame`.
    ///
    /// `on_frame` is invoked from the cpal audio thread, so it must be cheap
    /// and must never block — the session passes a channel send here.
    ///
    /// # Errors
    ///
    /// Returns a [`TapError`] when the device rejects the stream (busy,
    /// unplugged, platform restriction).  Callers treat this as per-device
    /// degradation, not a session failure.
    pub fn open<F>(device: &cpal::Device, on_frame: F) -> Result<Self, TapError>
    where
        F: Fn(Frame) + Send + 'static,
    {
        let device_name = device.name()?;
        let supported = device.default_input_config()?;

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        let name_for_log = device_name.clone();
        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                on_frame(Frame {
                    samples: downmix_to_mono(data, channels),
                    sample_rate,
                });
            },
            move |err: cpal::StreamError| {
                log::error!("tap '{name_for_log}': stream error: {err}");
            },
            None, // no timeout
        )?;

        stream.play()?;

        Ok(Self {
            _stream: stream,
            device_name,
            sample_rate,
        })
    }

    /// Name of the tapped device, as reported by cpal.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Native sample rate of the tapped stream in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging channels.
///
/// The output length is `samples.len() / channels`.  Already-mono input is
/// copied straight through; `channels == 0` yields an empty vector.
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|group| group.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
