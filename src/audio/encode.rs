//! Window encoding — `f32` samples → 16-bit LE PCM → base64 text.
//!
//! The fact-check service accepts audio as base64 text framing a 16-bit
//! signed little-endian PCM stream.  The conversion is lossy and strictly
//! one-directional: the service owns decoding and no decode path exists in
//! this crate.

use base64::{engine::general_purpose, Engine as _};

// ---------------------------------------------------------------------------
// encode_window
// ---------------------------------------------------------------------------

/// Encode a window of mono `f32` samples as base64-wrapped 16-bit LE PCM.
///
/// Each sample is scaled by 32 767, clamped to the signed 16-bit range and
/// truncated toward zero.  Deterministic and total — well-formed input never
/// fails, and an empty window yields an empty string.
///
/// # Example
///
/// ```rust
/// use factwatch::audio::encode_window;
///
/// // full-scale positive sample → 0x7FFF little-endian → "/38="
/// assert_eq!(encode_window(&[1.0]), "/38=");
/// ```
pub fn encode_window(window: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(window.len() * 2);
    for &sample in window {
        bytes.extend_from_slice(&sample_to_i16(sample).to_le_bytes());
    }
    general_purpose::STANDARD.encode(bytes)
}

/// Scale an amplitude in `[-1.0, 1.0]` to the 16-bit PCM range.
///
/// Out-of-range input is clamped rather than wrapped, so `-2.0` hits the
/// `-32768` floor and `2.0` the `32767` ceiling.
fn sample_to_i16(sample: f32) -> i16 {
    // `as` truncates toward zero after the clamp, matching the wire format
    // the service expects.
    (sample * 32_767.0).clamp(-32_768.0, 32_767.0) as i16
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
