//! Fact-check verdict types matching the service's wire format.
//!
//! The service speaks camelCase JSON (`confidenceLevel`, `isFact`); serde
//! renames map those onto idiomatic field names.  Parsing is structural
//! only — field values are passed through un-validated, which is a known
//! gap inherited from the service contract.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConfidenceLevel
// ---------------------------------------------------------------------------

/// Overall confidence bucket attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Short label for the overlay header.
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

/// One claim extracted from the audio window, with the service's judgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// The claim text as transcribed by the service.
    pub text: String,
    /// Whether the service judged the claim factual.
    #[serde(rename = "isFact")]
    pub is_fact: bool,
    /// Per-claim confidence in `0.0 – 1.0`.
    pub confidence: f32,
}

impl Claim {
    /// Confidence as a whole percentage for display (0.9 → 90).
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

// ---------------------------------------------------------------------------
// FactCheckVerdict
// ---------------------------------------------------------------------------

/// The structured fact-check result for one dispatched audio window.
///
/// Immutable once received; the overlay consumes it and it is discarded —
/// verdicts are never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckVerdict {
    /// Human-readable summary of the window's content.
    pub summary: String,
    /// Overall confidence bucket.
    #[serde(rename = "confidenceLevel")]
    pub confidence_level: ConfidenceLevel,
    /// Individual claims, possibly empty; the service may omit the field.
    #[serde(default)]
    pub claims: Vec<Claim>,
    /// Application-level failure reported inside a 2xx response.  When set,
    /// the dispatch is treated as an error and the summary is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
