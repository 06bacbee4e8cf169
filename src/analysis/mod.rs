//! Remote fact-check service integration.
//!
//! This module provides:
//! * [`AnalysisClient`] — async trait implemented by all client backends.
//! * [`ApiClient`] — reqwest-based HTTP client for the real service.
//! * [`FactCheckVerdict`] / [`Claim`] / [`ConfidenceLevel`] — wire types.
//! * [`AnalysisError`] — error variants for one dispatch.

pub mod client;
pub mod verdict;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{AnalysisClient, AnalysisError, ApiClient};
pub use verdict::{Claim, ConfidenceLevel, FactCheckVerdict};

// test-only re-export so session tests can import the mock without the full
// `crate::analysis::client::MockAnalysisClient` path.
#[cfg(test)]
pub use client::MockAnalysisClient;
