//! AI advisory engine.
//!
//! Produces a non-persisted `{score, verdict, summary}` report for one record,
//! either from a remote generative-text backend or from the local heuristic in
//! [`simulation`]. A remote failure never leaves the caller hanging: the
//! [`AdvisoryEngine`] reports the error, waits the configured fallback delay
//! and resolves with a simulated report instead.

mod engine;
mod gemini;
pub mod simulation;

pub use engine::AdvisoryEngine;
pub use engine::AdvisoryTiming;
pub use engine::Cancelled;
pub use gemini::GeminiScorer;
pub use gemini::build_prompt;
pub use gemini::parse_report;
pub use gemini::strip_code_fences;
pub use simulation::simulate;
pub use simulation::verdict_for;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::record::ApplicationRecord;

/// Result of scoring one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryReport {
    /// 0-100.
    pub score: u8,
    pub verdict: String,
    pub summary: String,
}

/// How a run resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryOutcome {
    /// The remote backend produced the report.
    Remote(AdvisoryReport),
    /// No backend configured; the heuristic produced the report.
    Simulated(AdvisoryReport),
    /// The remote backend failed and the heuristic stood in.
    FellBack {
        error: String,
        report: AdvisoryReport,
    },
}

impl AdvisoryOutcome {
    pub fn report(&self) -> &AdvisoryReport {
        match self {
            AdvisoryOutcome::Remote(report)
            | AdvisoryOutcome::Simulated(report)
            | AdvisoryOutcome::FellBack { report, .. } => report,
        }
    }

    pub fn into_report(self) -> AdvisoryReport {
        match self {
            AdvisoryOutcome::Remote(report)
            | AdvisoryOutcome::Simulated(report)
            | AdvisoryOutcome::FellBack { report, .. } => report,
        }
    }

    /// Short label for the path taken.
    pub fn source(&self) -> &'static str {
        match self {
            AdvisoryOutcome::Remote(_) => "remote",
            AdvisoryOutcome::Simulated(_) => "simulation",
            AdvisoryOutcome::FellBack { .. } => "simulation (fallback)",
        }
    }
}

/// Errors from the remote scoring path.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// No API credential is stored.
    #[error("no API key configured")]
    NotConfigured,

    /// Transport failure. The request URL (which carries the key) is
    /// stripped on conversion.
    #[error("{0}")]
    Network(reqwest::Error),

    /// Non-2xx response. `message` comes from the body when it has one.
    #[error("{message}")]
    ApiResponse { status: u16, message: String },

    #[error("No content generated")]
    EmptyResponse,

    /// Generated text was not the expected JSON object.
    #[error("could not parse report: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(error: reqwest::Error) -> Self {
        AdvisoryError::Network(error.without_url())
    }
}

/// A source of remote reports.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn score(&self, record: &ApplicationRecord) -> Result<AdvisoryReport, AdvisoryError>;
}
