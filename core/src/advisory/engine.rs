use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::AdvisoryConfig;
use crate::notice::Notice;
use crate::record::ApplicationRecord;
use crate::settings::ScoringCredentials;

use super::AdvisoryOutcome;
use super::AdvisoryReport;
use super::GeminiScorer;
use super::ScoringBackend;
use super::simulate;

/// Scheduling parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisoryTiming {
    /// Wait between a remote failure and the simulated fallback.
    pub fallback_delay: Duration,
    /// Pacing delay before a simulated report resolves.
    pub simulation_delay: Duration,
}

impl AdvisoryTiming {
    pub fn from_config(config: &AdvisoryConfig) -> Self {
        Self {
            fallback_delay: config.fallback_delay(),
            simulation_delay: config.simulation_delay(),
        }
    }

    /// No artificial delays.
    pub fn immediate() -> Self {
        Self {
            fallback_delay: Duration::ZERO,
            simulation_delay: Duration::ZERO,
        }
    }
}

/// The view that requested a run went away before it resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("advisory run cancelled")]
pub struct Cancelled;

/// Runs one advisory request to completion: remote when a backend is
/// configured, simulated otherwise or after a remote failure.
#[derive(Clone)]
pub struct AdvisoryEngine {
    backend: Option<Arc<dyn ScoringBackend>>,
    timing: AdvisoryTiming,
}

impl AdvisoryEngine {
    pub fn new(backend: Option<Arc<dyn ScoringBackend>>, timing: AdvisoryTiming) -> Self {
        Self { backend, timing }
    }

    pub fn simulation_only(timing: AdvisoryTiming) -> Self {
        Self::new(None, timing)
    }

    /// Remote scoring through Gemini when `credentials` are present.
    pub fn from_config(config: &AdvisoryConfig, credentials: Option<ScoringCredentials>) -> Self {
        let timing = AdvisoryTiming::from_config(config);
        let backend = credentials.and_then(|credentials| {
            match GeminiScorer::new(config, credentials) {
                Ok(scorer) => Some(Arc::new(scorer) as Arc<dyn ScoringBackend>),
                Err(e) => {
                    tracing::error!("failed to build scoring client, using simulation: {e}");
                    None
                }
            }
        });
        Self::new(backend, timing)
    }

    pub fn is_remote(&self) -> bool {
        self.backend.is_some()
    }

    pub fn timing(&self) -> AdvisoryTiming {
        self.timing
    }

    /// Resolve a report for `record`.
    ///
    /// Always produces a report unless `cancel` fires first. User-facing
    /// notices (remote success, remote failure) go to `notify` as they happen,
    /// the failure notice before the fallback delay starts.
    pub async fn run<F>(
        &self,
        record: &ApplicationRecord,
        notify: F,
        cancel: &CancellationToken,
    ) -> Result<AdvisoryOutcome, Cancelled>
    where
        F: Fn(Notice) + Sync,
    {
        let Some(backend) = &self.backend else {
            tracing::debug!("no scoring backend, simulating {}", record.id);
            let report = self.simulate(record, cancel).await?;
            return Ok(AdvisoryOutcome::Simulated(report));
        };

        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(Cancelled),
            result = backend.score(record) => result,
        };

        match result {
            Ok(report) => {
                notify(Notice::success("Analysis complete"));
                Ok(AdvisoryOutcome::Remote(report))
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!("remote analysis of {} failed: {error}", record.id);
                notify(Notice::error(format!(
                    "AI Error: {error}. Switching to Simulation."
                )));
                sleep_or_cancel(self.timing.fallback_delay, cancel).await?;
                let report = self.simulate(record, cancel).await?;
                Ok(AdvisoryOutcome::FellBack { error, report })
            }
        }
    }

    async fn simulate(
        &self,
        record: &ApplicationRecord,
        cancel: &CancellationToken,
    ) -> Result<AdvisoryReport, Cancelled> {
        sleep_or_cancel(self.timing.simulation_delay, cancel).await?;
        Ok(simulate(record))
    }
}

async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> Result<(), Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }
    if duration.is_zero() {
        return Ok(());
    }
    tokio::select! {
        _ = cancel.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
