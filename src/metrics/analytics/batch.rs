//! Batch analysis over many independent workouts.
//!
//! Workouts are processed in fixed-size chunks. Between chunks the runner
//! yields to the tokio scheduler and checks for cancellation; an item that
//! has started always finishes. Results keep input order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::error::{AnalyticsError, AnalyticsResult};
use crate::metrics::calculator::{PowerSample, PowerSeriesAnalyzer, WorkoutAnalysis};
use crate::metrics::zones::AthleteProfile;

/// Default number of workouts per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 16;

/// Batch runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Workouts per chunk (must be > 0)
    pub chunk_size: usize,
    /// Analyze a chunk's workouts on blocking worker threads
    pub parallel: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: false,
        }
    }
}

/// Cooperative cancellation signal, checked between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; clones of this token observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Analyses in input order; a prefix of the input when cancelled.
    pub results: Vec<WorkoutAnalysis>,
    /// Whether the run stopped early.
    pub cancelled: bool,
}

/// Runs the analyzer across many workouts.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    analyzer: PowerSeriesAnalyzer,
    durations: Arc<[u32]>,
    settings: BatchSettings,
}

impl BatchRunner {
    /// Create a runner. A zero chunk size is treated as 1.
    pub fn new(analyzer: PowerSeriesAnalyzer, durations: &[u32], settings: BatchSettings) -> Self {
        let settings = BatchSettings {
            chunk_size: settings.chunk_size.max(1),
            ..settings
        };
        Self {
            analyzer,
            durations: durations.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Analyze every workout for `profile`.
    ///
    /// Fails only when a parallel worker dies; cancellation is reported in the
    /// returned [`BatchReport`].
    pub async fn run(
        &self,
        workouts: Vec<Vec<PowerSample>>,
        profile: &AthleteProfile,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<BatchReport> {
        let total = workouts.len();
        let chunk_size = self.settings.chunk_size;
        let workouts = Arc::new(workouts);
        let mut results = Vec::with_capacity(total);

        tracing::info!(
            workouts = total,
            chunk_size,
            parallel = self.settings.parallel,
            kernel = self.analyzer.kernel().name(),
            "Starting batch analysis"
        );

        let mut start = 0;
        while start < total {
            if cancel.is_cancelled() {
                tracing::warn!(completed = results.len(), total, "Batch analysis cancelled");
                return Ok(BatchReport {
                    results,
                    cancelled: true,
                });
            }

            let end = (start + chunk_size).min(total);
            let chunk = if self.settings.parallel {
                self.run_chunk_parallel(&workouts, start..end, profile).await?
            } else {
                workouts[start..end]
                    .iter()
                    .map(|series| self.analyzer.analyze(series, profile, &self.durations))
                    .collect()
            };
            results.extend(chunk);
            tracing::debug!(completed = end, total, "Batch chunk finished");

            start = end;
            tokio::task::yield_now().await;
        }

        tracing::info!(completed = results.len(), "Batch analysis finished");
        Ok(BatchReport {
            results,
            cancelled: false,
        })
    }

    async fn run_chunk_parallel(
        &self,
        workouts: &Arc<Vec<Vec<PowerSample>>>,
        range: std::ops::Range<usize>,
        profile: &AthleteProfile,
    ) -> AnalyticsResult<Vec<WorkoutAnalysis>> {
        let handles = range.map(|idx| {
            let workouts = Arc::clone(workouts);
            let analyzer = self.analyzer.clone();
            let durations = Arc::clone(&self.durations);
            let profile = profile.clone();
            tokio::task::spawn_blocking(move || {
                analyzer.analyze(&workouts[idx], &profile, &durations)
            })
        });

        // join_all preserves the order of the handles
        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.map_err(|e| AnalyticsError::Worker(e.to_string())))
            .collect()
    }
}
