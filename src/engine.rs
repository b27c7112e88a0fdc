//! Engine façade.
//!
//! Built once from an [`EngineConfig`]: selects the power kernel and wires it
//! into the analyzer and batch runner. Holds no mutable state.

use std::path::Path;

use crate::config::{load_config, ConfigError, EngineConfig};
use crate::metrics::analytics::batch::{BatchReport, BatchRunner, CancellationToken};
use crate::metrics::analytics::critical_power::{CpFitter, CpModel};
use crate::metrics::analytics::error::AnalyticsResult;
use crate::metrics::analytics::pdc::PowerDurationCurve;
use crate::metrics::analytics::training_load::{DailyTrainingLoad, DailyTss, TrainingLoadTracker};
use crate::metrics::calculator::{PowerSample, PowerSeriesAnalyzer, WorkoutAnalysis};
use crate::metrics::kernel::select_kernel;
use crate::metrics::zones::AthleteProfile;

/// Configured analytics engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    analyzer: PowerSeriesAnalyzer,
    batch: BatchRunner,
}

impl Engine {
    /// Validate `config` and select the power kernel.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let analyzer = PowerSeriesAnalyzer::new(select_kernel(config.kernel));
        let batch = BatchRunner::new(
            analyzer.clone(),
            &config.curve_durations,
            config.batch.clone(),
        );

        Ok(Self {
            config,
            analyzer,
            batch,
        })
    }

    /// Build from a TOML config file (defaults when it is missing).
    pub fn from_config_file(path: &Path) -> Result<Self, ConfigError> {
        Self::new(load_config(path)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &PowerSeriesAnalyzer {
        &self.analyzer
    }

    /// Name of the kernel chosen at construction.
    pub fn kernel_name(&self) -> &'static str {
        self.analyzer.kernel().name()
    }

    /// Power curve over the configured durations.
    pub fn power_curve(&self, series: &[PowerSample]) -> PowerDurationCurve {
        self.analyzer
            .calculate_power_curve(series, &self.config.curve_durations)
    }

    /// Full analysis of one workout.
    pub fn analyze_workout(
        &self,
        series: &[PowerSample],
        profile: &AthleteProfile,
    ) -> WorkoutAnalysis {
        self.analyzer
            .analyze(series, profile, &self.config.curve_durations)
    }

    /// Fit the 2-parameter CP model to a curve.
    pub fn fit_critical_power(&self, curve: &PowerDurationCurve) -> CpModel {
        CpFitter::new().fit(curve)
    }

    /// Daily ATL/CTL/TSB series from a cold start.
    pub fn training_load(&self, days: &[DailyTss]) -> Vec<DailyTrainingLoad> {
        TrainingLoadTracker::process(days)
    }

    /// Analyze many workouts with the configured batch settings.
    pub async fn run_batch(
        &self,
        workouts: Vec<Vec<PowerSample>>,
        profile: &AthleteProfile,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<BatchReport> {
        self.batch.run(workouts, profile, cancel).await
    }
}
