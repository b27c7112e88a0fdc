//! Power series analysis.
//!
//! Normalized Power, summary statistics, the power duration curve and
//! time-in-zone from one sequence of 1 Hz power samples. Sample positions
//! define time; gaps in `offset_secs` are not interpolated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::metrics::analytics::pdc::{PowerCurvePoint, PowerDurationCurve};
use crate::metrics::analytics::tss::{calculate_tss, intensity_factor};
use crate::metrics::kernel::{PortableKernel, PowerKernel};
use crate::metrics::zones::{zone_index, AthleteProfile, ZoneDefinition};

/// One power reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSample {
    /// Seconds since the start of the workout
    pub offset_secs: u32,
    /// Power in watts
    pub watts: f64,
}

impl PowerSample {
    pub fn new(offset_secs: u32, watts: f64) -> Self {
        Self { offset_secs, watts }
    }

    /// Build a 1 Hz series from raw watt values.
    pub fn series_from_watts(watts: &[f64]) -> Vec<PowerSample> {
        watts
            .iter()
            .zip(0u32..)
            .map(|(&w, offset)| PowerSample::new(offset, w))
            .collect()
    }
}

/// Summary statistics over the samples with positive power.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerStats {
    /// Mean power of positive samples
    pub average: f64,
    /// Maximum power
    pub max: f64,
    /// Minimum positive power
    pub min: f64,
    /// Normalized Power of positive samples
    pub normalized_power: f64,
    /// NP / average
    pub variability_index: f64,
    /// Mechanical work in kJ, rounded to 0.1
    pub total_work_kj: f64,
}

/// Time spent in one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTime {
    pub zone_id: u8,
    pub name: String,
    /// Samples in this zone
    pub count: usize,
    /// Seconds in this zone (1 Hz sampling)
    pub time_secs: u64,
    /// Share of positive samples, 0-100
    pub percentage: f64,
}

/// Time-in-zone for every zone of a model, in zone order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneDistribution {
    pub zones: Vec<ZoneTime>,
}

impl ZoneDistribution {
    fn zeroed(zones: &[ZoneDefinition]) -> Self {
        Self {
            zones: zones
                .iter()
                .map(|zone| ZoneTime {
                    zone_id: zone.id,
                    name: zone.name.clone(),
                    count: 0,
                    time_secs: 0,
                    percentage: 0.0,
                })
                .collect(),
        }
    }

    /// Total samples assigned to a zone.
    pub fn counted_samples(&self) -> usize {
        self.zones.iter().map(|z| z.count).sum()
    }

    /// Sum of all zone percentages (100 or 0).
    pub fn total_percentage(&self) -> f64 {
        self.zones.iter().map(|z| z.percentage).sum()
    }
}

/// Full analysis of one workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutAnalysis {
    pub stats: PowerStats,
    pub power_curve: PowerDurationCurve,
    pub zone_distribution: ZoneDistribution,
    pub intensity_factor: f64,
    pub tss: f64,
    /// Recorded duration in seconds (sample count)
    pub duration_secs: u64,
}

/// Analyzes power series through an injected [`PowerKernel`].
#[derive(Debug, Clone)]
pub struct PowerSeriesAnalyzer {
    kernel: Arc<dyn PowerKernel>,
}

impl PowerSeriesAnalyzer {
    /// Create an analyzer using the given kernel.
    pub fn new(kernel: Arc<dyn PowerKernel>) -> Self {
        Self { kernel }
    }

    /// Analyzer backed by the portable reference kernel.
    pub fn portable() -> Self {
        Self::new(Arc::new(PortableKernel))
    }

    /// The kernel in use.
    pub fn kernel(&self) -> &Arc<dyn PowerKernel> {
        &self.kernel
    }

    /// Normalized Power over the whole series, zero samples included.
    pub fn calculate_normalized_power(&self, series: &[PowerSample]) -> f64 {
        let watts: Vec<f64> = series.iter().map(|s| s.watts).collect();
        self.kernel.normalized_power(&watts)
    }

    /// Summary statistics over samples with `watts > 0`.
    ///
    /// An empty or all-zero series yields `PowerStats::default()`.
    pub fn calculate_power_stats(&self, series: &[PowerSample]) -> PowerStats {
        let positive: Vec<f64> = series
            .iter()
            .map(|s| s.watts)
            .filter(|&w| w > 0.0)
            .collect();

        if positive.is_empty() {
            tracing::debug!(samples = series.len(), "No positive power samples");
            return PowerStats::default();
        }

        let total: f64 = positive.iter().sum();
        let average = total / positive.len() as f64;
        let max = positive.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = positive.iter().copied().fold(f64::INFINITY, f64::min);
        let normalized_power = self.kernel.normalized_power(&positive);
        let variability_index = if average > 0.0 {
            normalized_power / average
        } else {
            0.0
        };

        PowerStats {
            average,
            max,
            min,
            normalized_power,
            variability_index,
            total_work_kj: (total / 1000.0 * 10.0).round() / 10.0,
        }
    }

    /// Best average power for each requested duration.
    ///
    /// Durations of zero or longer than the series are skipped.
    pub fn calculate_power_curve(
        &self,
        series: &[PowerSample],
        durations: &[u32],
    ) -> PowerDurationCurve {
        let watts: Vec<f64> = series.iter().map(|s| s.watts).collect();

        let points = durations
            .iter()
            .filter_map(|&duration| {
                self.kernel
                    .max_average_power(&watts, duration as usize)
                    .map(|max_average_power| PowerCurvePoint {
                        duration_secs: duration,
                        max_average_power,
                    })
            })
            .collect();

        PowerDurationCurve::from_points(points)
    }

    /// Time-in-zone over samples with `watts > 0`.
    ///
    /// Each sample goes to the first zone whose `[min * ftp, max * ftp)` band
    /// contains it. Zero-filled when `ftp <= 0` or there are no positive samples.
    pub fn calculate_zone_distribution(
        &self,
        series: &[PowerSample],
        ftp: f64,
        zones: &[ZoneDefinition],
    ) -> ZoneDistribution {
        let mut distribution = ZoneDistribution::zeroed(zones);
        if !(ftp > 0.0) || zones.is_empty() {
            return distribution;
        }

        for sample in series.iter().filter(|s| s.watts > 0.0) {
            if let Some(idx) = zone_index(zones, sample.watts, ftp) {
                distribution.zones[idx].count += 1;
            }
        }

        let counted = distribution.counted_samples();
        if counted == 0 {
            return distribution;
        }

        for zone in &mut distribution.zones {
            zone.time_secs = zone.count as u64;
            zone.percentage = zone.count as f64 / counted as f64 * 100.0;
        }

        distribution
    }

    /// Stats, curve, zones and TSS for one workout.
    pub fn analyze(
        &self,
        series: &[PowerSample],
        profile: &AthleteProfile,
        durations: &[u32],
    ) -> WorkoutAnalysis {
        let stats = self.calculate_power_stats(series);
        let duration_secs = series.len() as u64;
        let ftp = profile.ftp();

        WorkoutAnalysis {
            stats,
            power_curve: self.calculate_power_curve(series, durations),
            zone_distribution: self.calculate_zone_distribution(
                series,
                ftp,
                profile.zones().zones(),
            ),
            intensity_factor: intensity_factor(stats.normalized_power, ftp),
            tss: calculate_tss(stats.normalized_power, duration_secs as f64, ftp, None),
            duration_secs,
        }
    }
}

impl Default for PowerSeriesAnalyzer {
    fn default() -> Self {
        Self::portable()
    }
}
