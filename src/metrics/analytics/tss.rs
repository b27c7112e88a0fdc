//! Training Stress Score.
//!
//! TSS = hours × NP × IF / FTP × 100, so one hour at FTP scores 100.

use serde::{Deserialize, Serialize};

use crate::metrics::calculator::{PowerSample, PowerSeriesAnalyzer};

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Intensity Factor: NP / FTP, 0 when FTP is not positive.
pub fn intensity_factor(normalized_power: f64, ftp: f64) -> f64 {
    if !(ftp > 0.0) {
        return 0.0;
    }
    normalized_power / ftp
}

/// Training Stress Score for one session, rounded to 0.1.
///
/// `intensity_factor` overrides NP / FTP when given. Returns 0 when FTP,
/// duration or NP is not positive (no power data).
pub fn calculate_tss(
    normalized_power: f64,
    duration_secs: f64,
    ftp: f64,
    intensity_factor: Option<f64>,
) -> f64 {
    if !(ftp > 0.0) || !(duration_secs > 0.0) || !(normalized_power > 0.0) {
        return 0.0;
    }

    let intensity = intensity_factor.unwrap_or(normalized_power / ftp);
    let duration_hours = duration_secs / 3600.0;

    round1(duration_hours * normalized_power * intensity / ftp * 100.0)
}

/// TSS of a recorded series: NP over positive samples, one second per sample.
pub fn tss_for_series(analyzer: &PowerSeriesAnalyzer, series: &[PowerSample], ftp: f64) -> f64 {
    let stats = analyzer.calculate_power_stats(series);
    calculate_tss(stats.normalized_power, series.len() as f64, ftp, None)
}

/// One block of a planned workout, intensities as fractions of FTP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSegment {
    /// Segment length in seconds
    pub duration_secs: u32,
    /// Target at the start of the segment (1.0 = FTP)
    pub power_start: f64,
    /// Target at the end for ramps; `None` for steady state
    pub power_end: Option<f64>,
}

impl WorkoutSegment {
    /// Steady-state segment.
    pub fn steady(duration_secs: u32, power: f64) -> Self {
        Self {
            duration_secs,
            power_start: power,
            power_end: None,
        }
    }

    /// Linear ramp between two intensities.
    pub fn ramp(duration_secs: u32, power_start: f64, power_end: f64) -> Self {
        Self {
            duration_secs,
            power_start,
            power_end: Some(power_end),
        }
    }

    /// Mean intensity over the segment.
    pub fn average_intensity(&self) -> f64 {
        match self.power_end {
            Some(end) => (self.power_start + end) / 2.0,
            None => self.power_start,
        }
    }
}

/// Estimated TSS of a planned workout: Σ hours × IF² × 100, rounded to 0.1.
pub fn planned_tss(segments: &[WorkoutSegment]) -> f64 {
    let total: f64 = segments
        .iter()
        .filter(|s| s.duration_secs > 0 && s.average_intensity() > 0.0)
        .map(|s| {
            let intensity = s.average_intensity();
            f64::from(s.duration_secs) / 3600.0 * intensity * intensity * 100.0
        })
        .sum();

    round1(total)
}
