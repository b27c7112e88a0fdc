//! Critical Power / W' Model calculation.
//!
//! The 2-parameter model treats total work at a duration as linear in time:
//! `work = CP × t + W'`. Fitting is ordinary least squares on
//! `(t, power × t)` pairs taken from the power duration curve.
//!
//! The model provides:
//! - Critical Power (CP): The highest power sustainable indefinitely
//! - W' (W-prime): Anaerobic work capacity in joules
//! - Time-to-exhaustion predictions at any power above CP

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pdc::PowerDurationCurve;

/// Minimum usable points for a fit.
pub const MIN_FIT_POINTS: usize = 3;

/// Critical Power model parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpModel {
    /// Critical Power in watts.
    pub cp: f64,
    /// W' (anaerobic capacity) in joules.
    pub w_prime: f64,
    /// Model fit quality (R² value, 0-1).
    pub r_squared: f64,
}

/// CP model fitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpFitter {
    /// Optional inclusive duration window in seconds.
    range: Option<(u32, u32)>,
}

impl CpFitter {
    /// Fit over every usable curve point.
    pub fn new() -> Self {
        Self { range: None }
    }

    /// Only fit points whose duration lies in `[min_secs, max_secs]`.
    pub fn with_range(min_secs: u32, max_secs: u32) -> Self {
        Self {
            range: Some((min_secs, max_secs)),
        }
    }

    /// Fit CP model from PDC points.
    ///
    /// Returns the all-zero model when fewer than 3 usable points remain or the
    /// regression is degenerate.
    pub fn fit(&self, pdc: &PowerDurationCurve) -> CpModel {
        let points: Vec<(u32, f64)> = pdc
            .points()
            .iter()
            .filter(|p| match self.range {
                Some((min, max)) => p.duration_secs >= min && p.duration_secs <= max,
                None => true,
            })
            .map(|p| (p.duration_secs, p.max_average_power))
            .collect();

        self.fit_points(&points)
    }

    /// Fit from explicit (duration, power) pairs.
    pub fn fit_points(&self, points: &[(u32, f64)]) -> CpModel {
        // Transform to linear form: work = CP × time + W'
        let work_time_pairs: Vec<(f64, f64)> = points
            .iter()
            .filter(|(d, p)| *d > 0 && *p > 0.0)
            .map(|(d, p)| {
                let secs = f64::from(*d);
                (secs, p * secs)
            })
            .collect();

        if work_time_pairs.len() < MIN_FIT_POINTS {
            tracing::debug!(
                usable = work_time_pairs.len(),
                "Not enough curve points for a CP fit"
            );
            return CpModel::default();
        }

        match linear_regression(&work_time_pairs) {
            Some((slope, intercept, r_squared)) => CpModel {
                cp: slope,
                w_prime: intercept,
                r_squared: r_squared.clamp(0.0, 1.0),
            },
            None => {
                tracing::debug!("Degenerate regression in CP fit");
                CpModel::default()
            }
        }
    }
}

impl CpModel {
    /// Predict time to exhaustion at given power.
    /// Returns None if power <= CP (theoretically infinite), or if the power is
    /// not a number or the time is too large for a `Duration`.
    pub fn time_to_exhaustion(&self, power_watts: f64) -> Option<Duration> {
        if power_watts <= self.cp || self.w_prime <= 0.0 {
            return None;
        }

        let tte_secs = self.w_prime / (power_watts - self.cp);
        Duration::try_from_secs_f64(tte_secs).ok()
    }

    /// Predict sustainable power for given duration.
    pub fn power_at_duration(&self, duration: Duration) -> f64 {
        let secs = duration.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }

        self.cp + self.w_prime / secs
    }

    /// Remaining W' after riding at `power_watts` for `duration`.
    /// Negative when W' would be exhausted.
    pub fn w_prime_remaining(&self, power_watts: f64, duration: Duration) -> f64 {
        if power_watts <= self.cp {
            return self.w_prime;
        }

        self.w_prime - (power_watts - self.cp) * duration.as_secs_f64()
    }
}

/// Linear regression on (x, y) pairs.
/// Returns (slope, intercept, r_squared), or `None` when degenerate.
fn linear_regression(points: &[(f64, f64)]) -> Option<(f64, f64, f64)> {
    let n = points.len() as f64;
    if points.len() < 2 {
        return None;
    }

    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-10 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_tot: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    if ss_tot <= 0.0 {
        return None;
    }

    let ss_res: f64 = points
        .iter()
        .map(|(x, y)| {
            let predicted = slope * x + intercept;
            (y - predicted).powi(2)
        })
        .sum();

    Some((slope, intercept, 1.0 - ss_res / ss_tot))
}
