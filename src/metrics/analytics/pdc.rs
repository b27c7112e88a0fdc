//! Power Duration Curve (PDC).
//!
//! The PDC holds the maximum average power sustained for each requested
//! duration within a series. Points are produced by
//! [`PowerSeriesAnalyzer`](crate::metrics::calculator::PowerSeriesAnalyzer)
//! and feed the critical power fit.

use serde::{Deserialize, Serialize};

/// Default curve durations in seconds.
pub const DEFAULT_DURATIONS: &[u32] = &[
    5, 10, 15, 20, 30, // seconds
    60, 120, 300, 600, 1200, 1800, 3600, // 1-60 min
];

/// A single point on the power duration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerCurvePoint {
    /// Duration in seconds.
    pub duration_secs: u32,
    /// Maximum average power at this duration (watts).
    pub max_average_power: f64,
}

/// Power Duration Curve - collection of max power values at each duration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerDurationCurve {
    /// PDC points, sorted by duration.
    points: Vec<PowerCurvePoint>,
}

impl PowerDurationCurve {
    /// Create an empty PDC.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create PDC from existing points.
    pub fn from_points(mut points: Vec<PowerCurvePoint>) -> Self {
        points.sort_by_key(|p| p.duration_secs);
        Self { points }
    }

    /// Merge several curves keeping the best power at every duration.
    pub fn best_of(curves: &[PowerDurationCurve]) -> Self {
        let mut merged = Self::new();
        for curve in curves {
            merged.update(curve.points());
        }
        merged
    }

    /// Get power at an exact duration.
    pub fn power_at(&self, duration_secs: u32) -> Option<f64> {
        self.points
            .binary_search_by_key(&duration_secs, |p| p.duration_secs)
            .ok()
            .map(|idx| self.points[idx].max_average_power)
    }

    /// Get all points for charting.
    pub fn points(&self) -> &[PowerCurvePoint] {
        &self.points
    }

    /// Update PDC with new points, returns which points changed.
    pub fn update(&mut self, new_points: &[PowerCurvePoint]) -> Vec<PowerCurvePoint> {
        let mut changed = Vec::new();

        for new_point in new_points {
            if let Some(existing) = self
                .points
                .iter_mut()
                .find(|p| p.duration_secs == new_point.duration_secs)
            {
                if new_point.max_average_power > existing.max_average_power {
                    *existing = *new_point;
                    changed.push(*new_point);
                }
            } else {
                self.points.push(*new_point);
                changed.push(*new_point);
            }
        }

        self.points.sort_by_key(|p| p.duration_secs);
        changed
    }

    /// Check if PDC is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Get max duration with data.
    pub fn max_duration(&self) -> Option<u32> {
        self.points.last().map(|p| p.duration_secs)
    }
}

impl From<Vec<PowerCurvePoint>> for PowerDurationCurve {
    fn from(points: Vec<PowerCurvePoint>) -> Self {
        Self::from_points(points)
    }
}
