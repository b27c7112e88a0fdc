//! Training analytics built on top of power series analysis.
//!
//! This module provides:
//! - Power Duration Curve (PDC)
//! - Critical Power / W' Model
//! - Training Stress Score
//! - Training Load (ATL/CTL/TSB) with form and pattern flags
//! - Batch analysis across many workouts

pub mod batch;
pub mod critical_power;
pub mod error;
pub mod pdc;
pub mod training_load;
pub mod tss;

// Re-exports for convenience
pub use batch::{BatchReport, BatchRunner, BatchSettings, CancellationToken};
pub use critical_power::{CpFitter, CpModel};
pub use error::{AnalyticsError, AnalyticsResult};
pub use pdc::{PowerCurvePoint, PowerDurationCurve, DEFAULT_DURATIONS};
pub use training_load::{
    classify_patterns, fill_missing_days, transition, Acwr, AcwrStatus, DailyTrainingLoad,
    DailyTss, LoadState, PatternContext, PatternFlag, TrainingForm, TrainingLoadTracker,
};
pub use tss::{calculate_tss, intensity_factor, planned_tss, tss_for_series, WorkoutSegment};
