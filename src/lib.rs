//! PowerLoad - power and training-load analytics.
//!
//! Turns 1 Hz power samples into Normalized Power, power curves, time in
//! zone, critical power and TSS, and daily TSS into ATL/CTL/TSB with
//! training-form classification. Pure computation: no I/O beyond optional
//! config loading, no global state.

pub mod config;
pub mod engine;
pub mod metrics;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use metrics::analytics::{
    AnalyticsError, AnalyticsResult, CpFitter, CpModel, DailyTrainingLoad, DailyTss,
    PowerDurationCurve, TrainingLoadTracker,
};
pub use metrics::calculator::{PowerSample, PowerSeriesAnalyzer, PowerStats};
pub use metrics::zones::{AthleteProfile, ZoneModel};
