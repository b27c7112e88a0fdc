//! Power metrics: smoothing, zones, kernels and series analysis.

pub mod analytics;
pub mod calculator;
pub mod kernel;
pub mod smoothing;
pub mod zones;

pub use calculator::{
    PowerSample, PowerSeriesAnalyzer, PowerStats, WorkoutAnalysis, ZoneDistribution, ZoneTime,
};
pub use kernel::{select_kernel, AcceleratedKernel, KernelPreference, PortableKernel, PowerKernel};
pub use zones::{AthleteProfile, ZoneDefinition, ZoneModel};
