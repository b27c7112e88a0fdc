//! Integration tests for the complete analytics pipeline.
//!
//! Tests the end-to-end flow:
//! 1. Simulate rides with power data
//! 2. Build power curves and merge them
//! 3. Fit CP model from the merged curve
//! 4. Score rides and feed daily TSS into the training load tracker

use anyhow::Result;
use chrono::NaiveDate;
use powerload::config::EngineConfig;
use powerload::metrics::analytics::{
    fill_missing_days, planned_tss, CpFitter, DailyTss, PowerDurationCurve, TrainingForm,
    TrainingLoadTracker, WorkoutSegment,
};
use powerload::metrics::{KernelPreference, PowerSample};
use powerload::{AthleteProfile, Engine};
use tracing_subscriber::EnvFilter;

const CP: f64 = 250.0;
const W_PRIME: f64 = 20000.0;
const EFFORTS: [u32; 4] = [180, 420, 720, 1200];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Easy spinning followed by one all-out effort of `secs` on the athlete's
/// power-duration hyperbola.
fn maximal_effort_ride(secs: u32) -> Vec<PowerSample> {
    let mut watts = vec![100.0; 600];
    watts.extend(vec![CP + W_PRIME / f64::from(secs); secs as usize]);
    watts.extend(vec![100.0; 300]);
    PowerSample::series_from_watts(&watts)
}

/// Simulates a structured workout with varying intensities.
fn structured_workout(ftp: f64, duration_mins: usize) -> Vec<PowerSample> {
    // Warm-up: 10 minutes at 50% FTP
    let mut watts = vec![(ftp * 0.5).round(); 600];

    // Main set: 3x 5-min intervals at 105% FTP with 3-min recovery
    for _ in 0..3 {
        watts.extend(vec![(ftp * 1.05).round(); 300]);
        watts.extend(vec![(ftp * 0.5).round(); 180]);
    }

    // Cool-down: remaining time at 40% FTP
    watts.resize(duration_mins * 60, (ftp * 0.4).round());
    PowerSample::series_from_watts(&watts)
}

fn engine() -> Result<Engine> {
    Ok(Engine::new(EngineConfig {
        kernel: KernelPreference::Auto,
        curve_durations: EFFORTS.to_vec(),
        ..Default::default()
    })?)
}

#[test]
fn test_cp_recovered_from_separate_rides() -> Result<()> {
    init_tracing();
    let engine = engine()?;

    let curves: Vec<PowerDurationCurve> = EFFORTS
        .iter()
        .map(|&secs| engine.power_curve(&maximal_effort_ride(secs)))
        .collect();
    let season = PowerDurationCurve::best_of(&curves);

    for &secs in &EFFORTS {
        let expected = CP + W_PRIME / f64::from(secs);
        let best = season.power_at(secs).expect("every effort duration is covered");
        assert!((best - expected).abs() < 1e-6, "{secs}s: {best} != {expected}");
    }

    let model = engine.fit_critical_power(&season);
    assert!((model.cp - CP).abs() < 0.5, "CP {}", model.cp);
    assert!((model.w_prime - W_PRIME).abs() / W_PRIME < 0.01, "W' {}", model.w_prime);
    assert!(model.r_squared > 0.999);

    // A single ride only carries one maximal effort
    let single = CpFitter::new().fit(&curves[0]);
    assert!((single.cp - CP).abs() > 1.0 || single.r_squared < 0.999);
    Ok(())
}

#[test]
fn test_workout_scores_feed_training_load() -> Result<()> {
    init_tracing();
    let engine = engine()?;
    let profile = AthleteProfile::with_ftp(250.0)?;
    let start = NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date");

    let analysis = engine.analyze_workout(&structured_workout(250.0, 60), &profile);
    assert!(analysis.tss > 0.0);
    assert!(analysis.intensity_factor > 0.5 && analysis.intensity_factor < 1.0);
    assert!(analysis.stats.normalized_power >= analysis.stats.average);

    // Ride Monday, Wednesday, Friday and Saturday for four weeks
    let days: Vec<DailyTss> = (0..28)
        .filter(|d| matches!(d % 7, 0 | 2 | 4 | 5))
        .map(|d| DailyTss::new(start + chrono::Duration::days(d), analysis.tss))
        .collect();
    let filled = fill_missing_days(&days);
    assert_eq!(filled.len(), 27);

    let loads = engine.training_load(&filled);
    assert_eq!(loads.len(), filled.len());
    for load in &loads {
        assert_eq!(load.tsb, load.ctl - load.atl);
        assert_eq!(load.recommendations.len(), load.flags.len());
    }

    let last = loads.last().expect("non-empty");
    assert!(last.ctl > loads[0].ctl);
    assert!(last.atl > last.ctl);
    assert_ne!(last.form, TrainingForm::Rested);
    Ok(())
}

#[test]
fn test_planned_and_ridden_tss_agree_for_steady_work() -> Result<()> {
    let engine = engine()?;
    let profile = AthleteProfile::with_ftp(250.0)?;

    let planned = planned_tss(&[WorkoutSegment::steady(3600, 0.8)]);
    let ridden = engine
        .analyze_workout(&PowerSample::series_from_watts(&vec![200.0; 3600]), &profile)
        .tss;

    assert_eq!(planned, 64.0);
    assert_eq!(ridden, planned);
    Ok(())
}

#[test]
fn test_tracker_matches_batch_processing() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let days: Vec<DailyTss> = (0..21)
        .map(|d| DailyTss::new(start + chrono::Duration::days(d), f64::from((d * 17 % 120) as u32)))
        .collect();

    let batch = TrainingLoadTracker::process(&days);
    let mut tracker = TrainingLoadTracker::new();
    let stepped: Vec<_> = days
        .iter()
        .map(|day| tracker.step(day.date, day.tss, None))
        .collect();

    assert_eq!(batch, stepped);
}
