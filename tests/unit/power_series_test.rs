//! Unit tests for power series analysis.

use powerload::metrics::analytics::tss_for_series;
use powerload::metrics::{AthleteProfile, PowerSample, PowerSeriesAnalyzer, PowerStats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Warmup, 3 x 5min at 105% with 3min recoveries, cooldown.
fn interval_workout(ftp: f64) -> Vec<f64> {
    let mut watts = vec![(ftp * 0.5).round(); 600];
    for _ in 0..3 {
        watts.extend(vec![(ftp * 1.05).round(); 300]);
        watts.extend(vec![(ftp * 0.5).round(); 180]);
    }
    watts.extend(vec![(ftp * 0.4).round(); 300]);
    watts
}

#[test]
fn test_constant_power_np_equals_power() {
    let analyzer = PowerSeriesAnalyzer::default();
    for watts in [90.0, 180.0, 333.0] {
        let series = PowerSample::series_from_watts(&vec![watts; 900]);
        let np = analyzer.calculate_normalized_power(&series);
        assert!((np - watts).abs() < 1e-9, "{np} != {watts}");
    }
}

#[test]
fn test_np_at_least_average_for_intervals() {
    let analyzer = PowerSeriesAnalyzer::portable();
    let series = PowerSample::series_from_watts(&interval_workout(250.0));
    let stats = analyzer.calculate_power_stats(&series);

    assert!(stats.normalized_power >= stats.average);
    assert!(stats.variability_index > 1.0);
}

#[test]
fn test_np_short_series_uses_shrinking_window() {
    let analyzer = PowerSeriesAnalyzer::portable();
    // Rolling averages: 100, 150 -> NP = ((100^4 + 150^4) / 2)^(1/4)
    let np = analyzer.calculate_normalized_power(&PowerSample::series_from_watts(&[100.0, 200.0]));
    let expected = ((100f64.powi(4) + 150f64.powi(4)) / 2.0).powf(0.25);
    assert!((np - expected).abs() < 1e-9);
}

#[test]
fn test_curve_points_are_achieved_by_some_window() {
    let analyzer = PowerSeriesAnalyzer::portable();
    let mut rng = StdRng::seed_from_u64(7);
    let watts: Vec<f64> = (0..900).map(|_| f64::from(rng.gen_range(0..600u32))).collect();
    let durations = [1, 5, 30, 60, 300, 900];

    let curve = analyzer.calculate_power_curve(&PowerSample::series_from_watts(&watts), &durations);
    assert_eq!(curve.len(), durations.len());

    for point in curve.points() {
        let d = point.duration_secs as usize;
        let means: Vec<f64> = watts
            .windows(d)
            .map(|w| w.iter().sum::<f64>() / d as f64)
            .collect();

        assert!(means
            .iter()
            .any(|m| (m - point.max_average_power).abs() < 1e-9));
        assert!(means.iter().all(|m| *m <= point.max_average_power + 1e-9));
    }
}

#[test]
fn test_curve_is_non_increasing_for_nested_durations() {
    let analyzer = PowerSeriesAnalyzer::portable();
    let series = PowerSample::series_from_watts(&interval_workout(280.0));
    let curve = analyzer.calculate_power_curve(&series, &[5, 30, 60, 300, 600, 1200]);

    for pair in curve.points().windows(2) {
        assert!(pair[0].max_average_power >= pair[1].max_average_power);
    }
}

#[test]
fn test_hour_at_200w_end_to_end() {
    let analyzer = PowerSeriesAnalyzer::portable();
    let profile = AthleteProfile::with_ftp(250.0).unwrap();
    let series = PowerSample::series_from_watts(&vec![200.0; 3600]);

    let analysis = analyzer.analyze(&series, &profile, &[60, 3600]);
    let stats = analysis.stats;

    assert_eq!(stats.average, 200.0);
    assert_eq!(stats.max, 200.0);
    assert_eq!(stats.min, 200.0);
    assert!((stats.normalized_power - 200.0).abs() < 1e-9);
    assert!((stats.variability_index - 1.0).abs() < 1e-9);
    assert_eq!(stats.total_work_kj, 720.0);
    assert_eq!(analysis.tss, 64.0);
    assert_eq!(tss_for_series(&analyzer, &series, 250.0), 64.0);

    // 200W is 80% of FTP: all time in Tempo
    assert_eq!(analysis.zone_distribution.zones[2].time_secs, 3600);
    assert!((analysis.zone_distribution.zones[2].percentage - 100.0).abs() < 1e-9);
}

#[test]
fn test_empty_series_is_all_zero() {
    let analyzer = PowerSeriesAnalyzer::portable();
    let profile = AthleteProfile::with_ftp(250.0).unwrap();
    let analysis = analyzer.analyze(&[], &profile, &[5, 60]);

    assert_eq!(analysis.stats, PowerStats::default());
    assert!(analysis.power_curve.is_empty());
    assert_eq!(analysis.tss, 0.0);
    assert_eq!(analysis.intensity_factor, 0.0);
    assert_eq!(analysis.zone_distribution.zones.len(), 7);
    assert_eq!(analysis.zone_distribution.total_percentage(), 0.0);
}

#[test]
fn test_zone_percentages_sum_to_100_for_intervals() {
    let analyzer = PowerSeriesAnalyzer::portable();
    let profile = AthleteProfile::with_ftp(250.0).unwrap();
    let series = PowerSample::series_from_watts(&interval_workout(250.0));

    let dist =
        analyzer.calculate_zone_distribution(&series, profile.ftp(), profile.zones().zones());
    assert_eq!(dist.counted_samples(), series.len());
    assert!((dist.total_percentage() - 100.0).abs() < 1e-9);

    // 3 x 300s at 263W land in VO2max
    assert_eq!(dist.zones[4].count, 900);
}
