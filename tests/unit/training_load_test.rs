//! Unit tests for ATL/CTL/TSB tracking.

use chrono::NaiveDate;
use powerload::metrics::analytics::{
    fill_missing_days, DailyTss, LoadState, PatternFlag, TrainingForm, TrainingLoadTracker,
};

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i64::from(n))
}

fn constant_block(start: u32, days: u32, tss: f64) -> Vec<DailyTss> {
    (start..start + days).map(|n| DailyTss::new(day(n), tss)).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[test]
fn test_first_days_at_100() {
    let loads = TrainingLoadTracker::process(&constant_block(0, 3, 100.0));

    assert_eq!(round2(loads[0].atl), 14.29);
    assert_eq!(round2(loads[0].ctl), 2.38);
    assert_eq!(loads[0].form, TrainingForm::Tired);

    assert!(loads[1].atl > loads[0].atl);
    assert!(loads[2].ctl > loads[1].ctl);
}

#[test]
fn test_constant_load_converges() {
    let loads = TrainingLoadTracker::process(&constant_block(0, 200, 100.0));
    let last = loads.last().unwrap();

    assert!(last.atl > 99.9 && last.atl < 100.0 + 1e-9);
    assert!(last.ctl > 95.0 && last.ctl <= 100.0);
    assert!(loads.windows(2).all(|w| w[1].ctl >= w[0].ctl));
}

#[test]
fn test_tsb_is_exactly_ctl_minus_atl() {
    let mut days = constant_block(0, 20, 120.0);
    days.extend(constant_block(20, 10, 0.0));
    days.extend(constant_block(30, 5, 250.0));

    for load in TrainingLoadTracker::process(&days) {
        assert_eq!(load.tsb, load.ctl - load.atl);
        assert_eq!(load.form, TrainingForm::from_tsb(load.tsb));
    }
}

#[test]
fn test_ramp_rate_needs_a_week_of_history() {
    let loads = TrainingLoadTracker::process(&constant_block(0, 10, 80.0));

    assert!(loads[..7].iter().all(|l| l.ramp_rate == 0.0));
    assert_eq!(loads[7].ramp_rate, loads[7].ctl - loads[0].ctl);
    assert_eq!(loads[9].ramp_rate, loads[9].ctl - loads[2].ctl);
}

#[test]
fn test_single_hard_day_is_overreaching() {
    let loads = TrainingLoadTracker::process(&constant_block(0, 1, 100.0));

    assert_eq!(
        loads[0].flags.iter().copied().collect::<Vec<_>>(),
        vec![PatternFlag::Overreaching]
    );
    assert_eq!(loads[0].recommendations, vec!["Reduce training intensity"]);
}

#[test]
fn test_crash_block_flags_in_order() {
    let loads = TrainingLoadTracker::process(&constant_block(0, 8, 300.0));
    let day8 = &loads[7];

    assert_eq!(day8.form, TrainingForm::VeryTired);
    assert_eq!(
        day8.flags.iter().copied().collect::<Vec<_>>(),
        vec![
            PatternFlag::Overreaching,
            PatternFlag::RapidBuildup,
            PatternFlag::ChronicFatigue,
        ]
    );
    assert_eq!(
        day8.recommendations,
        vec![
            "Reduce training intensity",
            "Monitor fatigue closely",
            "Schedule rest days",
        ]
    );
}

#[test]
fn test_week_off_is_detraining() {
    let mut days = constant_block(0, 42, 100.0);
    days.extend(constant_block(42, 7, 0.0));
    let loads = TrainingLoadTracker::process(&days);
    let last = loads.last().unwrap();

    assert!(last.ramp_rate < -5.0);
    assert!(last.flags.contains(&PatternFlag::Detraining));
    assert!(!last.flags.contains(&PatternFlag::ChronicFatigue));
}

#[test]
fn test_resume_continues_from_state() {
    let days = constant_block(0, 10, 90.0);
    let full = TrainingLoadTracker::process(&days);

    let mut resumed = TrainingLoadTracker::resume(full[4].state());
    let next = resumed.step(days[5].date, days[5].tss, None);

    assert_eq!(next.atl, full[5].atl);
    assert_eq!(next.ctl, full[5].ctl);
    assert_eq!(resumed.state(), Some(LoadState { atl: next.atl, ctl: next.ctl }));
}

#[test]
fn test_fill_missing_days_inserts_rest_days() {
    let days = vec![
        DailyTss::new(day(0), 80.0),
        DailyTss::new(day(3), 60.0),
        DailyTss::new(day(4), 40.0),
    ];
    let filled = fill_missing_days(&days);

    assert_eq!(filled.len(), 5);
    assert_eq!(filled[1], DailyTss::new(day(1), 0.0));
    assert_eq!(filled[2], DailyTss::new(day(2), 0.0));
    assert_eq!(filled[3].tss, 60.0);
    assert!(fill_missing_days(&[]).is_empty());
}

#[test]
fn test_snapshot_json_shape() {
    let loads = TrainingLoadTracker::process(&constant_block(0, 8, 300.0));
    let json = serde_json::to_value(&loads[7]).unwrap();

    assert_eq!(json["date"], "2024-01-08");
    assert_eq!(json["form"], "very_tired");
    assert_eq!(
        json["flags"],
        serde_json::json!(["overreaching", "rapid_buildup", "chronic_fatigue"])
    );
}
