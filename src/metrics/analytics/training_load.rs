//! Training Load calculations (ATL/CTL/TSB).
//!
//! Implements the Performance Management Chart (PMC) model:
//! - ATL (Acute Training Load): 7-day exponentially weighted average
//! - CTL (Chronic Training Load): 42-day exponentially weighted average
//! - TSB (Training Stress Balance): CTL - ATL
//!
//! Day-to-day transitions are pure functions over [`LoadState`]. The tracker
//! only sequences them and keeps the last week of CTL for the ramp rate.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// ATL time constant in days.
pub const ATL_DAYS: f64 = 7.0;

/// CTL time constant in days.
pub const CTL_DAYS: f64 = 42.0;

/// Days between the CTL values compared for the ramp rate.
pub const RAMP_WINDOW_DAYS: usize = 7;

/// Carry-over between days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadState {
    /// Acute Training Load.
    pub atl: f64,
    /// Chronic Training Load.
    pub ctl: f64,
}

impl LoadState {
    /// Training Stress Balance (CTL - ATL).
    pub fn tsb(&self) -> f64 {
        self.ctl - self.atl
    }
}

/// Advance the load state by one day.
///
/// With no previous day the averages are seeded as `tss / 7` and `tss / 42`.
pub fn transition(previous: Option<LoadState>, daily_tss: f64) -> LoadState {
    let tss = daily_tss.max(0.0);
    match previous {
        None => LoadState {
            atl: tss * (1.0 / ATL_DAYS),
            ctl: tss * (1.0 / CTL_DAYS),
        },
        Some(prev) => LoadState {
            atl: prev.atl * ((ATL_DAYS - 1.0) / ATL_DAYS) + tss * (1.0 / ATL_DAYS),
            ctl: prev.ctl * ((CTL_DAYS - 1.0) / CTL_DAYS) + tss * (1.0 / CTL_DAYS),
        },
    }
}

/// Training form derived from TSB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingForm {
    /// TSB > 25
    Rested,
    /// TSB > 5
    Fresh,
    /// TSB > -10
    Neutral,
    /// TSB > -30
    Tired,
    /// TSB <= -30
    VeryTired,
}

impl TrainingForm {
    /// Classify a TSB value.
    pub fn from_tsb(tsb: f64) -> Self {
        if tsb > 25.0 {
            TrainingForm::Rested
        } else if tsb > 5.0 {
            TrainingForm::Fresh
        } else if tsb > -10.0 {
            TrainingForm::Neutral
        } else if tsb > -30.0 {
            TrainingForm::Tired
        } else {
            TrainingForm::VeryTired
        }
    }
}

impl fmt::Display for TrainingForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingForm::Rested => write!(f, "rested"),
            TrainingForm::Fresh => write!(f, "fresh"),
            TrainingForm::Neutral => write!(f, "neutral"),
            TrainingForm::Tired => write!(f, "tired"),
            TrainingForm::VeryTired => write!(f, "very_tired"),
        }
    }
}

/// Training pattern detected on a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFlag {
    /// ATL above 1.5 × CTL
    Overreaching,
    /// CTL dropping more than 5 per week
    Detraining,
    /// CTL rising more than 10 per week
    RapidBuildup,
    /// TSB below -20 with fewer than 2 rest days
    ChronicFatigue,
    /// TSB above 20 with weekly TSS under half of CTL
    Undertraining,
}

impl PatternFlag {
    /// Advice shown alongside the flag.
    pub fn recommendation(&self) -> &'static str {
        match self {
            PatternFlag::Overreaching => "Reduce training intensity",
            PatternFlag::Detraining => "Increase training volume",
            PatternFlag::RapidBuildup => "Monitor fatigue closely",
            PatternFlag::ChronicFatigue => "Schedule rest days",
            PatternFlag::Undertraining => "Increase training stimulus",
        }
    }
}

impl fmt::Display for PatternFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternFlag::Overreaching => write!(f, "overreaching"),
            PatternFlag::Detraining => write!(f, "detraining"),
            PatternFlag::RapidBuildup => write!(f, "rapid_buildup"),
            PatternFlag::ChronicFatigue => write!(f, "chronic_fatigue"),
            PatternFlag::Undertraining => write!(f, "undertraining"),
        }
    }
}

/// Caller-supplied context for pattern detection.
///
/// Missing values disable the flags that need them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternContext {
    /// Rest days in the past week
    pub rest_days: Option<u32>,
    /// TSS accumulated over the past week
    pub weekly_tss: Option<f64>,
}

/// One day of the training load series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrainingLoad {
    pub date: NaiveDate,
    /// Total TSS for the day.
    pub daily_tss: f64,
    /// Acute Training Load (7-day EWMA).
    pub atl: f64,
    /// Chronic Training Load (42-day EWMA).
    pub ctl: f64,
    /// Training Stress Balance (CTL - ATL).
    pub tsb: f64,
    /// CTL today minus CTL seven days earlier.
    pub ramp_rate: f64,
    pub form: TrainingForm,
    pub flags: BTreeSet<PatternFlag>,
    pub recommendations: Vec<String>,
}

impl DailyTrainingLoad {
    /// ATL/CTL state carried into the next day.
    pub fn state(&self) -> LoadState {
        LoadState {
            atl: self.atl,
            ctl: self.ctl,
        }
    }

    /// Acute:Chronic Workload Ratio for this day.
    pub fn acwr(&self) -> Acwr {
        Acwr::from_loads(self.atl, self.ctl)
    }
}

/// Evaluate every pattern flag against one day.
///
/// Flags are independent and may co-occur; recommendations follow flag order.
pub fn classify_patterns(
    snapshot: &DailyTrainingLoad,
    context: &PatternContext,
) -> (BTreeSet<PatternFlag>, Vec<String>) {
    let mut flags = BTreeSet::new();

    if snapshot.atl > snapshot.ctl * 1.5 {
        flags.insert(PatternFlag::Overreaching);
    }
    if snapshot.ramp_rate < -5.0 {
        flags.insert(PatternFlag::Detraining);
    }
    if snapshot.ramp_rate > 10.0 {
        flags.insert(PatternFlag::RapidBuildup);
    }
    if snapshot.tsb < -20.0 && context.rest_days.is_some_and(|days| days < 2) {
        flags.insert(PatternFlag::ChronicFatigue);
    }
    if snapshot.tsb > 20.0
        && context
            .weekly_tss
            .is_some_and(|weekly| weekly < snapshot.ctl * 0.5)
    {
        flags.insert(PatternFlag::Undertraining);
    }

    let recommendations = flags
        .iter()
        .map(|flag| flag.recommendation().to_string())
        .collect();

    (flags, recommendations)
}

/// Daily TSS input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTss {
    pub date: NaiveDate,
    pub tss: f64,
}

impl DailyTss {
    pub fn new(date: NaiveDate, tss: f64) -> Self {
        Self { date, tss }
    }
}

/// Insert zero-TSS entries for calendar days missing between inputs.
///
/// Input must be chronological; duplicate dates are kept as given.
pub fn fill_missing_days(days: &[DailyTss]) -> Vec<DailyTss> {
    let mut filled: Vec<DailyTss> = Vec::with_capacity(days.len());

    for day in days {
        if let Some(last) = filled.last() {
            let mut next = last.date + Duration::days(1);
            while next < day.date {
                filled.push(DailyTss::new(next, 0.0));
                next += Duration::days(1);
            }
        }
        filled.push(*day);
    }

    filled
}

/// Sequences daily load transitions.
#[derive(Debug, Clone, Default)]
pub struct TrainingLoadTracker {
    /// Previous day's ATL/CTL, `None` before the first day.
    state: Option<LoadState>,
    /// CTL of up to the last 7 days, oldest first.
    ctl_history: VecDeque<f64>,
    /// TSS of up to the last 7 days including today, oldest first.
    tss_week: VecDeque<f64>,
}

impl TrainingLoadTracker {
    /// Tracker starting cold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker resuming from a known state.
    pub fn resume(state: LoadState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// State after the last processed day.
    pub fn state(&self) -> Option<LoadState> {
        self.state
    }

    /// Process one day. `context` overrides the rest-day and weekly-TSS values
    /// the tracker derives from the days it has seen.
    pub fn step(
        &mut self,
        date: NaiveDate,
        daily_tss: f64,
        context: Option<PatternContext>,
    ) -> DailyTrainingLoad {
        let daily_tss = daily_tss.max(0.0);
        let next = transition(self.state, daily_tss);

        let ramp_rate = if self.ctl_history.len() >= RAMP_WINDOW_DAYS {
            self.ctl_history.front().map_or(0.0, |week_ago| next.ctl - week_ago)
        } else {
            0.0
        };

        self.tss_week.push_back(daily_tss);
        if self.tss_week.len() > RAMP_WINDOW_DAYS {
            self.tss_week.pop_front();
        }
        let derived = PatternContext {
            rest_days: Some(self.tss_week.iter().filter(|&&tss| tss == 0.0).count() as u32),
            weekly_tss: Some(self.tss_week.iter().sum()),
        };
        let context = context.unwrap_or(derived);

        let mut snapshot = DailyTrainingLoad {
            date,
            daily_tss,
            atl: next.atl,
            ctl: next.ctl,
            tsb: next.ctl - next.atl,
            ramp_rate,
            form: TrainingForm::from_tsb(next.ctl - next.atl),
            flags: BTreeSet::new(),
            recommendations: Vec::new(),
        };
        let (flags, recommendations) = classify_patterns(&snapshot, &context);
        snapshot.flags = flags;
        snapshot.recommendations = recommendations;

        tracing::trace!(
            %date,
            tss = daily_tss,
            atl = next.atl,
            ctl = next.ctl,
            tsb = snapshot.tsb,
            form = %snapshot.form,
            "Training load updated"
        );

        self.ctl_history.push_back(next.ctl);
        if self.ctl_history.len() > RAMP_WINDOW_DAYS {
            self.ctl_history.pop_front();
        }
        self.state = Some(next);

        snapshot
    }

    /// Process a chronological series from a cold start.
    pub fn process(days: &[DailyTss]) -> Vec<DailyTrainingLoad> {
        let mut tracker = Self::new();
        days.iter()
            .map(|day| tracker.step(day.date, day.tss, None))
            .collect()
    }
}

/// ACWR status thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcwrStatus {
    /// ACWR < 0.8: Undertrained (detraining risk).
    Undertrained,
    /// ACWR 0.8 - 1.3: Optimal training zone.
    Optimal,
    /// ACWR 1.3 - 1.5: Caution zone.
    Caution,
    /// ACWR > 1.5: High injury risk.
    HighRisk,
}

/// Acute:Chronic Workload Ratio result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Acwr {
    /// The ratio value.
    pub ratio: f64,
    /// Status classification.
    pub status: AcwrStatus,
}

impl Acwr {
    /// Ratio of ATL to CTL; 0 (undertrained) when CTL is 0.
    pub fn from_loads(atl: f64, ctl: f64) -> Self {
        let ratio = if ctl > 0.0 { atl / ctl } else { 0.0 };

        let status = if ratio < 0.8 {
            AcwrStatus::Undertrained
        } else if ratio <= 1.3 {
            AcwrStatus::Optimal
        } else if ratio <= 1.5 {
            AcwrStatus::Caution
        } else {
            AcwrStatus::HighRisk
        };

        Self { ratio, status }
    }
}
