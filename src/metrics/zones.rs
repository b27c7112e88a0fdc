//! Power zone model.
//!
//! Zones are contiguous bands expressed as fractions of FTP, covering
//! `[0, +inf)`. The default is the Coggan 7-zone model.

use serde::{Deserialize, Serialize};

use crate::metrics::analytics::error::{AnalyticsError, AnalyticsResult};

/// Tolerance when checking that adjacent bands touch.
const CONTIGUITY_EPSILON: f64 = 1e-9;

/// A single power zone band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    /// Zone number (1-based for the default model)
    pub id: u8,
    /// Zone name
    pub name: String,
    /// Inclusive lower bound as a fraction of FTP
    pub min_fraction: f64,
    /// Exclusive upper bound as a fraction of FTP (`None` = no upper limit)
    pub max_fraction: Option<f64>,
}

impl ZoneDefinition {
    /// Create a bounded zone.
    pub fn new(id: u8, name: impl Into<String>, min_fraction: f64, max_fraction: f64) -> Self {
        Self {
            id,
            name: name.into(),
            min_fraction,
            max_fraction: Some(max_fraction),
        }
    }

    /// Create the open-ended top zone.
    pub fn unbounded(id: u8, name: impl Into<String>, min_fraction: f64) -> Self {
        Self {
            id,
            name: name.into(),
            min_fraction,
            max_fraction: None,
        }
    }

    /// Whether `watts` falls inside `[min * ftp, max * ftp)`.
    pub fn contains(&self, watts: f64, ftp: f64) -> bool {
        let lower = self.min_fraction * ftp;
        match self.max_fraction {
            Some(max) => watts >= lower && watts < max * ftp,
            None => watts >= lower,
        }
    }

    /// Watt bounds of this zone for a given FTP.
    pub fn watt_range(&self, ftp: f64) -> (f64, Option<f64>) {
        (self.min_fraction * ftp, self.max_fraction.map(|max| max * ftp))
    }
}

/// Validated, ordered list of zone bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ZoneDefinition>", into = "Vec<ZoneDefinition>")]
pub struct ZoneModel {
    zones: Vec<ZoneDefinition>,
}

impl ZoneModel {
    /// Build a zone model, rejecting bands that do not tile `[0, +inf)`.
    pub fn new(zones: Vec<ZoneDefinition>) -> AnalyticsResult<Self> {
        validate_zones(&zones)?;
        Ok(Self { zones })
    }

    /// Coggan 7-zone model.
    pub fn coggan() -> Self {
        Self {
            zones: vec![
                ZoneDefinition::new(1, "Active Recovery", 0.0, 0.55),
                ZoneDefinition::new(2, "Endurance", 0.55, 0.75),
                ZoneDefinition::new(3, "Tempo", 0.75, 0.90),
                ZoneDefinition::new(4, "Threshold", 0.90, 1.05),
                ZoneDefinition::new(5, "VO2max", 1.05, 1.20),
                ZoneDefinition::new(6, "Anaerobic", 1.20, 1.50),
                ZoneDefinition::unbounded(7, "Neuromuscular", 1.50),
            ],
        }
    }

    /// Zone bands in order.
    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Always false for a validated model; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Get the zone containing `watts` for the given FTP.
    pub fn zone_for(&self, watts: f64, ftp: f64) -> Option<&ZoneDefinition> {
        zone_index(&self.zones, watts, ftp).map(|idx| &self.zones[idx])
    }
}

impl Default for ZoneModel {
    fn default() -> Self {
        Self::coggan()
    }
}

impl TryFrom<Vec<ZoneDefinition>> for ZoneModel {
    type Error = AnalyticsError;

    fn try_from(zones: Vec<ZoneDefinition>) -> Result<Self, Self::Error> {
        Self::new(zones)
    }
}

impl From<ZoneModel> for Vec<ZoneDefinition> {
    fn from(model: ZoneModel) -> Self {
        model.zones
    }
}

/// Index of the first zone whose band contains `watts`.
pub fn zone_index(zones: &[ZoneDefinition], watts: f64, ftp: f64) -> Option<usize> {
    zones.iter().position(|zone| zone.contains(watts, ftp))
}

fn validate_zones(zones: &[ZoneDefinition]) -> AnalyticsResult<()> {
    let Some(first) = zones.first() else {
        return Err(AnalyticsError::InvalidZoneModel(
            "at least one zone is required".to_string(),
        ));
    };

    if first.min_fraction.abs() > CONTIGUITY_EPSILON {
        return Err(AnalyticsError::InvalidZoneModel(format!(
            "zone {} must start at 0, starts at {}",
            first.id, first.min_fraction
        )));
    }

    let last_idx = zones.len() - 1;
    for (idx, zone) in zones.iter().enumerate() {
        if !zone.min_fraction.is_finite() {
            return Err(AnalyticsError::InvalidZoneModel(format!(
                "zone {} has a non-finite lower bound",
                zone.id
            )));
        }

        match zone.max_fraction {
            Some(max) if !max.is_finite() || max <= zone.min_fraction => {
                return Err(AnalyticsError::InvalidZoneModel(format!(
                    "zone {} upper bound {} is not above its lower bound {}",
                    zone.id, max, zone.min_fraction
                )));
            }
            Some(_) if idx == last_idx => {
                return Err(AnalyticsError::InvalidZoneModel(format!(
                    "top zone {} must be unbounded",
                    zone.id
                )));
            }
            None if idx != last_idx => {
                return Err(AnalyticsError::InvalidZoneModel(format!(
                    "only the top zone may be unbounded, zone {} is not last",
                    zone.id
                )));
            }
            _ => {}
        }

        if let Some(next) = zones.get(idx + 1) {
            // Checked above: every non-top zone has an upper bound.
            let max = zone.max_fraction.unwrap_or(f64::INFINITY);
            if (next.min_fraction - max).abs() > CONTIGUITY_EPSILON {
                let relation = if next.min_fraction < max {
                    "overlaps"
                } else {
                    "leaves a gap after"
                };
                return Err(AnalyticsError::InvalidZoneModel(format!(
                    "zone {} {} zone {}",
                    next.id, relation, zone.id
                )));
            }
        }
    }

    Ok(())
}

/// FTP and zone model for one athlete, validated once up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAthleteProfile", into = "RawAthleteProfile")]
pub struct AthleteProfile {
    ftp: f64,
    zones: ZoneModel,
}

/// Serialized form; `zones` defaults to Coggan when omitted.
#[derive(Serialize, Deserialize)]
struct RawAthleteProfile {
    ftp: f64,
    #[serde(default)]
    zones: ZoneModel,
}

impl TryFrom<RawAthleteProfile> for AthleteProfile {
    type Error = AnalyticsError;

    fn try_from(raw: RawAthleteProfile) -> Result<Self, Self::Error> {
        Self::new(raw.ftp, raw.zones)
    }
}

impl From<AthleteProfile> for RawAthleteProfile {
    fn from(profile: AthleteProfile) -> Self {
        Self {
            ftp: profile.ftp,
            zones: profile.zones,
        }
    }
}

impl AthleteProfile {
    /// Create a profile; FTP must be positive and finite.
    pub fn new(ftp: f64, zones: ZoneModel) -> AnalyticsResult<Self> {
        if !ftp.is_finite() || ftp <= 0.0 {
            return Err(AnalyticsError::InvalidFtp(ftp));
        }
        Ok(Self { ftp, zones })
    }

    /// Profile with the Coggan zone model.
    pub fn with_ftp(ftp: f64) -> AnalyticsResult<Self> {
        Self::new(ftp, ZoneModel::coggan())
    }

    /// Functional Threshold Power in watts.
    pub fn ftp(&self) -> f64 {
        self.ftp
    }

    /// Power zones.
    pub fn zones(&self) -> &ZoneModel {
        &self.zones
    }
}
