//! Annual growth multipliers per risk profile

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ProjectionError};
use crate::plan::RiskProfile;

/// Which band of a risk curve to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Min,
    Avg,
    Max,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Min, Scenario::Avg, Scenario::Max];
}

/// Simple growth band (all multipliers > 1, no loss scenario)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskCurve {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl RiskCurve {
    pub const fn new(min: f64, avg: f64, max: f64) -> Self {
        Self { min, avg, max }
    }

    /// Multiplier for one scenario
    pub fn multiplier(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Min => self.min,
            Scenario::Avg => self.avg,
            Scenario::Max => self.max,
        }
    }

    /// Check 1 < min < avg < max
    pub fn validate(&self) -> CoreResult<()> {
        let ordered = self.min > 1.0 && self.min < self.avg && self.avg < self.max;
        if !ordered || !self.max.is_finite() {
            return Err(ProjectionError::InvalidAssumption(format!(
                "risk curve must satisfy 1 < min < avg < max, got {}/{}/{}",
                self.min, self.avg, self.max
            )));
        }
        Ok(())
    }
}

/// Risk curve lookup by profile
#[derive(Debug, Clone)]
pub struct RiskCurveTable {
    curves: BTreeMap<RiskProfile, RiskCurve>,
}

impl RiskCurveTable {
    /// Calibration used by the Mini App
    pub fn reference() -> Self {
        let mut curves = BTreeMap::new();
        curves.insert(RiskProfile::Conservative, RiskCurve::new(1.05, 1.08, 1.12));
        curves.insert(RiskProfile::Moderate, RiskCurve::new(1.07, 1.15, 1.22));
        curves.insert(RiskProfile::Aggressive, RiskCurve::new(1.10, 1.25, 1.40));
        Self { curves }
    }

    /// Build from loaded rows; every profile must be present exactly once
    pub fn from_loaded(rows: &[(RiskProfile, RiskCurve)]) -> CoreResult<Self> {
        let mut curves = BTreeMap::new();
        for (profile, curve) in rows {
            curve.validate()?;
            if curves.insert(*profile, *curve).is_some() {
                return Err(ProjectionError::InvalidAssumption(format!(
                    "duplicate risk curve for {}",
                    profile
                )));
            }
        }
        for profile in RiskProfile::ALL {
            if !curves.contains_key(&profile) {
                return Err(ProjectionError::InvalidAssumption(format!(
                    "missing risk curve for {}",
                    profile
                )));
            }
        }
        Ok(Self { curves })
    }

    /// Curve for a profile
    pub fn get(&self, profile: RiskProfile) -> RiskCurve {
        // Both constructors guarantee every profile is present
        self.curves[&profile]
    }

    /// Highest multiplier across all profiles (used for chart scaling)
    pub fn highest_max(&self) -> f64 {
        self.curves.values().map(|c| c.max).fold(1.0, f64::max)
    }
}

impl Default for RiskCurveTable {
    fn default() -> Self {
        Self::reference()
    }
}
