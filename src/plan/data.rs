//! Investment plan records matching the Mini App's stored `investmentData` format

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ProjectionError};

/// Risk appetite chosen by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    /// Bonds-heavy, lowest growth band
    Conservative,
    /// Balanced equities and bonds
    #[default]
    Moderate,
    /// Equities, crypto and venture exposure
    Aggressive,
}

impl RiskProfile {
    /// All profiles in slider order (left to right)
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    /// Wire code used in stored plans and host messages
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }

    /// Human-readable strategy name
    pub fn display_name(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "Conservative",
            RiskProfile::Moderate => "Moderate",
            RiskProfile::Aggressive => "Aggressive",
        }
    }

    /// Position of the risk slider (0-100) that represents this profile
    pub fn to_slider_value(&self) -> u8 {
        match self {
            RiskProfile::Conservative => 15,
            RiskProfile::Moderate => 50,
            RiskProfile::Aggressive => 85,
        }
    }

    /// Map a risk slider position (0-100) to a profile
    /// <=33 conservative, >=67 aggressive, moderate in between
    pub fn from_slider_value(value: u8) -> Self {
        if value <= 33 {
            RiskProfile::Conservative
        } else if value >= 67 {
            RiskProfile::Aggressive
        } else {
            RiskProfile::Moderate
        }
    }

    /// Parse a wire code, falling back to moderate for anything unrecognized.
    ///
    /// This is the lenient behavior the browser pages had. The engine itself never
    /// falls back; callers that want compatibility opt in here and get a warning.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.parse() {
            Ok(profile) => profile,
            Err(_) => {
                log::warn!("Unknown risk profile {:?}, falling back to moderate", raw);
                RiskProfile::Moderate
            }
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskProfile {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "moderate" => Ok(RiskProfile::Moderate),
            "aggressive" => Ok(RiskProfile::Aggressive),
            other => Err(ProjectionError::invalid_input(
                "riskProfile",
                format!("unknown risk profile {:?}", other),
            )),
        }
    }
}

/// Bounds and defaults the funnel UI applies before handing a plan to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelLimits {
    /// Smallest accepted investment amount
    pub min_amount: f64,
    /// Term slider lower bound in years
    pub min_term: u32,
    /// Term slider upper bound in years
    pub max_term: u32,
    /// Term used when the user does not know their horizon
    pub default_term: u32,
    /// Amount prefilled on the first step
    pub default_amount: f64,
    /// Number of preview points before a profile is chosen (years 0..=10)
    pub preview_years: u32,
}

impl Default for FunnelLimits {
    fn default() -> Self {
        Self {
            min_amount: 1000.0,
            min_term: 1,
            max_term: 10,
            default_term: 5,
            default_amount: 50_000.0,
            preview_years: 10,
        }
    }
}

/// A user's investment plan
///
/// Immutable value: edits go through the `with_*` methods, which return a new plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    /// Invested amount in currency units
    pub amount: f64,

    /// Horizon in whole years
    pub term: u32,

    /// Selected risk profile
    pub risk_profile: RiskProfile,
}

impl InvestmentPlan {
    /// Create a new plan
    pub fn new(amount: f64, term: u32, risk_profile: RiskProfile) -> Self {
        Self {
            amount,
            term,
            risk_profile,
        }
    }

    /// Plan the first funnel step starts from
    pub fn funnel_default(limits: &FunnelLimits) -> Self {
        Self::new(limits.default_amount, limits.default_term, RiskProfile::default())
    }

    pub fn with_amount(&self, amount: f64) -> Self {
        Self { amount, ..self.clone() }
    }

    pub fn with_term(&self, term: u32) -> Self {
        Self { term, ..self.clone() }
    }

    pub fn with_risk_profile(&self, risk_profile: RiskProfile) -> Self {
        Self {
            risk_profile,
            ..self.clone()
        }
    }

    /// Caller-side validation against the funnel limits.
    /// The engine only requires a positive amount; the minimum is a UI rule.
    pub fn validate(&self, limits: &FunnelLimits) -> CoreResult<()> {
        if !self.amount.is_finite() || self.amount < limits.min_amount {
            return Err(ProjectionError::invalid_input(
                "amount",
                format!("must be at least {}", limits.min_amount),
            ));
        }
        if self.term < limits.min_term || self.term > limits.max_term {
            return Err(ProjectionError::invalid_input(
                "term",
                format!("must be between {} and {} years", limits.min_term, limits.max_term),
            ));
        }
        Ok(())
    }
}

/// Answers collected by the short survey shown while the portfolio is "built"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub age: String,
    pub experience: String,
    pub activities: Vec<String>,
}

impl SurveyAnswers {
    /// Build answers, requiring every question to be answered
    pub fn new(
        age: Option<&str>,
        experience: Option<&str>,
        activities: &[&str],
    ) -> CoreResult<Self> {
        let age = age.filter(|a| !a.is_empty()).ok_or_else(|| {
            ProjectionError::invalid_input("age", "please answer every question")
        })?;
        let experience = experience.filter(|e| !e.is_empty()).ok_or_else(|| {
            ProjectionError::invalid_input("experience", "please answer every question")
        })?;
        if activities.is_empty() {
            return Err(ProjectionError::invalid_input(
                "activities",
                "select at least one activity",
            ));
        }

        Ok(Self {
            age: age.to_string(),
            experience: experience.to_string(),
            activities: activities.iter().map(|a| a.to_string()).collect(),
        })
    }
}
