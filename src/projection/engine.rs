//! Core projection engine: compound growth per risk curve and allocation lookup

use crate::assumptions::{AllocationTemplate, Assumptions, RiskCurve};
use crate::error::{CoreResult, ProjectionError};
use crate::plan::{InvestmentPlan, RiskProfile};
use super::history::{back_project, HistoryAndForecast, HistoryConfig};
use super::series::{ProjectionPoint, ProjectionSeries};

/// Headroom above the most optimistic path when scaling the funnel chart
const CHART_HEADROOM: f64 = 1.1;

/// Main projection engine
///
/// Stateless apart from its calibration tables: every call is independent and
/// the engine can be shared across threads freely.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    /// Engine using the canonical tables
    pub fn reference() -> Self {
        Self::new(Assumptions::reference())
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Curve for a profile
    pub fn curve(&self, risk_profile: RiskProfile) -> RiskCurve {
        self.assumptions.curves.get(risk_profile)
    }

    /// Project `amount` over years 0..=term for the min/avg/max curves.
    ///
    /// Each value is `amount * multiplier^year`, so year 0 is always `amount`.
    /// Fails with `InvalidInput` when `amount` is not a positive finite number or
    /// `term` is negative. The UI minimum amount is not enforced here.
    pub fn project(&self, amount: f64, term: i64, risk_profile: RiskProfile) -> CoreResult<ProjectionSeries> {
        validate_amount(amount)?;
        let term = validate_term(term)?;
        let curve = self.curve(risk_profile);

        // The best case grows fastest, so a finite last max bounds the whole series
        if !grow(amount, &curve, term).max.is_finite() {
            return Err(ProjectionError::invalid_input(
                "term",
                format!("{} over {} years exceeds the representable range", amount, term),
            ));
        }

        log::debug!(
            "Projecting {} over {} years ({})",
            amount,
            term,
            risk_profile
        );

        let mut series = ProjectionSeries::new(amount, risk_profile);
        series.points.reserve(term as usize + 1);

        for year in 0..=term {
            series.add_point(grow(amount, &curve, year));
        }

        Ok(series)
    }

    /// Project a profile given by its wire code; unknown codes are `InvalidInput`
    pub fn project_named(&self, amount: f64, term: i64, risk_profile: &str) -> CoreResult<ProjectionSeries> {
        self.project(amount, term, risk_profile.parse()?)
    }

    /// Project a stored plan
    pub fn project_plan(&self, plan: &InvestmentPlan) -> CoreResult<ProjectionSeries> {
        self.project(plan.amount, plan.term as i64, plan.risk_profile)
    }

    /// Allocation template for a profile
    pub fn allocation_for(&self, risk_profile: RiskProfile) -> AllocationTemplate {
        self.assumptions.allocations.get(risk_profile).clone()
    }

    /// Allocation template for a profile given by its wire code
    pub fn allocation_for_name(&self, risk_profile: &str) -> CoreResult<AllocationTemplate> {
        Ok(self.allocation_for(risk_profile.parse()?))
    }

    /// Synthetic history followed by the forecast for `plan`.
    ///
    /// The forecast half is exactly `project_plan(plan)`; only the history half
    /// may carry (seedable) noise.
    pub fn project_historical_and_forecast(
        &self,
        plan: &InvestmentPlan,
        history: &HistoryConfig,
    ) -> CoreResult<HistoryAndForecast> {
        let forecast = self.project_plan(plan)?;
        let avg = self.curve(plan.risk_profile).avg;

        Ok(HistoryAndForecast {
            history: back_project(plan.amount, avg, history)?,
            forecast,
        })
    }

    /// Y-axis ceiling for the funnel chart: the steepest max path at `term`
    /// plus 10% headroom, rounded up, so the scale does not jump between profiles.
    pub fn y_axis_ceiling(&self, amount: f64, term: u32) -> CoreResult<f64> {
        validate_amount(amount)?;
        let exp = validate_term(term as i64)? as i32;
        let top = self.assumptions.curves.highest_max();
        let ceiling = (amount * top.powi(exp) * CHART_HEADROOM).ceil();
        if !ceiling.is_finite() {
            return Err(ProjectionError::invalid_input(
                "term",
                format!("{} over {} years exceeds the representable range", amount, term),
            ));
        }
        Ok(ceiling)
    }
}

fn grow(amount: f64, curve: &RiskCurve, year: u32) -> ProjectionPoint {
    let exp = year as i32;
    ProjectionPoint {
        year,
        min: amount * curve.min.powi(exp),
        avg: amount * curve.avg.powi(exp),
        max: amount * curve.max.powi(exp),
    }
}

fn validate_amount(amount: f64) -> CoreResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ProjectionError::invalid_input(
            "amount",
            format!("must be a positive number, got {}", amount),
        ));
    }
    Ok(())
}

fn validate_term(term: i64) -> CoreResult<u32> {
    if term < 0 {
        return Err(ProjectionError::invalid_input(
            "term",
            format!("must not be negative, got {}", term),
        ));
    }
    // powi takes an i32 exponent
    i32::try_from(term)
        .map(|t| t as u32)
        .map_err(|_| ProjectionError::invalid_input("term", format!("{} years is out of range", term)))
}
