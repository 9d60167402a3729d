//! Scenario runner for batch projections
//!
//! Loads assumptions once, then runs many plans or profile comparisons against
//! the same engine without re-reading CSV files.

use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;

use crate::assumptions::Assumptions;
use crate::error::CoreResult;
use crate::plan::{InvestmentPlan, RiskProfile};
use crate::projection::{ProjectionEngine, ProjectionSeries};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv_path(Path::new("data/assumptions"))?;
/// let by_profile = runner.compare_profiles(50_000.0, 5)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

/// Totals across a batch, per forecast year
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedYear {
    pub year: u32,
    /// Plans whose term reaches this year
    pub plans: usize,
    pub total_min: f64,
    pub total_avg: f64,
    pub total_max: f64,
}

impl ScenarioRunner {
    /// Runner using the canonical tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner loading assumptions from a specific directory
    pub fn from_csv_path(path: &Path) -> CoreResult<Self> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            engine: ProjectionEngine::new(assumptions),
        }
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    /// Project a single plan
    pub fn run(&self, plan: &InvestmentPlan) -> CoreResult<ProjectionSeries> {
        self.engine.project_plan(plan)
    }

    /// Project plans in parallel. Results keep input order; a bad plan only fails its own slot.
    pub fn run_batch(&self, plans: &[InvestmentPlan]) -> Vec<CoreResult<ProjectionSeries>> {
        log::info!("Running batch of {} plans", plans.len());
        plans.par_iter().map(|plan| self.run(plan)).collect()
    }

    /// Same amount and term under every profile, in slider order
    pub fn compare_profiles(&self, amount: f64, term: i64) -> CoreResult<Vec<ProjectionSeries>> {
        RiskProfile::ALL[..]
            .par_iter()
            .map(|&profile| self.engine.project(amount, term, profile))
            .collect()
    }

    /// Sum successful projections year by year
    pub fn aggregate(results: &[CoreResult<ProjectionSeries>]) -> Vec<AggregatedYear> {
        let horizon = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|s| s.term())
            .max();

        let Some(horizon) = horizon else {
            return Vec::new();
        };

        let mut years: Vec<AggregatedYear> = (0..=horizon)
            .map(|year| AggregatedYear { year, ..Default::default() })
            .collect();

        for series in results.iter().filter_map(|r| r.as_ref().ok()) {
            for point in series {
                let agg = &mut years[point.year as usize];
                agg.plans += 1;
                agg.total_min += point.min;
                agg.total_avg += point.avg;
                agg.total_max += point.max;
            }
        }
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_keeps_order_and_isolates_errors() {
        let runner = ScenarioRunner::new();
        let plans = vec![
            InvestmentPlan::new(10_000.0, 3, RiskProfile::Conservative),
            InvestmentPlan::new(0.0, 3, RiskProfile::Moderate),
            InvestmentPlan::new(20_000.0, 5, RiskProfile::Aggressive),
        ];

        let results = runner.run_batch(&plans);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().amount, 10_000.0);
        assert!(results[1].as_ref().unwrap_err().is_invalid_input());
        assert_eq!(results[2].as_ref().unwrap().risk_profile, RiskProfile::Aggressive);
        assert_eq!(results[2].as_ref().unwrap(), &runner.run(&plans[2]).unwrap());
    }

    #[test]
    fn test_compare_profiles() {
        let runner = ScenarioRunner::new();
        let series = runner.compare_profiles(50_000.0, 5).unwrap();
        let profiles: Vec<_> = series.iter().map(|s| s.risk_profile).collect();
        assert_eq!(profiles, RiskProfile::ALL.to_vec());

        // Riskier profiles have a higher best case
        assert!(series[0][5].max < series[1][5].max);
        assert!(series[1][5].max < series[2][5].max);

        assert!(runner.compare_profiles(50_000.0, -2).is_err());
    }

    #[test]
    fn test_aggregate() {
        let runner = ScenarioRunner::new();
        let plans = vec![
            InvestmentPlan::new(1_000.0, 1, RiskProfile::Moderate),
            InvestmentPlan::new(2_000.0, 3, RiskProfile::Moderate),
        ];
        let totals = ScenarioRunner::aggregate(&runner.run_batch(&plans));

        assert_eq!(totals.len(), 4);
        assert_eq!(totals[0].plans, 2);
        assert_eq!(totals[0].total_avg, 3_000.0);
        assert_eq!(totals[3].plans, 1);
        assert!(ScenarioRunner::aggregate(&[]).is_empty());
    }
}
