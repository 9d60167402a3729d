//! Projection output structures

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::assumptions::Scenario;
use crate::plan::RiskProfile;

/// Projected portfolio value at one year for all three scenarios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: u32,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl ProjectionPoint {
    pub fn value(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Min => self.min,
            Scenario::Avg => self.avg,
            Scenario::Max => self.max,
        }
    }
}

/// Year-ordered projection, year 0 through `term` inclusive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSeries {
    /// Amount the series starts from
    pub amount: f64,

    /// Profile whose curve produced the series
    pub risk_profile: RiskProfile,

    /// One point per year, year 0 first
    pub points: Vec<ProjectionPoint>,
}

impl ProjectionSeries {
    pub fn new(amount: f64, risk_profile: RiskProfile) -> Self {
        Self {
            amount,
            risk_profile,
            points: Vec::new(),
        }
    }

    pub fn add_point(&mut self, point: ProjectionPoint) {
        debug_assert!(self
            .points
            .last()
            .map_or(point.year == 0, |last| point.year == last.year + 1));
        self.points.push(point);
    }

    /// Last projected year
    pub fn term(&self) -> u32 {
        self.points.last().map(|p| p.year).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectionPoint> {
        self.points.iter()
    }

    pub fn point(&self, year: u32) -> Option<&ProjectionPoint> {
        self.points.get(year as usize)
    }

    /// Values of one scenario in year order
    pub fn values(&self, scenario: Scenario) -> Vec<f64> {
        self.points.iter().map(|p| p.value(scenario)).collect()
    }

    /// Final values and profit per scenario
    pub fn summary(&self) -> ProjectionSummary {
        let last = self.points.last().copied().unwrap_or(ProjectionPoint {
            year: 0,
            min: self.amount,
            avg: self.amount,
            max: self.amount,
        });

        ProjectionSummary {
            term: last.year,
            amount: self.amount,
            final_min: last.min,
            final_avg: last.avg,
            final_max: last.max,
            min_profit: last.min - self.amount,
            avg_profit: last.avg - self.amount,
            max_profit: last.max - self.amount,
        }
    }
}

impl Index<usize> for ProjectionSeries {
    type Output = ProjectionPoint;

    fn index(&self, year: usize) -> &ProjectionPoint {
        &self.points[year]
    }
}

impl<'a> IntoIterator for &'a ProjectionSeries {
    type Item = &'a ProjectionPoint;
    type IntoIter = std::slice::Iter<'a, ProjectionPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Summary shown on the confirmation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub term: u32,
    pub amount: f64,
    pub final_min: f64,
    pub final_avg: f64,
    pub final_max: f64,
    pub min_profit: f64,
    pub avg_profit: f64,
    pub max_profit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: u32, min: f64, avg: f64, max: f64) -> ProjectionPoint {
        ProjectionPoint { year, min, avg, max }
    }

    #[test]
    fn test_summary_profits() {
        let mut series = ProjectionSeries::new(1000.0, RiskProfile::Moderate);
        series.add_point(point(0, 1000.0, 1000.0, 1000.0));
        series.add_point(point(1, 1070.0, 1150.0, 1220.0));

        let summary = series.summary();
        assert_eq!(summary.term, 1);
        assert_eq!(summary.final_avg, 1150.0);
        assert!((summary.min_profit - 70.0).abs() < 1e-9);
        assert!((summary.max_profit - 220.0).abs() < 1e-9);
        assert_eq!(series[1].value(Scenario::Max), 1220.0);
        assert_eq!(series.values(Scenario::Min), vec![1000.0, 1070.0]);
    }

    #[test]
    fn test_empty_series_summary() {
        let series = ProjectionSeries::new(500.0, RiskProfile::Aggressive);
        let summary = series.summary();
        assert_eq!(summary.final_max, 500.0);
        assert_eq!(summary.avg_profit, 0.0);
        assert!(series.point(0).is_none());
    }
}
