//! Plain chart frames for the rendering surface
//!
//! A frame is labels plus named datasets of equal length. Gaps are `None`, so a
//! history line and forecast lines can share one x axis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{HistoryAndForecast, HistoryConfig, Jitter, ProjectionEngine, ProjectionSeries};
use crate::assumptions::Scenario;
use crate::error::{CoreResult, ProjectionError};
use crate::plan::InvestmentPlan;

/// Chart view selected on the portfolio page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartMode {
    /// Forecast only, years 0..=term
    Future,
    /// `years` of synthetic history, then the forecast
    History { years: u32 },
}

impl ChartMode {
    pub fn one_year() -> Self {
        ChartMode::History { years: 1 }
    }

    pub fn five_years() -> Self {
        ChartMode::History { years: 5 }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartMode::Future => f.write_str("future"),
            ChartMode::History { years } => write!(f, "{}y", years),
        }
    }
}

impl FromStr for ChartMode {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "future" {
            return Ok(ChartMode::Future);
        }
        s.strip_suffix('y')
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|&years| years > 0)
            .map(|years| ChartMode::History { years })
            .ok_or_else(|| ProjectionError::invalid_input("mode", format!("unknown chart mode {:?}", s)))
    }
}

/// One line on the chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    /// Scenario the line follows; `None` for history and flat previews
    pub scenario: Option<Scenario>,
    /// Forecast lines next to history are drawn dashed
    pub dashed: bool,
    pub data: Vec<Option<f64>>,
}

/// Everything the rendering surface needs for one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub x_title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    /// Fixed y-axis maximum, if the caller wants a stable scale
    pub y_max: Option<f64>,
}

fn scenario_label(scenario: Scenario) -> &'static str {
    match scenario {
        Scenario::Max => "Max return",
        Scenario::Avg => "Avg return",
        Scenario::Min => "Min return",
    }
}

/// Lines are listed best case first
const LINE_ORDER: [Scenario; 3] = [Scenario::Max, Scenario::Avg, Scenario::Min];

impl ChartFrame {
    /// Forecast-only frame
    pub fn forecast(series: &ProjectionSeries) -> Self {
        let labels = series.iter().map(|p| p.year.to_string()).collect();
        let datasets = LINE_ORDER
            .iter()
            .map(|&scenario| ChartDataset {
                label: scenario_label(scenario).to_string(),
                scenario: Some(scenario),
                dashed: false,
                data: series.iter().map(|p| Some(p.value(scenario))).collect(),
            })
            .collect();

        Self {
            x_title: "Years (forecast)".to_string(),
            labels,
            datasets,
            y_max: None,
        }
    }

    /// History followed by forecast on one axis.
    ///
    /// Labels are `-N`..`-1`, `now`, then forecast years `1..=term`. History fills
    /// the left part; forecast lines start at `now`.
    pub fn history_and_forecast(data: &HistoryAndForecast) -> Self {
        let history_years = data.history_years() as usize;
        let term = data.forecast.term() as usize;

        let mut labels: Vec<String> = data
            .history
            .iter()
            .map(|p| if p.offset == 0 { "now".to_string() } else { format!("{}y", p.offset) })
            .collect();
        labels.extend((1..=term).map(|y| y.to_string()));

        let mut history_line: Vec<Option<f64>> = data.history.iter().map(|p| Some(p.value)).collect();
        history_line.extend(std::iter::repeat(None).take(term));

        let mut datasets = vec![ChartDataset {
            label: "Historical".to_string(),
            scenario: None,
            dashed: false,
            data: history_line,
        }];

        for scenario in LINE_ORDER {
            let mut line: Vec<Option<f64>> = vec![None; history_years];
            line.extend(data.forecast.iter().map(|p| Some(p.value(scenario))));
            datasets.push(ChartDataset {
                label: format!("{} forecast", scenario_label(scenario)),
                scenario: Some(scenario),
                dashed: true,
                data: line,
            });
        }

        let unit = if history_years == 1 { "year" } else { "years" };
        Self {
            x_title: format!(
                "History for {} {} and forecast for {} years",
                history_years, unit, term
            ),
            labels,
            datasets,
            y_max: None,
        }
    }

    /// Flat line at `amount` shown before a profile is chosen
    pub fn flat_preview(amount: f64, years: u32) -> Self {
        Self {
            x_title: "Years".to_string(),
            labels: (0..=years).map(|y| y.to_string()).collect(),
            datasets: vec![ChartDataset {
                label: "Amount".to_string(),
                scenario: None,
                dashed: false,
                data: vec![Some(amount); years as usize + 1],
            }],
            y_max: None,
        }
    }

    /// Build the frame for a plan in the given mode.
    /// `jitter` only applies to history modes.
    pub fn for_mode(
        engine: &ProjectionEngine,
        plan: &InvestmentPlan,
        mode: ChartMode,
        jitter: Option<Jitter>,
    ) -> CoreResult<Self> {
        match mode {
            ChartMode::Future => Ok(Self::forecast(&engine.project_plan(plan)?)),
            ChartMode::History { years } => {
                let config = HistoryConfig { years, jitter };
                let data = engine.project_historical_and_forecast(plan, &config)?;
                Ok(Self::history_and_forecast(&data))
            }
        }
    }

    pub fn with_y_max(mut self, y_max: f64) -> Self {
        self.y_max = Some(y_max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::RiskProfile;

    #[test]
    fn test_chart_mode_parsing() {
        assert_eq!("future".parse::<ChartMode>().unwrap(), ChartMode::Future);
        assert_eq!("1y".parse::<ChartMode>().unwrap(), ChartMode::one_year());
        assert_eq!("5y".parse::<ChartMode>().unwrap(), ChartMode::five_years());
        assert!("0y".parse::<ChartMode>().is_err());
        assert!("past".parse::<ChartMode>().is_err());
        assert_eq!(ChartMode::five_years().to_string(), "5y");
    }

    #[test]
    fn test_forecast_frame() {
        let engine = ProjectionEngine::reference();
        let plan = InvestmentPlan::new(10_000.0, 3, RiskProfile::Conservative);
        let frame = ChartFrame::for_mode(&engine, &plan, ChartMode::Future, None).unwrap();

        assert_eq!(frame.labels, vec!["0", "1", "2", "3"]);
        assert_eq!(frame.datasets.len(), 3);
        assert_eq!(frame.datasets[0].scenario, Some(Scenario::Max));
        assert_eq!(frame.datasets[2].scenario, Some(Scenario::Min));
        assert_eq!(frame.datasets[1].data[0], Some(10_000.0));
    }

    #[test]
    fn test_history_frame_alignment() {
        let engine = ProjectionEngine::reference();
        let plan = InvestmentPlan::new(10_000.0, 3, RiskProfile::Moderate);
        let frame = ChartFrame::for_mode(&engine, &plan, ChartMode::History { years: 2 }, None).unwrap();

        assert_eq!(frame.labels, vec!["-2y", "-1y", "now", "1", "2", "3"]);
        for dataset in &frame.datasets {
            assert_eq!(dataset.data.len(), frame.labels.len());
        }

        let history = &frame.datasets[0];
        assert_eq!(history.data[2], Some(10_000.0));
        assert_eq!(history.data[3], None);

        // Forecast lines start at "now" with the current amount
        for dataset in &frame.datasets[1..] {
            assert!(dataset.dashed);
            assert_eq!(dataset.data[1], None);
            assert_eq!(dataset.data[2], Some(10_000.0));
            assert!(dataset.data[5].is_some());
        }
        assert_eq!(frame.x_title, "History for 2 years and forecast for 3 years");
    }

    #[test]
    fn test_flat_preview() {
        let frame = ChartFrame::flat_preview(50_000.0, 10).with_y_max(60_000.0);
        assert_eq!(frame.labels.len(), 11);
        assert!(frame.datasets[0].data.iter().all(|v| *v == Some(50_000.0)));
        assert_eq!(frame.y_max, Some(60_000.0));
    }
}
