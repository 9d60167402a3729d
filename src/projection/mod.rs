//! Projection engine, output series and chart frames

mod chart;
mod engine;
mod history;
mod series;

pub use chart::{ChartDataset, ChartFrame, ChartMode};
pub use engine::ProjectionEngine;
pub use history::{
    back_project, back_project_with_rng, HistoryAndForecast, HistoryConfig, HistoryPoint, Jitter,
    DEFAULT_JITTER_AMPLITUDE, MAX_HISTORY_YEARS,
};
pub use series::{ProjectionPoint, ProjectionSeries, ProjectionSummary};
