//! Portfolio projection - growth forecasts and risk-profile allocations for the portfolio Mini App
//!
//! This library provides:
//! - Deterministic min/avg/max projections per risk profile
//! - Allocation templates and instrument selection per profile
//! - Synthetic history back-projection and chart frames
//! - Funnel and editor session state, host payloads and batch runs

pub mod assumptions;
pub mod bridge;
pub mod collaborators;
pub mod error;
pub mod plan;
pub mod portfolio;
pub mod projection;
pub mod scenario;
pub mod session;

// Re-export commonly used types
pub use assumptions::{AllocationTemplate, AssetCategory, Assumptions, RiskCurve};
pub use error::{CoreResult, ProjectionError};
pub use plan::{InvestmentPlan, RiskProfile};
pub use projection::{ProjectionEngine, ProjectionPoint, ProjectionSeries};
pub use scenario::ScenarioRunner;
