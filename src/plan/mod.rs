//! Plan data structures and loading

mod data;
pub mod loader;

pub use data::{FunnelLimits, InvestmentPlan, RiskProfile, SurveyAnswers};
pub use loader::{load_plans, load_plans_from_reader, plan_from_json, plan_to_json};
