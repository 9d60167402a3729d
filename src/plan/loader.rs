//! Load plans from batch CSV files and stored JSON records

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{InvestmentPlan, RiskProfile};
use crate::error::{CoreResult, ProjectionError};

/// Raw CSV row: `amount,term,riskProfile`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "amount")]
    amount: f64,
    #[serde(rename = "term")]
    term: i64,
    #[serde(rename = "riskProfile")]
    risk_profile: String,
}

impl CsvRow {
    fn to_plan(self, line: usize) -> CoreResult<InvestmentPlan> {
        if self.term < 0 || self.term > u32::MAX as i64 {
            return Err(ProjectionError::invalid_input(
                "term",
                format!("row {}: term {} out of range", line, self.term),
            ));
        }
        let risk_profile: RiskProfile = self.risk_profile.parse().map_err(|_| {
            ProjectionError::invalid_input(
                "riskProfile",
                format!("row {}: unknown risk profile {:?}", line, self.risk_profile),
            )
        })?;

        Ok(InvestmentPlan::new(self.amount, self.term as u32, risk_profile))
    }
}

/// Load all plans from a CSV file
pub fn load_plans<P: AsRef<Path>>(path: P) -> CoreResult<Vec<InvestmentPlan>> {
    let path = path.as_ref();
    log::info!("Loading plans from {}", path.display());
    let reader = Reader::from_path(path)?;
    collect_plans(reader)
}

/// Load plans from any reader (e.g., string buffer, request body)
pub fn load_plans_from_reader<R: Read>(reader: R) -> CoreResult<Vec<InvestmentPlan>> {
    collect_plans(Reader::from_reader(reader))
}

fn collect_plans<R: Read>(mut reader: Reader<R>) -> CoreResult<Vec<InvestmentPlan>> {
    let mut plans = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Header is line 1
        plans.push(row.to_plan(idx + 2)?);
    }

    Ok(plans)
}

/// Decode a plan stored by the persistence collaborator
pub fn plan_from_json(raw: &str) -> CoreResult<InvestmentPlan> {
    Ok(serde_json::from_str(raw)?)
}

/// Encode a plan for the persistence collaborator
pub fn plan_to_json(plan: &InvestmentPlan) -> CoreResult<String> {
    Ok(serde_json::to_string(plan)?)
}
