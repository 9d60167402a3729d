//! AWS Lambda handler serving projections over a Function URL
//!
//! Accepts `{"amount", "term", "riskProfile", "historyYears"?, "seed"?}` and
//! returns the forecast series, its summary, the allocation template and,
//! when asked for, a synthetic history with the matching chart frame.

use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use portfolio_projection::{
    assumptions::AllocationTemplate,
    plan::{InvestmentPlan, RiskProfile},
    projection::{
        ChartFrame, HistoryConfig, HistoryPoint, Jitter, ProjectionEngine, ProjectionSeries,
        ProjectionSummary, DEFAULT_JITTER_AMPLITUDE, MAX_HISTORY_YEARS,
    },
    ProjectionError,
};

/// Longest forecast a single request may ask for
const MAX_REQUEST_TERM: i64 = 100;

/// Input for one projection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub amount: f64,
    pub term: i64,
    pub risk_profile: String,

    /// Years of synthetic history to prepend (omitted: forecast only)
    #[serde(default)]
    pub history_years: Option<u32>,

    /// Seed for the history jitter; without it the noise is not reproducible
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Output of one projection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub series: ProjectionSeries,
    pub summary: ProjectionSummary,
    pub allocation: AllocationTemplate,
    pub y_axis_max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartFrame>,
    pub execution_time_us: u64,
}

fn project(engine: &ProjectionEngine, request: &ProjectionRequest) -> Result<ProjectionResponse, ProjectionError> {
    let start = std::time::Instant::now();
    validate_request(request)?;
    let risk_profile: RiskProfile = request.risk_profile.parse()?;
    let series = engine.project(request.amount, request.term, risk_profile)?;
    let y_axis_max = engine.y_axis_ceiling(request.amount, series.term())?;

    let (history, chart) = match request.history_years {
        Some(years) => {
            let plan = InvestmentPlan::new(request.amount, series.term(), risk_profile);
            let jitter = Jitter {
                amplitude: DEFAULT_JITTER_AMPLITUDE,
                seed: request.seed,
            };
            let data = engine.project_historical_and_forecast(&plan, &HistoryConfig::with_jitter(years, jitter))?;
            let chart = ChartFrame::history_and_forecast(&data);
            (Some(data.history), Some(chart))
        }
        None => (None, None),
    };

    Ok(ProjectionResponse {
        summary: series.summary(),
        allocation: engine.allocation_for(risk_profile),
        series,
        y_axis_max,
        history,
        chart,
        execution_time_us: start.elapsed().as_micros() as u64,
    })
}

/// Bound the work a single request can trigger
fn validate_request(request: &ProjectionRequest) -> Result<(), ProjectionError> {
    if request.term > MAX_REQUEST_TERM {
        return Err(ProjectionError::invalid_input(
            "term",
            format!("must be at most {} years, got {}", MAX_REQUEST_TERM, request.term),
        ));
    }
    if let Some(years) = request.history_years {
        if years > MAX_HISTORY_YEARS {
            return Err(ProjectionError::invalid_input(
                "historyYears",
                format!("must be at most {}, got {}", MAX_HISTORY_YEARS, years),
            ));
        }
    }
    Ok(())
}

/// Turn a request body into (status, JSON body)
fn handle_body(engine: &ProjectionEngine, body: &str) -> (u16, String) {
    let request: ProjectionRequest = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return (400, error_body(&format!("Invalid JSON: {}", e))),
    };

    match project(engine, &request) {
        Ok(response) => match serde_json::to_string(&response) {
            Ok(json) => (200, json),
            Err(e) => (500, error_body(&e.to_string())),
        },
        Err(e) if e.is_invalid_input() => (400, error_body(&e.to_string())),
        Err(e) => {
            log::error!("Projection failed: {}", e);
            (500, error_body(&e.to_string()))
        }
    }
}

fn error_body(message: &str) -> String {
    json!({ "error": message }).to_string()
}

fn url_response(status: u16, body: Option<String>) -> Value {
    json!({
        "statusCode": status,
        "headers": {
            "Content-Type": "application/json",
            "Access-Control-Allow-Origin": "*",
            "Access-Control-Allow-Methods": "POST, OPTIONS",
            "Access-Control-Allow-Headers": "Content-Type",
        },
        "body": body,
        "isBase64Encoded": false,
    })
}

/// Lambda handler function
async fn handler(engine: &ProjectionEngine, event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<Value, Error> {
    let request = event.payload;

    // CORS preflight
    if request.request_context.http.method.as_deref() == Some("OPTIONS") {
        return Ok(url_response(200, None));
    }

    let body = request.body.unwrap_or_else(|| "{}".to_string());
    let (status, body) = handle_body(engine, &body);
    log::info!("Responded {} ({} bytes)", status, body.len());
    Ok(url_response(status, Some(body)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let engine = ProjectionEngine::reference();
    let engine = &engine;
    run(service_fn(move |event| handler(engine, event))).await
}
