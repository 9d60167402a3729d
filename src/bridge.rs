//! Payloads exchanged with the host messaging platform

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::plan::{InvestmentPlan, RiskProfile, SurveyAnswers};
use crate::portfolio::{AllocationInstance, Holding};

/// Final payload the app hands back to the host
///
/// `risk_profile` stays a raw string so a payload from an older client with an
/// unknown profile can still be acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMessage {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub term: Option<u32>,
    #[serde(default)]
    pub risk_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<Holding>>,
}

impl HostMessage {
    pub fn from_plan(plan: &InvestmentPlan, allocation: Option<&AllocationInstance>) -> Self {
        Self {
            amount: plan.amount,
            term: Some(plan.term),
            risk_profile: Some(plan.risk_profile.as_str().to_string()),
            assets: allocation.map(|a| a.holdings.clone()),
        }
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Strategy name for the acknowledgement; unknown profiles are shown as such
    pub fn strategy_name(&self) -> &'static str {
        self.risk_profile
            .as_deref()
            .and_then(|p| p.parse::<RiskProfile>().ok())
            .map(|p| p.display_name())
            .unwrap_or("Not specified")
    }
}

/// Group thousands with spaces: 1234567.0 -> "1 234 567"
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let whole = rounded.abs().trunc() as u64;
    let cents = ((rounded.abs() - rounded.abs().trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if cents == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{:02}", sign, grouped, cents)
    }
}

/// Acknowledgement the host bot sends after receiving the payload
pub fn confirmation_text(message: &HostMessage) -> String {
    let term = message
        .term
        .map(|t| t.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "*Your demo portfolio is ready!*\n\n\
         Amount: *{} ₽*\n\
         Term: *{} years*\n\
         Strategy: *{}*",
        format_amount(message.amount),
        term,
        message.strategy_name()
    )
}

/// Conversion event recorded when the user asks to turn the demo into a real portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionEvent {
    pub hedge_risk_selected: bool,
    pub amount: f64,
    pub term: u32,
    pub risk_profile: RiskProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey: Option<SurveyAnswers>,
}

impl ConversionEvent {
    pub fn new(plan: &InvestmentPlan, hedge_risk_selected: bool, survey: Option<SurveyAnswers>) -> Self {
        Self {
            hedge_risk_selected,
            amount: plan.amount,
            term: plan.term,
            risk_profile: plan.risk_profile,
            survey,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{AllocationTable, InstrumentCatalog};

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(50_000.0), "50 000");
        assert_eq!(format_amount(1_234_567.0), "1 234 567");
        assert_eq!(format_amount(1_000.5), "1 000.50");
        assert_eq!(format_amount(-2_500.0), "-2 500");
    }

    #[test]
    fn test_confirmation_text() {
        let plan = InvestmentPlan::new(150_000.0, 7, RiskProfile::Aggressive);
        let message = HostMessage::from_plan(&plan, None);
        let text = confirmation_text(&message);

        assert!(text.contains("Amount: *150 000 ₽*"));
        assert!(text.contains("Term: *7 years*"));
        assert!(text.contains("Strategy: *Aggressive*"));
    }

    #[test]
    fn test_unknown_payload_fields() {
        let message = HostMessage::from_json(r#"{"amount":20000,"riskProfile":"turbo"}"#).unwrap();
        assert_eq!(message.strategy_name(), "Not specified");
        let text = confirmation_text(&message);
        assert!(text.contains("Term: *N/A years*"));
        assert!(text.contains("Amount: *20 000 ₽*"));
    }

    #[test]
    fn test_payload_with_assets() {
        let plan = InvestmentPlan::new(50_000.0, 5, RiskProfile::Moderate);
        let instance = AllocationInstance::from_template(
            AllocationTable::reference().get(RiskProfile::Moderate),
            &InstrumentCatalog::reference(),
            None,
        );
        let json = HostMessage::from_plan(&plan, Some(&instance)).to_json().unwrap();
        assert!(json.contains(r#""riskProfile":"moderate""#));
        assert!(json.contains(r#""category":"StocksRF""#));

        let back = HostMessage::from_json(&json).unwrap();
        assert_eq!(back.assets.unwrap().len(), 4);

        let bare = HostMessage::from_plan(&plan, None).to_json().unwrap();
        assert!(!bare.contains("assets"));
    }

    #[test]
    fn test_conversion_event() {
        let plan = InvestmentPlan::new(50_000.0, 5, RiskProfile::Moderate);
        let survey = SurveyAnswers::new(Some("18-24"), Some("beginner"), &["deposits"]).unwrap();
        let event = ConversionEvent::new(&plan, true, Some(survey));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["hedgeRiskSelected"], true);
        assert_eq!(json["riskProfile"], "moderate");
        assert_eq!(json["survey"]["age"], "18-24");
    }
}
