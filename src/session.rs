//! Caller-owned session state for the selection funnel and the portfolio editor
//!
//! These replace the page-level globals of the browser app. The engine is only
//! borrowed per call, so it stays stateless and shareable.

use serde::{Deserialize, Serialize};

use crate::bridge::{ConversionEvent, HostMessage};
use crate::collaborators::{HostBridge, PlanStore, PLAN_KEY, SURVEY_KEY};
use crate::error::{CoreResult, ProjectionError};
use crate::plan::{FunnelLimits, InvestmentPlan, RiskProfile, SurveyAnswers};
use crate::portfolio::{AllocationInstance, Holding};
use crate::projection::{ChartFrame, ProjectionEngine, ProjectionSummary};

/// Record kept under [`PLAN_KEY`]: the plan plus the instruments chosen so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlan {
    pub amount: f64,
    pub term: u32,
    pub risk_profile: RiskProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<Holding>>,
}

impl StoredPlan {
    pub fn new(plan: &InvestmentPlan, allocation: Option<&AllocationInstance>) -> Self {
        Self {
            amount: plan.amount,
            term: plan.term,
            risk_profile: plan.risk_profile,
            assets: allocation.map(|a| a.holdings.clone()),
        }
    }

    pub fn plan(&self) -> InvestmentPlan {
        InvestmentPlan::new(self.amount, self.term, self.risk_profile)
    }

    pub fn allocation(&self) -> Option<AllocationInstance> {
        self.assets.clone().map(|holdings| AllocationInstance { holdings })
    }

    /// Read the stored record; a missing one is `NotFound`
    pub fn load(store: &dyn PlanStore) -> CoreResult<Self> {
        Ok(serde_json::from_str(&store.require(PLAN_KEY)?)?)
    }

    pub fn save(&self, store: &mut dyn PlanStore) -> CoreResult<()> {
        store.put(PLAN_KEY, serde_json::to_string(self)?);
        Ok(())
    }
}

/// Persist survey answers until the conversion event picks them up
pub fn submit_survey(store: &mut dyn PlanStore, answers: &SurveyAnswers) -> CoreResult<()> {
    store.put(SURVEY_KEY, serde_json::to_string(answers)?);
    log::debug!("Survey stored ({} activities)", answers.activities.len());
    Ok(())
}

/// Start over: forget the plan and any survey answers
pub fn restart(store: &mut dyn PlanStore) {
    store.remove(PLAN_KEY);
    store.remove(SURVEY_KEY);
    log::info!("Session restarted");
}

/// Step of the three-step selection funnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunnelStep {
    Amount = 1,
    Term = 2,
    Risk = 3,
}

impl FunnelStep {
    fn previous(self) -> Option<Self> {
        match self {
            FunnelStep::Amount => None,
            FunnelStep::Term => Some(FunnelStep::Amount),
            FunnelStep::Risk => Some(FunnelStep::Term),
        }
    }
}

/// Amount -> term -> risk profile
#[derive(Debug, Clone)]
pub struct FunnelSession {
    limits: FunnelLimits,
    step: FunnelStep,
    draft: InvestmentPlan,
}

impl FunnelSession {
    pub fn new(limits: FunnelLimits) -> Self {
        let draft = InvestmentPlan::funnel_default(&limits);
        Self {
            limits,
            step: FunnelStep::Amount,
            draft,
        }
    }

    pub fn step(&self) -> FunnelStep {
        self.step
    }

    pub fn draft(&self) -> &InvestmentPlan {
        &self.draft
    }

    /// Whether the back button is usable
    pub fn can_go_back(&self) -> bool {
        self.step.previous().is_some()
    }

    /// Parse the amount field and move to the term step
    pub fn confirm_amount(&mut self, raw: &str) -> CoreResult<()> {
        let min = self.limits.min_amount;
        let amount = raw
            .trim()
            .parse::<i64>()
            .ok()
            .map(|a| a as f64)
            .filter(|&a| a >= min)
            .ok_or_else(|| {
                ProjectionError::invalid_input("amount", format!("please enter at least {} ₽", min))
            })?;

        self.draft = self.draft.with_amount(amount);
        self.step = FunnelStep::Term;
        log::debug!("Funnel amount confirmed: {}", amount);
        Ok(())
    }

    /// Move the term slider
    pub fn set_term(&mut self, term: u32) -> CoreResult<()> {
        if term < self.limits.min_term || term > self.limits.max_term {
            return Err(ProjectionError::invalid_input(
                "term",
                format!(
                    "must be between {} and {} years",
                    self.limits.min_term, self.limits.max_term
                ),
            ));
        }
        self.draft = self.draft.with_term(term);
        Ok(())
    }

    pub fn confirm_term(&mut self) {
        self.step = FunnelStep::Risk;
    }

    /// "I don't know": use the default horizon and move on
    pub fn unknown_term(&mut self) {
        self.draft = self.draft.with_term(self.limits.default_term);
        self.step = FunnelStep::Risk;
    }

    pub fn select_risk(&mut self, risk_profile: RiskProfile) {
        self.draft = self.draft.with_risk_profile(risk_profile);
    }

    /// Go back one step; returns false on the first step
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    /// Chart for the current step: a flat line until the risk step, then the forecast.
    /// On the risk step the y-axis is pinned so switching profiles does not rescale.
    pub fn chart_frame(&self, engine: &ProjectionEngine) -> CoreResult<ChartFrame> {
        match self.step {
            FunnelStep::Amount => Ok(ChartFrame::flat_preview(self.draft.amount, self.limits.preview_years)),
            FunnelStep::Term => Ok(ChartFrame::flat_preview(self.draft.amount, self.draft.term)),
            FunnelStep::Risk => {
                let series = engine.project_plan(&self.draft)?;
                let ceiling = engine.y_axis_ceiling(self.draft.amount, self.draft.term)?;
                Ok(ChartFrame::forecast(&series).with_y_max(ceiling))
            }
        }
    }

    /// Finish the funnel and persist the plan for the next page
    pub fn finish(&self, store: &mut dyn PlanStore) -> CoreResult<InvestmentPlan> {
        if self.step != FunnelStep::Risk {
            return Err(ProjectionError::invalid_input(
                "step",
                "choose a risk profile before building the portfolio",
            ));
        }
        self.draft.validate(&self.limits)?;
        StoredPlan::new(&self.draft, None).save(store)?;
        log::info!(
            "Funnel finished: {} over {} years ({})",
            self.draft.amount,
            self.draft.term,
            self.draft.risk_profile
        );
        Ok(self.draft.clone())
    }
}

impl Default for FunnelSession {
    fn default() -> Self {
        Self::new(FunnelLimits::default())
    }
}

/// Editing an already built portfolio: risk slider, instrument swaps, reset, save
#[derive(Debug, Clone)]
pub struct EditSession {
    original: InvestmentPlan,
    current: InvestmentPlan,
    /// Instruments as last saved; `reset` and reloads keep these names
    saved: Option<AllocationInstance>,
    allocation: AllocationInstance,
    slider_touched: bool,
}

impl EditSession {
    /// Start editing the stored plan; a missing plan is `NotFound`
    pub fn load(store: &dyn PlanStore, engine: &ProjectionEngine) -> CoreResult<Self> {
        let stored = StoredPlan::load(store)?;
        Ok(Self::with_saved(stored.plan(), stored.allocation(), engine))
    }

    pub fn new(plan: InvestmentPlan, engine: &ProjectionEngine) -> Self {
        Self::with_saved(plan, None, engine)
    }

    fn with_saved(plan: InvestmentPlan, saved: Option<AllocationInstance>, engine: &ProjectionEngine) -> Self {
        let allocation = Self::bind(engine, plan.risk_profile, saved.as_ref());
        Self {
            original: plan.clone(),
            current: plan,
            saved,
            allocation,
            slider_touched: false,
        }
    }

    fn bind(
        engine: &ProjectionEngine,
        risk_profile: RiskProfile,
        previous: Option<&AllocationInstance>,
    ) -> AllocationInstance {
        let template = engine.allocation_for(risk_profile);
        AllocationInstance::from_template(&template, &engine.assumptions().instruments, previous)
    }

    pub fn plan(&self) -> &InvestmentPlan {
        &self.current
    }

    pub fn allocation(&self) -> &AllocationInstance {
        &self.allocation
    }

    /// Slider position matching the current profile
    pub fn slider_value(&self) -> u8 {
        self.current.risk_profile.to_slider_value()
    }

    /// Move the risk slider; holdings are regenerated keeping chosen instruments.
    /// Returns true the first time the slider is used.
    pub fn set_risk_slider(&mut self, value: u8, engine: &ProjectionEngine) -> bool {
        let first_use = !self.slider_touched;
        self.slider_touched = true;

        let profile = RiskProfile::from_slider_value(value);
        self.current = self.current.with_risk_profile(profile);
        self.allocation = Self::bind(engine, profile, Some(&self.allocation));
        first_use
    }

    pub fn replace_asset(&mut self, index: usize, name: &str, engine: &ProjectionEngine) -> CoreResult<()> {
        self.allocation.replace(index, name, &engine.assumptions().instruments)
    }

    /// Drop every edit and go back to the stored plan and instruments
    pub fn reset(&mut self, engine: &ProjectionEngine) {
        self.current = self.original.clone();
        self.allocation = Self::bind(engine, self.current.risk_profile, self.saved.as_ref());
    }

    /// Forecast chart for the plan being edited
    pub fn chart_frame(&self, engine: &ProjectionEngine) -> CoreResult<ChartFrame> {
        Ok(ChartFrame::forecast(&engine.project_plan(&self.current)?))
    }

    /// Persist the edited plan and hand the payload to the host
    pub fn save(&mut self, store: &mut dyn PlanStore, bridge: &mut dyn HostBridge) -> CoreResult<HostMessage> {
        StoredPlan::new(&self.current, Some(&self.allocation)).save(store)?;
        let message = HostMessage::from_plan(&self.current, Some(&self.allocation));
        bridge.send_data(&message.to_json()?)?;
        self.original = self.current.clone();
        self.saved = Some(self.allocation.clone());
        Ok(message)
    }
}

/// Confirmation page: final figures and the conversion request
#[derive(Debug, Clone)]
pub struct ConfirmSession {
    plan: InvestmentPlan,
}

impl ConfirmSession {
    pub fn load(store: &dyn PlanStore) -> CoreResult<Self> {
        Ok(Self {
            plan: StoredPlan::load(store)?.plan(),
        })
    }

    pub fn plan(&self) -> &InvestmentPlan {
        &self.plan
    }

    /// Final values and profit per scenario
    pub fn summary(&self, engine: &ProjectionEngine) -> CoreResult<ProjectionSummary> {
        Ok(engine.project_plan(&self.plan)?.summary())
    }

    /// Build the conversion event and consume the stored survey answers.
    /// Missing or unreadable answers leave the survey part empty.
    pub fn convert(&self, store: &mut dyn PlanStore, hedge_risk_selected: bool) -> ConversionEvent {
        let survey = store.get(SURVEY_KEY).and_then(|raw| {
            serde_json::from_str::<SurveyAnswers>(&raw)
                .map_err(|e| log::warn!("Ignoring unreadable survey record: {}", e))
                .ok()
        });
        store.remove(SURVEY_KEY);

        log::info!(
            "Conversion requested (hedge: {}, survey: {})",
            hedge_risk_selected,
            survey.is_some()
        );
        ConversionEvent::new(&self.plan, hedge_risk_selected, survey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::AssetCategory;
    use crate::collaborators::{MemoryStore, RecordingBridge};
    use crate::plan::loader;

    #[test]
    fn test_funnel_happy_path() {
        let engine = ProjectionEngine::reference();
        let mut store = MemoryStore::new();
        let mut funnel = FunnelSession::default();

        assert!(!funnel.can_go_back());
        funnel.confirm_amount("120000").unwrap();
        assert_eq!(funnel.step(), FunnelStep::Term);

        funnel.set_term(7).unwrap();
        funnel.confirm_term();
        funnel.select_risk(RiskProfile::Aggressive);

        let plan = funnel.finish(&mut store).unwrap();
        assert_eq!(plan, InvestmentPlan::new(120_000.0, 7, RiskProfile::Aggressive));
        assert_eq!(
            loader::plan_from_json(&store.get(PLAN_KEY).unwrap()).unwrap(),
            plan
        );

        let frame = funnel.chart_frame(&engine).unwrap();
        assert_eq!(frame.labels.len(), 8);
        assert_eq!(frame.y_max, Some(engine.y_axis_ceiling(120_000.0, 7).unwrap()));
    }

    #[test]
    fn test_funnel_amount_validation() {
        let mut funnel = FunnelSession::default();
        assert!(funnel.confirm_amount("999").is_err());
        assert!(funnel.confirm_amount("lots").is_err());
        assert!(funnel.confirm_amount("").is_err());
        assert_eq!(funnel.step(), FunnelStep::Amount);
        assert_eq!(funnel.draft().amount, 50_000.0);

        funnel.confirm_amount(" 1000 ").unwrap();
        assert_eq!(funnel.draft().amount, 1000.0);
    }

    #[test]
    fn test_funnel_unknown_term_and_back() {
        let engine = ProjectionEngine::reference();
        let mut funnel = FunnelSession::default();
        funnel.confirm_amount("50000").unwrap();
        funnel.set_term(9).unwrap();
        assert!(funnel.set_term(11).is_err());

        funnel.unknown_term();
        assert_eq!(funnel.step(), FunnelStep::Risk);
        assert_eq!(funnel.draft().term, 5);

        assert!(funnel.back());
        assert_eq!(funnel.step(), FunnelStep::Term);
        let frame = funnel.chart_frame(&engine).unwrap();
        assert_eq!(frame.datasets.len(), 1);
        assert_eq!(frame.labels.len(), 6);

        assert!(funnel.back());
        assert!(!funnel.back());
        assert_eq!(funnel.chart_frame(&engine).unwrap().labels.len(), 11);
    }

    #[test]
    fn test_finish_requires_risk_step() {
        let mut store = MemoryStore::new();
        let mut funnel = FunnelSession::default();
        funnel.confirm_amount("50000").unwrap();
        assert!(funnel.finish(&mut store).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_edit_session_flow() {
        let engine = ProjectionEngine::reference();
        let mut store = MemoryStore::new();
        let mut bridge = RecordingBridge::default();

        assert!(matches!(
            EditSession::load(&store, &engine),
            Err(ProjectionError::NotFound(_))
        ));

        let plan = InvestmentPlan::new(80_000.0, 6, RiskProfile::Moderate);
        store.put(PLAN_KEY, loader::plan_to_json(&plan).unwrap());

        let mut edit = EditSession::load(&store, &engine).unwrap();
        assert_eq!(edit.slider_value(), 50);

        edit.replace_asset(0, "Lukoil", &engine).unwrap();
        assert!(edit.set_risk_slider(90, &engine));
        assert!(!edit.set_risk_slider(80, &engine));
        assert_eq!(edit.plan().risk_profile, RiskProfile::Aggressive);
        assert_eq!(
            edit.allocation().holding(AssetCategory::StocksRf).unwrap().name,
            "Lukoil"
        );

        edit.reset(&engine);
        assert_eq!(edit.plan(), &plan);
        assert_eq!(edit.allocation().holdings[0].name, "Sberbank");

        edit.set_risk_slider(10, &engine);
        let message = edit.save(&mut store, &mut bridge).unwrap();
        assert_eq!(message.risk_profile.as_deref(), Some("conservative"));
        assert_eq!(bridge.sent.len(), 1);
        assert!(bridge.sent[0].contains("\"assets\""));

        let stored = loader::plan_from_json(&store.get(PLAN_KEY).unwrap()).unwrap();
        assert_eq!(stored.risk_profile, RiskProfile::Conservative);
        assert_eq!(edit.chart_frame(&engine).unwrap().labels.len(), 7);
    }

    #[test]
    fn test_saved_instruments_survive_reload_and_reset() {
        let engine = ProjectionEngine::reference();
        let mut store = MemoryStore::new();
        let mut bridge = RecordingBridge::default();
        StoredPlan::new(&InvestmentPlan::new(80_000.0, 6, RiskProfile::Moderate), None)
            .save(&mut store)
            .unwrap();

        let mut edit = EditSession::load(&store, &engine).unwrap();
        edit.replace_asset(0, "Lukoil", &engine).unwrap();
        edit.save(&mut store, &mut bridge).unwrap();

        let stored = StoredPlan::load(&store).unwrap();
        assert_eq!(stored.assets.as_ref().unwrap()[0].name, "Lukoil");

        let mut reloaded = EditSession::load(&store, &engine).unwrap();
        assert_eq!(reloaded.allocation().holdings[0].name, "Lukoil");

        reloaded.replace_asset(0, "Gazprom", &engine).unwrap();
        reloaded.set_risk_slider(85, &engine);
        reloaded.reset(&engine);
        assert_eq!(reloaded.plan().risk_profile, RiskProfile::Moderate);
        assert_eq!(reloaded.allocation().holdings[0].name, "Lukoil");
        assert_eq!(reloaded.allocation().holdings[1].name, "OFZ 26238");
    }

    #[test]
    fn test_survey_is_consumed_by_conversion() {
        let engine = ProjectionEngine::reference();
        let mut store = MemoryStore::new();
        assert!(matches!(ConfirmSession::load(&store), Err(ProjectionError::NotFound(_))));

        let plan = InvestmentPlan::new(100_000.0, 5, RiskProfile::Aggressive);
        StoredPlan::new(&plan, None).save(&mut store).unwrap();
        let answers = SurveyAnswers::new(Some("25-34"), Some("beginner"), &["deposits"]).unwrap();
        submit_survey(&mut store, &answers).unwrap();

        let confirm = ConfirmSession::load(&store).unwrap();
        let summary = confirm.summary(&engine).unwrap();
        assert_eq!(summary.max_profit, summary.final_max - 100_000.0);

        let event = confirm.convert(&mut store, true);
        assert!(event.hedge_risk_selected);
        assert_eq!(event.survey, Some(answers));
        assert!(store.get(SURVEY_KEY).is_none());
        assert!(store.get(PLAN_KEY).is_some());

        // Second click has no survey left to attach
        assert_eq!(confirm.convert(&mut store, false).survey, None);

        store.put(SURVEY_KEY, "not json".to_string());
        assert_eq!(confirm.convert(&mut store, false).survey, None);
        assert!(store.get(SURVEY_KEY).is_none());
    }

    #[test]
    fn test_restart_clears_session() {
        let mut store = MemoryStore::new();
        StoredPlan::new(&InvestmentPlan::new(5_000.0, 2, RiskProfile::Conservative), None)
            .save(&mut store)
            .unwrap();
        let answers = SurveyAnswers::new(Some("45+"), Some("none"), &["stocks"]).unwrap();
        submit_survey(&mut store, &answers).unwrap();
        assert_eq!(store.len(), 2);

        restart(&mut store);
        assert!(store.is_empty());
    }
}
