pub mod detail;
pub mod errors;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::client::NutritionApi;
use crate::config::DashboardConfig;
use crate::error::ApiError;
use crate::generation::Generation;
use crate::meals::dto::{GenerateRequest, LogQuery, MealLogSummary, MealPlanSuggestion, Preferences};
use crate::meals::history::{FetchOutcome, HistoryLoader, PageRequest};
use crate::meals::services::{ManualMealForm, PlanSlot};
use crate::nutrition::WeeklyProgress;

pub use detail::{DetailPanel, DetailState};
pub use errors::{ErrorBoard, ErrorKey};

const RECENT_MEALS_DAYS: u32 = 7;
const SAVE_PREFERENCES_FAILED: &str = "Could not save preferences";
const SAVE_OVERRIDES_FAILED: &str = "Could not save overrides";
const NO_SUGGESTION: &str = "No suggestion to log for that meal";

/// Everything the dashboard renders from.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub progress: WeeklyProgress,
    pub recent_meals: Vec<MealLogSummary>,
    pub preferences: Preferences,
    pub plan: Option<MealPlanSuggestion>,
    pub is_generating: bool,
    pub is_logging: bool,
    pub manual_form: ManualMealForm,
    pub is_manual_submitting: bool,
    pub detail: DetailPanel,
    pub history: HistoryLoader,
    pub history_open: bool,
    pub errors: ErrorBoard,
    progress_gen: Generation,
    recent_gen: Generation,
    preferences_gen: Generation,
    plan_gen: Generation,
}

impl DashboardState {
    fn new(config: &DashboardConfig) -> Self {
        Self {
            progress: WeeklyProgress::default(),
            recent_meals: Vec::new(),
            preferences: Preferences::default(),
            plan: None,
            is_generating: false,
            is_logging: false,
            manual_form: ManualMealForm::default(),
            is_manual_submitting: false,
            detail: DetailPanel::default(),
            history: HistoryLoader::new(config.history_page_size, config.history_days),
            history_open: false,
            errors: ErrorBoard::default(),
            progress_gen: Generation::default(),
            recent_gen: Generation::default(),
            preferences_gen: Generation::default(),
            plan_gen: Generation::default(),
        }
    }
}

/// Drives the dashboard against a remote backend.
///
/// State lives behind an async mutex that is released while a backend call
/// is in flight; each completion re-checks its ticket before touching state.
/// Commands record failures on the error board and also return them.
pub struct Dashboard {
    api: Arc<dyn NutritionApi>,
    config: DashboardConfig,
    state: Mutex<DashboardState>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn NutritionApi>, config: DashboardConfig) -> Self {
        let state = Mutex::new(DashboardState::new(&config));
        Self { api, config, state }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    pub async fn active_error(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.errors.active().map(|(_, message)| message.to_string())
    }

    #[instrument(skip(self))]
    pub async fn load_all(&self) {
        let _ = tokio::join!(
            self.load_progress(),
            self.load_recent_meals(),
            self.load_preferences()
        );
    }

    #[instrument(skip(self))]
    pub async fn load_progress(&self) -> Result<(), ApiError> {
        let ticket = self.state.lock().await.progress_gen.advance();
        let result = self.api.weekly_progress().await;

        let mut state = self.state.lock().await;
        if !state.progress_gen.is_current(ticket) {
            debug!("discarding stale nutrition progress");
            return Ok(());
        }
        match result {
            Ok(progress) => {
                state.progress = progress;
                state.errors.clear(ErrorKey::Progress);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "loading nutrition progress failed");
                state.errors.record(ErrorKey::Progress, &e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn load_recent_meals(&self) -> Result<(), ApiError> {
        let ticket = self.state.lock().await.recent_gen.advance();
        let query = LogQuery {
            limit: self.config.recent_limit,
            offset: 0,
            days: RECENT_MEALS_DAYS,
        };
        let result = self.api.meal_logs(query).await;

        let mut state = self.state.lock().await;
        if !state.recent_gen.is_current(ticket) {
            debug!("discarding stale recent meals");
            return Ok(());
        }
        match result {
            Ok(rows) => {
                state.recent_meals = rows;
                state.errors.clear(ErrorKey::RecentMeals);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "loading recent meals failed");
                state.errors.record(ErrorKey::RecentMeals, &e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn load_preferences(&self) -> Result<(), ApiError> {
        let ticket = self.state.lock().await.preferences_gen.advance();
        let result = self.api.preferences().await;

        let mut state = self.state.lock().await;
        if !state.preferences_gen.is_current(ticket) {
            debug!("discarding stale preferences");
            return Ok(());
        }
        match result {
            Ok(preferences) => {
                state.preferences = preferences;
                state.errors.clear(ErrorKey::Preferences);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "loading preferences failed");
                state.errors.record(ErrorKey::Preferences, &e);
                Err(e)
            }
        }
    }

    /// Replaces the stored preferences. A load still in flight is dropped
    /// so it cannot overwrite what was just saved.
    #[instrument(skip(self, preferences))]
    pub async fn save_preferences(&self, preferences: Preferences) -> Result<(), ApiError> {
        let result = self.api.save_preferences(&preferences).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(saved) => {
                state.preferences_gen.invalidate();
                state.preferences = saved;
                state.errors.clear(ErrorKey::Preferences);
                info!("preferences saved");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "saving preferences failed");
                state
                    .errors
                    .record_with(ErrorKey::Preferences, &e, SAVE_PREFERENCES_FAILED);
                Err(e)
            }
        }
    }

    /// Requests a fresh plan built from the latest loaded progress and
    /// preferences. The returned plan replaces the previous one outright.
    #[instrument(skip(self))]
    pub async fn generate_plan(&self) -> Result<(), ApiError> {
        let (ticket, request) = {
            let mut state = self.state.lock().await;
            state.is_generating = true;
            state.errors.clear(ErrorKey::Generate);
            let request = GenerateRequest {
                weekly_progress: Some(state.progress.clone()),
                preferences: state.preferences.preferred_ingredients.clone(),
                restrictions: state.preferences.dietary_restrictions.clone(),
            };
            (state.plan_gen.advance(), request)
        };
        let result = self.api.generate_meal_plan(&request).await;

        let mut state = self.state.lock().await;
        if !state.plan_gen.is_current(ticket) {
            debug!("discarding superseded meal plan");
            return Ok(());
        }
        state.is_generating = false;
        match result {
            Ok(plan) => {
                info!(generated_at = ?plan.generated_at, "meal plan generated");
                state.plan = Some(plan);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "meal plan generation failed");
                state.errors.record(ErrorKey::Generate, &e);
                Err(e)
            }
        }
    }

    /// Logs the lunch or dinner suggestion of the current plan as eaten.
    #[instrument(skip(self))]
    pub async fn log_suggested(&self, slot: PlanSlot) -> Result<(), ApiError> {
        let request = {
            let mut state = self.state.lock().await;
            let meal = state.plan.as_ref().and_then(|plan| match slot {
                PlanSlot::Lunch => plan.lunch.as_ref(),
                PlanSlot::Dinner => plan.dinner.as_ref(),
            });
            let Some(request) = meal.map(|m| m.to_log_request(slot)) else {
                let err = ApiError::Validation(NO_SUGGESTION.into());
                warn!(?slot, "no suggestion to log");
                state.errors.record(ErrorKey::LogMeal, &err);
                return Err(err);
            };
            state.is_logging = true;
            state.errors.clear(ErrorKey::LogMeal);
            request
        };
        let result = self.api.log_meal(&request).await;

        {
            let mut state = self.state.lock().await;
            state.is_logging = false;
            match &result {
                Ok(logged) => info!(id = logged.id, meal = %request.meal_name, "suggestion logged"),
                Err(e) => {
                    error!(error = %e, "logging suggestion failed");
                    state.errors.record(ErrorKey::LogMeal, e);
                }
            }
        }
        result?;
        self.refresh_totals().await;
        Ok(())
    }

    pub async fn update_manual_form(&self, edit: impl FnOnce(&mut ManualMealForm)) {
        edit(&mut self.state.lock().await.manual_form);
    }

    /// Validates the manual form locally before anything is sent.
    #[instrument(skip(self))]
    pub async fn submit_manual(&self) -> Result<(), ApiError> {
        let request = {
            let mut state = self.state.lock().await;
            if state.is_manual_submitting {
                return Ok(());
            }
            match state.manual_form.validate() {
                Ok(request) => {
                    state.is_manual_submitting = true;
                    state.errors.clear(ErrorKey::ManualLog);
                    request
                }
                Err(e) => {
                    warn!(error = %e, "manual meal form rejected");
                    state.errors.record(ErrorKey::ManualLog, &e);
                    return Err(e);
                }
            }
        };
        let result = self.api.log_manual_meal(&request).await;

        {
            let mut state = self.state.lock().await;
            state.is_manual_submitting = false;
            match &result {
                Ok(logged) => {
                    info!(id = logged.id, meal = %logged.meal_name, "manual meal logged");
                    state.manual_form = ManualMealForm::default();
                }
                Err(e) => {
                    error!(error = %e, "manual meal logging failed");
                    state.errors.record(ErrorKey::ManualLog, e);
                }
            }
        }
        result?;
        self.refresh_totals().await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn open_meal_detail(&self, meal_id: i64) -> Result<(), ApiError> {
        let ticket = {
            let mut state = self.state.lock().await;
            state.errors.clear(ErrorKey::MealDetail);
            state.detail.begin_open(meal_id)
        };
        let result = self.api.meal_log(meal_id).await;

        let mut state = self.state.lock().await;
        match state.detail.finish_open(ticket, result) {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(error = %e, meal_id, "loading meal detail failed");
                state.errors.record(ErrorKey::MealDetail, &e);
                Err(e)
            }
        }
    }

    pub async fn close_meal_detail(&self) {
        let mut state = self.state.lock().await;
        state.detail.close();
        state.errors.clear(ErrorKey::MealDetail);
    }

    /// Returns false when no meal is open.
    pub async fn set_override_draft(&self, key: &str, raw: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.detail.session_mut() {
            Some(session) => {
                session.set_draft(key, raw);
                true
            }
            None => false,
        }
    }

    pub async fn discard_overrides(&self) {
        if let Some(session) = self.state.lock().await.detail.session_mut() {
            session.discard_draft();
        }
    }

    /// Sends the parsed draft as the full override set. A response that
    /// lands after the panel was closed or switched is not applied, though
    /// totals are still refreshed since the backend did change.
    #[instrument(skip(self))]
    pub async fn save_overrides(&self) -> Result<(), ApiError> {
        let Some(ticket) = self.state.lock().await.detail.begin_save() else {
            return Ok(());
        };
        let meal_id = ticket.meal_id;
        let result = self.api.update_overrides(meal_id, &ticket.body).await;
        let landed = result.is_ok();

        let outcome = {
            let mut state = self.state.lock().await;
            match state.detail.finish_save(ticket, result) {
                Ok(applied) => {
                    if applied {
                        state.errors.clear(ErrorKey::MealDetail);
                    }
                    info!(meal_id, applied, "overrides saved");
                    Ok(())
                }
                Err(e) => {
                    error!(error = %e, meal_id, "saving overrides failed");
                    state
                        .errors
                        .record_with(ErrorKey::MealDetail, &e, SAVE_OVERRIDES_FAILED);
                    Err(e)
                }
            }
        };
        if landed {
            self.refresh_totals().await;
        }
        outcome
    }

    #[instrument(skip(self))]
    pub async fn delete_meal(&self, meal_id: i64) -> Result<(), ApiError> {
        let result = self.api.delete_meal_log(meal_id).await;
        {
            let mut state = self.state.lock().await;
            if let Err(e) = &result {
                error!(error = %e, meal_id, "deleting meal failed");
                state.errors.record(ErrorKey::DeleteMeal, e);
            } else {
                state.errors.clear(ErrorKey::DeleteMeal);
                state.history.remove_item(meal_id);
                if state.detail.meal_id() == Some(meal_id) {
                    state.detail.close();
                }
                info!(meal_id, "meal deleted");
            }
        }
        result?;
        self.refresh_totals().await;
        Ok(())
    }

    /// Opens the history panel on a fresh first page.
    #[instrument(skip(self))]
    pub async fn open_history(&self) -> Result<(), ApiError> {
        let request = {
            let mut state = self.state.lock().await;
            state.history_open = true;
            state.errors.clear(ErrorKey::History);
            state.history.open()
        };
        let result = self.api.meal_logs(request.query).await;
        self.settle_history(request, result).await.map(|_| ())
    }

    /// Fetches the next page; a no-op while a page is loading or once the
    /// feed has ended.
    #[instrument(skip(self))]
    pub async fn load_more_history(&self) -> Result<FetchOutcome, ApiError> {
        let request = {
            let mut state = self.state.lock().await;
            if !state.history_open {
                return Ok(FetchOutcome::Skipped);
            }
            match state.history.begin_fetch(false) {
                Some(request) => request,
                None => return Ok(FetchOutcome::Skipped),
            }
        };
        let result = self.api.meal_logs(request.query).await;
        self.settle_history(request, result).await
    }

    pub async fn close_history(&self) {
        let mut state = self.state.lock().await;
        state.history_open = false;
        state.history.close();
        state.errors.clear(ErrorKey::History);
    }

    async fn settle_history(
        &self,
        request: PageRequest,
        result: Result<Vec<MealLogSummary>, ApiError>,
    ) -> Result<FetchOutcome, ApiError> {
        let mut state = self.state.lock().await;
        match state.history.finish_fetch(request, result) {
            Ok(outcome) => {
                if matches!(outcome, FetchOutcome::Applied { .. }) {
                    state.errors.clear(ErrorKey::History);
                }
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %e, offset = request.query.offset, "loading meal history failed");
                state.errors.record(ErrorKey::History, &e);
                Err(e)
            }
        }
    }

    /// Reloads the aggregates a logged, edited or deleted meal affects.
    async fn refresh_totals(&self) {
        let (progress, recent) = tokio::join!(self.load_progress(), self.load_recent_meals());
        if progress.is_err() || recent.is_err() {
            warn!("refresh after meal change was incomplete");
        }
    }
}
