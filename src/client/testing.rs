use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::NutritionApi;
use crate::error::ApiError;
use crate::meals::dto::{
    CustomMealRequest, DeleteResponse, GenerateRequest, LogMealResponse, LogQuery,
    ManualMealRequest, ManualMealResponse, MealLogEntry, MealLogRequest, MealLogSummary,
    MealPlanSuggestion, OverrideRequest, Preferences,
};
use crate::nutrition::WeeklyProgress;

#[derive(Default)]
struct FakeState {
    progress: WeeklyProgress,
    meals: BTreeMap<i64, MealLogEntry>,
    history: Vec<MealLogSummary>,
    preferences: Preferences,
    plan: MealPlanSuggestion,
    next_id: i64,
    failures: HashMap<String, ApiError>,
    calls: Vec<String>,
    log_queries: Vec<LogQuery>,
    override_bodies: Vec<(i64, OverrideRequest)>,
    logged: Vec<MealLogRequest>,
    manual: Vec<ManualMealRequest>,
    generated: Vec<GenerateRequest>,
}

/// In-memory backend for tests. Any call can be made to fail once, and any
/// call can be held in flight until its gate is opened.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(rows: Vec<MealLogSummary>) -> Self {
        let fake = Self::new();
        fake.state.lock().unwrap().history = rows;
        fake
    }

    pub fn set_history(&self, rows: Vec<MealLogSummary>) {
        self.state.lock().unwrap().history = rows;
    }

    pub fn set_progress(&self, progress: WeeklyProgress) {
        self.state.lock().unwrap().progress = progress;
    }

    pub fn set_preferences(&self, preferences: Preferences) {
        self.state.lock().unwrap().preferences = preferences;
    }

    pub fn set_plan(&self, plan: MealPlanSuggestion) {
        self.state.lock().unwrap().plan = plan;
    }

    pub fn insert_meal(&self, entry: MealLogEntry) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(entry.id);
        state.meals.insert(entry.id, entry);
    }

    pub fn meal(&self, id: i64) -> Option<MealLogEntry> {
        self.state.lock().unwrap().meals.get(&id).cloned()
    }

    /// The next call named `op` fails with `err`.
    pub fn fail_next(&self, op: &str, err: ApiError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op.to_string(), err);
    }

    /// Holds calls named `op` until the returned handle is notified.
    pub fn gate(&self, op: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(op.to_string(), notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == op).count()
    }

    pub fn log_queries(&self) -> Vec<LogQuery> {
        self.state.lock().unwrap().log_queries.clone()
    }

    pub fn override_bodies(&self) -> Vec<(i64, OverrideRequest)> {
        self.state.lock().unwrap().override_bodies.clone()
    }

    pub fn logged(&self) -> Vec<MealLogRequest> {
        self.state.lock().unwrap().logged.clone()
    }

    pub fn manual(&self) -> Vec<ManualMealRequest> {
        self.state.lock().unwrap().manual.clone()
    }

    pub fn generated(&self) -> Vec<GenerateRequest> {
        self.state.lock().unwrap().generated.clone()
    }

    async fn enter(&self, op: &str) -> Result<(), ApiError> {
        let gate = self.gates.lock().unwrap().remove(op);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut state = self.state.lock().unwrap();
        state.calls.push(op.to_string());
        match state.failures.remove(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found() -> ApiError {
        ApiError::Status {
            status: 404,
            detail: Some("Meal not found".into()),
        }
    }
}

#[async_trait]
impl NutritionApi for FakeBackend {
    async fn weekly_progress(&self) -> Result<WeeklyProgress, ApiError> {
        self.enter("weekly_progress").await?;
        Ok(self.state.lock().unwrap().progress.clone())
    }

    async fn meal_logs(&self, query: LogQuery) -> Result<Vec<MealLogSummary>, ApiError> {
        self.enter("meal_logs").await?;
        let mut state = self.state.lock().unwrap();
        state.log_queries.push(query);
        Ok(state
            .history
            .iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn meal_log(&self, id: i64) -> Result<MealLogEntry, ApiError> {
        self.enter(&format!("meal_log:{id}")).await?;
        self.meal(id).ok_or_else(Self::not_found)
    }

    async fn update_overrides(
        &self,
        id: i64,
        body: &OverrideRequest,
    ) -> Result<MealLogEntry, ApiError> {
        self.enter(&format!("update_overrides:{id}")).await?;
        let mut state = self.state.lock().unwrap();
        state.override_bodies.push((id, body.clone()));
        let entry = state.meals.get_mut(&id).ok_or_else(Self::not_found)?;
        entry.override_nutrition = body.override_nutrition.clone();
        Ok(entry.clone())
    }

    async fn log_meal(&self, body: &MealLogRequest) -> Result<LogMealResponse, ApiError> {
        self.enter("log_meal").await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.logged.push(body.clone());
        Ok(LogMealResponse {
            success: true,
            id,
            message: "Meal logged successfully".into(),
        })
    }

    async fn log_manual_meal(
        &self,
        body: &ManualMealRequest,
    ) -> Result<ManualMealResponse, ApiError> {
        self.enter("log_manual_meal").await?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.manual.push(body.clone());
        Ok(ManualMealResponse {
            success: true,
            id,
            meal_name: body.meal_name.clone(),
            nutrition: BTreeMap::from([("calories".to_string(), 450.0)]),
        })
    }

    async fn delete_meal_log(&self, id: i64) -> Result<DeleteResponse, ApiError> {
        self.enter(&format!("delete_meal_log:{id}")).await?;
        let mut state = self.state.lock().unwrap();
        state.history.retain(|m| m.id != id);
        state.meals.remove(&id).ok_or_else(Self::not_found)?;
        Ok(DeleteResponse {
            success: true,
            id,
            message: "Meal deleted".into(),
        })
    }

    async fn preferences(&self) -> Result<Preferences, ApiError> {
        self.enter("preferences").await?;
        Ok(self.state.lock().unwrap().preferences.clone())
    }

    async fn save_preferences(&self, body: &Preferences) -> Result<Preferences, ApiError> {
        self.enter("save_preferences").await?;
        let mut state = self.state.lock().unwrap();
        state.preferences = body.clone();
        Ok(state.preferences.clone())
    }

    async fn generate_meal_plan(
        &self,
        body: &GenerateRequest,
    ) -> Result<MealPlanSuggestion, ApiError> {
        self.enter("generate_meal_plan").await?;
        let mut state = self.state.lock().unwrap();
        state.generated.push(body.clone());
        Ok(state.plan.clone())
    }

    async fn create_custom_meal(
        &self,
        body: &CustomMealRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.enter("create_custom_meal").await?;
        Ok(serde_json::json!({ "name": body.name, "meal_type": body.meal_type }))
    }
}
