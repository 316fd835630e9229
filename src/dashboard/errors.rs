use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ApiError;

/// Operations that can fail independently. Declaration order is the
/// priority used to pick the single banner message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKey {
    Progress,
    RecentMeals,
    Preferences,
    Generate,
    LogMeal,
    ManualLog,
    MealDetail,
    History,
    DeleteMeal,
}

impl ErrorKey {
    pub fn fallback(self) -> &'static str {
        match self {
            ErrorKey::Progress => "Could not load nutrition progress",
            ErrorKey::RecentMeals => "Could not load recent meals",
            ErrorKey::Preferences => "Could not load preferences",
            ErrorKey::Generate => "Could not generate meal suggestions",
            ErrorKey::LogMeal => "Could not log meal",
            ErrorKey::ManualLog => "Could not log manual meal",
            ErrorKey::MealDetail => "Could not load meal detail",
            ErrorKey::History => "Could not load meal history",
            ErrorKey::DeleteMeal => "Could not delete meal",
        }
    }
}

/// Current error per operation. A cleared key is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorBoard {
    errors: BTreeMap<ErrorKey, String>,
}

impl ErrorBoard {
    pub fn set(&mut self, key: ErrorKey, message: impl Into<String>) {
        self.errors.insert(key, message.into());
    }

    pub fn record(&mut self, key: ErrorKey, err: &ApiError) {
        self.set(key, err.user_message(key.fallback()));
    }

    pub fn record_with(&mut self, key: ErrorKey, err: &ApiError, fallback: &str) {
        self.set(key, err.user_message(fallback));
    }

    pub fn clear(&mut self, key: ErrorKey) {
        self.errors.remove(&key);
    }

    pub fn get(&self, key: ErrorKey) -> Option<&str> {
        self.errors.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The one message the banner shows.
    pub fn active(&self) -> Option<(ErrorKey, &str)> {
        self.errors
            .iter()
            .next()
            .map(|(key, message)| (*key, message.as_str()))
    }
}
