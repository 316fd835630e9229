pub mod dto;
pub mod history;
pub mod overrides;
pub mod services;

pub use dto::{MealLogEntry, MealLogSummary, MealPlanSuggestion, MealType};
pub use history::{FetchOutcome, HistoryLoader, PageRequest};
pub use overrides::{DraftOverrides, OverrideSession};
pub use services::{ManualMealForm, PlanSlot};
