pub mod catalog;
pub mod dto;
pub mod progress;

pub use dto::{NutrientCategory, NutrientMetric, ProgressEntry, WeeklyProgress};
pub use progress::{assess, classify_status, resolve_percentage, Assessment, ProgressStatus};
