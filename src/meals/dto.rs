use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    #[default]
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    /// Case- and whitespace-insensitive; `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for MealType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        MealType::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown meal type `{raw}`")))
    }
}

/// A logged meal as returned by `GET meal-log/{id}` and `PATCH meal-log/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLogEntry {
    pub id: i64,
    pub meal_name: String,
    #[serde(default, deserialize_with = "meal_type_or_default")]
    pub meal_type: MealType,
    #[serde(default, with = "iso_date::option")]
    pub meal_date: Option<Date>,
    #[serde(default)]
    pub meal_time: Option<String>,
    /// Calorie figure stored alongside the nutrition profile.
    #[serde(default, rename = "calories")]
    pub calories_summary: Option<f64>,
    #[serde(default)]
    pub nutrition: BTreeMap<String, f64>,
    /// Sparse: only keys the user corrected.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub override_nutrition: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub was_suggested: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

impl MealLogEntry {
    pub fn has_overrides(&self) -> bool {
        !self.override_nutrition.is_empty()
    }

    /// Override when present, otherwise the computed value.
    pub fn effective_value(&self, key: &str) -> Option<f64> {
        self.override_nutrition
            .get(key)
            .or_else(|| self.nutrition.get(key))
            .copied()
    }
}

/// Row of `GET meal-log`, used by the recent-meals strip and the history feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLogSummary {
    pub id: i64,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub meal: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(rename = "type", default)]
    pub meal_type: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub has_override: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLogRequest {
    pub meal_name: String,
    #[serde(default, deserialize_with = "meal_type_or_default")]
    pub meal_type: MealType,
    pub calories: f64,
    #[serde(default)]
    pub nutrition: BTreeMap<String, f64>,
    #[serde(default, with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    pub meal_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_time: Option<String>,
    #[serde(default)]
    pub was_suggested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMealResponse {
    #[serde(default)]
    pub success: bool,
    pub id: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualMealRequest {
    pub meal_name: String,
    #[serde(default, deserialize_with = "meal_type_or_default")]
    pub meal_type: MealType,
    pub description: String,
    pub approximate_weight: String,
    #[serde(default, with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    pub meal_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualMealResponse {
    #[serde(default)]
    pub success: bool,
    pub id: i64,
    #[serde(default)]
    pub meal_name: String,
    #[serde(default)]
    pub nutrition: BTreeMap<String, f64>,
}

/// Body of `PATCH meal-log/{id}`. Replaces the whole override set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub override_nutrition: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
    pub id: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub preferred_ingredients: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default = "default_cooking_time")]
    pub cooking_time_preference: u32,
    #[serde(default = "default_complexity")]
    pub meal_complexity: String,
}

fn default_cooking_time() -> u32 {
    30
}

fn default_complexity() -> String {
    "simple".into()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preferred_ingredients: Vec::new(),
            dietary_restrictions: Vec::new(),
            cooking_time_preference: default_cooking_time(),
            meal_complexity: default_complexity(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_progress: Option<crate::nutrition::WeeklyProgress>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestedMeal {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free text from the planner; only the four known slots are kept.
    #[serde(
        default,
        deserialize_with = "lenient_meal_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub meal_type: Option<MealType>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    /// Raw values from the planner; numbers may arrive as strings.
    #[serde(default)]
    pub nutrition: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(
        default,
        alias = "prepTime",
        alias = "cooking_time",
        deserialize_with = "lenient_number"
    )]
    pub prep_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusDeficit {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub remaining: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealFocus {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub deficits: Vec<FocusDeficit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieTargets {
    pub lunch: f64,
    pub dinner: f64,
}

/// Output of `POST meals/generate`; replaced, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPlanSuggestion {
    #[serde(default)]
    pub lunch: Option<SuggestedMeal>,
    #[serde(default)]
    pub dinner: Option<SuggestedMeal>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub focus: MealFocus,
    #[serde(default)]
    pub calorie_targets: Option<CalorieTargets>,
    #[serde(default, rename = "remaining", deserialize_with = "null_as_empty")]
    pub remaining_targets: BTreeMap<String, f64>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMealRequest {
    pub name: String,
    #[serde(default)]
    pub base_description: String,
    #[serde(default, deserialize_with = "meal_type_or_default")]
    pub meal_type: MealType,
    #[serde(default)]
    pub preferred_ingredients: Vec<String>,
    #[serde(default)]
    pub avoid_ingredients: Vec<String>,
    #[serde(default = "default_cooking_time")]
    pub cooking_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub nutrition_focus: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_notes: Option<String>,
}

fn null_as_empty<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// sqlite hands `was_suggested` back as 0/1.
fn bool_or_int<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }
    Ok(match Flag::deserialize(d)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Null(()) => false,
    })
}

fn lenient_meal_type<'de, D>(d: D) -> Result<Option<MealType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(MealType::parse))
}

/// The backend stores `meal_type` as free text defaulting to dinner.
fn meal_type_or_default<'de, D>(d: D) -> Result<MealType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_meal_type(d)?.unwrap_or_default())
}

fn lenient_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Numbers pass through; numeric strings are parsed; anything else is dropped.
pub fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
