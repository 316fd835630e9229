use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::dto::{number_from_value, ManualMealRequest, MealLogRequest, MealType, SuggestedMeal};
use crate::error::ApiError;

pub const MANUAL_FIELDS_REQUIRED: &str = "Meal name, description, and portion size are required";

/// Which generated suggestion to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSlot {
    Lunch,
    Dinner,
}

impl From<PlanSlot> for MealType {
    fn from(slot: PlanSlot) -> Self {
        match slot {
            PlanSlot::Lunch => MealType::Lunch,
            PlanSlot::Dinner => MealType::Dinner,
        }
    }
}

/// Keeps only values that are numbers or numeric strings.
pub fn sanitize_nutrition(raw: &BTreeMap<String, serde_json::Value>) -> BTreeMap<String, f64> {
    raw.iter()
        .filter_map(|(k, v)| number_from_value(v).map(|n| (k.clone(), n)))
        .collect()
}

impl SuggestedMeal {
    /// Body for logging this suggestion as eaten.
    pub fn to_log_request(&self, slot: PlanSlot) -> MealLogRequest {
        let mut nutrition = sanitize_nutrition(&self.nutrition);
        if !nutrition.contains_key("calories") {
            if let Some(calories) = self.calories {
                nutrition.insert("calories".into(), calories);
            }
        }
        let calories = self
            .calories
            .or_else(|| nutrition.get("calories").copied())
            .unwrap_or(0.0);

        let mut notes = vec!["AI plan suggestion".to_string()];
        if !self.ingredients.is_empty() {
            notes.push(format!("Ingredients: {}", self.ingredients.join(", ")));
        }
        if !self.instructions.is_empty() {
            let steps: Vec<&str> = self.instructions.iter().take(3).map(String::as_str).collect();
            notes.push(format!("Instructions: {}", steps.join(" | ")));
        }

        MealLogRequest {
            meal_name: self.name.clone(),
            meal_type: self.meal_type.unwrap_or_else(|| slot.into()),
            calories,
            nutrition,
            meal_date: None,
            meal_time: None,
            was_suggested: true,
            notes: Some(notes.join("\n")),
        }
    }
}

/// Manual-entry form as the user fills it in.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualMealForm {
    pub meal_name: String,
    pub meal_type: MealType,
    pub description: String,
    pub approximate_weight: String,
    pub meal_date: Option<Date>,
    pub meal_time: Option<String>,
}

impl Default for ManualMealForm {
    fn default() -> Self {
        Self::starting_at(OffsetDateTime::now_utc())
    }
}

impl ManualMealForm {
    /// Blank form dated `now`.
    pub fn starting_at(now: OffsetDateTime) -> Self {
        Self {
            meal_name: String::new(),
            meal_type: MealType::Dinner,
            description: String::new(),
            approximate_weight: String::new(),
            meal_date: Some(now.date()),
            meal_time: Some(format!("{:02}:{:02}", now.hour(), now.minute())),
        }
    }

    /// Checked locally; a rejected form never reaches the backend.
    pub fn validate(&self) -> Result<ManualMealRequest, ApiError> {
        let required = [&self.meal_name, &self.description, &self.approximate_weight];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(ApiError::Validation(MANUAL_FIELDS_REQUIRED.into()));
        }
        Ok(ManualMealRequest {
            meal_name: self.meal_name.trim().to_string(),
            meal_type: self.meal_type,
            description: self.description.trim().to_string(),
            approximate_weight: self.approximate_weight.trim().to_string(),
            meal_date: self.meal_date,
            meal_time: self.meal_time.clone().filter(|t| !t.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn suggestion() -> SuggestedMeal {
        serde_json::from_value(json!({
            "name": "Lemon salmon with quinoa",
            "description": "Bright and quick",
            "calories": 610,
            "nutrition": {"protein": "38", "iron": 3.1, "notes": "rich in omega-3"},
            "ingredients": ["salmon", "quinoa", "lemon"],
            "instructions": ["Rinse quinoa", "Simmer", "Sear salmon", "Plate"]
        }))
        .unwrap()
    }

    #[test]
    fn suggestion_becomes_log_request() {
        let req = suggestion().to_log_request(PlanSlot::Dinner);
        assert_eq!(req.meal_type, MealType::Dinner);
        assert!(req.was_suggested);
        assert_eq!(req.calories, 610.0);
        assert_eq!(req.nutrition.get("calories"), Some(&610.0));
        assert_eq!(req.nutrition.get("protein"), Some(&38.0));
        assert!(!req.nutrition.contains_key("notes"));
        assert_eq!(
            req.notes.as_deref(),
            Some(
                "AI plan suggestion\nIngredients: salmon, quinoa, lemon\n\
                 Instructions: Rinse quinoa | Simmer | Sear salmon"
            )
        );
    }

    #[test]
    fn calories_fall_back_to_nutrition_profile() {
        let mut meal = suggestion();
        meal.calories = None;
        meal.nutrition.insert("calories".into(), json!(540.5));
        meal.meal_type = Some(MealType::Lunch);
        meal.ingredients.clear();
        meal.instructions.clear();
        let req = meal.to_log_request(PlanSlot::Dinner);
        assert_eq!(req.calories, 540.5);
        assert_eq!(req.meal_type, MealType::Lunch);
        assert_eq!(req.notes.as_deref(), Some("AI plan suggestion"));
    }

    #[test]
    fn manual_form_requires_name_description_and_portion() {
        let mut form = ManualMealForm::starting_at(datetime!(2025-03-04 12:05 UTC));
        form.meal_name = "Leftover curry".into();
        form.description = "   ".into();
        form.approximate_weight = "350g".into();
        assert_eq!(
            form.validate().unwrap_err(),
            ApiError::Validation(MANUAL_FIELDS_REQUIRED.into())
        );

        form.description = "Chickpea curry with rice".into();
        let req = form.validate().unwrap();
        assert_eq!(req.meal_type, MealType::Dinner);
        assert_eq!(req.meal_time.as_deref(), Some("12:05"));
        assert_eq!(req.meal_date.map(|d| d.to_string()).as_deref(), Some("2025-03-04"));
    }

    #[test]
    fn manual_request_serializes_iso_date() {
        let mut form = ManualMealForm::starting_at(datetime!(2025-03-04 08:30 UTC));
        form.meal_name = "Porridge".into();
        form.description = "Oats, milk, banana".into();
        form.approximate_weight = "1 bowl".into();
        let body = serde_json::to_value(form.validate().unwrap()).unwrap();
        assert_eq!(body["meal_date"], "2025-03-04");
        assert_eq!(body["meal_type"], "dinner");
    }
}
