use super::dto::NutrientCategory;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub category: NutrientCategory,
    /// Default weekly target.
    pub target: f64,
    pub is_limit: bool,
}

const fn goal(
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    category: NutrientCategory,
    target: f64,
) -> NutrientInfo {
    NutrientInfo {
        key,
        label,
        unit,
        category,
        target,
        is_limit: false,
    }
}

const fn limit(
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    category: NutrientCategory,
    target: f64,
) -> NutrientInfo {
    NutrientInfo {
        key,
        label,
        unit,
        category,
        target,
        is_limit: true,
    }
}

use NutrientCategory::{Carb, Lipid, Macro, Mineral, Vitamin};

/// Every nutrient key the dashboard recognizes, in display order.
pub const NUTRIENTS: &[NutrientInfo] = &[
    goal("calories", "Calories", "kcal", Macro, 14000.0),
    goal("protein", "Protein", "g", Macro, 700.0),
    goal("carbs", "Carbohydrates", "g", Macro, 1400.0),
    goal("fat", "Fat", "g", Macro, 466.0),
    goal("fiber", "Fiber", "g", Macro, 175.0),
    goal("vitamin_a", "Vitamin A", "mcg", Vitamin, 3500.0),
    goal("vitamin_c", "Vitamin C", "mg", Vitamin, 700.0),
    goal("vitamin_d", "Vitamin D", "mcg", Vitamin, 70.0),
    goal("vitamin_e", "Vitamin E", "mg", Vitamin, 105.0),
    goal("vitamin_k", "Vitamin K", "mcg", Vitamin, 770.0),
    goal("thiamin", "Thiamin (B1)", "mg", Vitamin, 10.5),
    goal("riboflavin", "Riboflavin (B2)", "mg", Vitamin, 12.6),
    goal("niacin", "Niacin (B3)", "mg", Vitamin, 105.0),
    goal("vitamin_b6", "Vitamin B6", "mg", Vitamin, 10.5),
    goal("folate", "Folate (B9)", "mcg", Vitamin, 2800.0),
    goal("vitamin_b12", "Vitamin B12", "mcg", Vitamin, 17.5),
    goal("calcium", "Calcium", "mg", Mineral, 7000.0),
    goal("iron", "Iron", "mg", Mineral, 126.0),
    goal("magnesium", "Magnesium", "mg", Mineral, 2800.0),
    goal("phosphorus", "Phosphorus", "mg", Mineral, 4900.0),
    goal("potassium", "Potassium", "mg", Mineral, 24500.0),
    limit("sodium", "Sodium", "mg", Mineral, 14000.0),
    goal("zinc", "Zinc", "mg", Mineral, 70.0),
    goal("copper", "Copper", "mg", Mineral, 17.5),
    goal("selenium", "Selenium", "mcg", Mineral, 385.0),
    limit("cholesterol", "Cholesterol", "mg", Lipid, 1400.0),
    limit("saturated_fat", "Saturated Fat", "g", Lipid, 140.0),
    limit("trans_fat", "Trans Fat", "g", Lipid, 7.0),
    goal("omega_3", "Omega-3", "g", Lipid, 17.5),
    goal("omega_6", "Omega-6", "g", Lipid, 87.5),
    limit("sugar", "Sugar", "g", Carb, 210.0),
    limit("added_sugar", "Added Sugar", "g", Carb, 140.0),
];

pub fn lookup(key: &str) -> Option<&'static NutrientInfo> {
    NUTRIENTS.iter().find(|n| n.key == key)
}

pub fn is_known(key: &str) -> bool {
    lookup(key).is_some()
}

/// Position of `key` in display order; unknown keys sort last.
pub fn position(key: &str) -> usize {
    NUTRIENTS
        .iter()
        .position(|n| n.key == key)
        .unwrap_or(NUTRIENTS.len())
}

pub fn section(category: NutrientCategory) -> impl Iterator<Item = &'static NutrientInfo> {
    NUTRIENTS.iter().filter(move |n| n.category == category)
}

/// `vitamin_b12` -> `Vitamin B12`, for keys the catalog does not know.
pub fn fallback_label(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_nutrients_are_flagged() {
        let limits: Vec<_> = NUTRIENTS.iter().filter(|n| n.is_limit).map(|n| n.key).collect();
        assert_eq!(
            limits,
            ["sodium", "cholesterol", "saturated_fat", "trans_fat", "sugar", "added_sugar"]
        );
    }

    #[test]
    fn sections_follow_display_order() {
        let lipids: Vec<_> = section(NutrientCategory::Lipid).map(|n| n.key).collect();
        assert_eq!(
            lipids,
            ["cholesterol", "saturated_fat", "trans_fat", "omega_3", "omega_6"]
        );
        assert_eq!(position("calories"), 0);
        assert_eq!(position("unobtainium"), NUTRIENTS.len());
    }

    #[test]
    fn fallback_label_title_cases_words() {
        assert_eq!(fallback_label("omega_9"), "Omega 9");
        assert_eq!(fallback_label("chromium"), "Chromium");
    }
}
