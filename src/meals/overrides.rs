//! Three-layer nutrient resolution for one open meal: the computed
//! `nutrition`, the saved `override_nutrition`, and unsaved draft text.

use std::collections::BTreeMap;

use tracing::warn;

use super::dto::{MealLogEntry, OverrideRequest};
use crate::nutrition::catalog;

/// Raw text typed into override fields, keyed like `nutrition`.
pub type DraftOverrides = BTreeMap<String, String>;

/// Parses draft text. Empty or unparsable text means "no draft", never zero.
pub fn parse_draft(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_value(value: f64) -> String {
    // 600.0 -> "600", 12.5 -> "12.5"
    format!("{value}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideSession {
    original: MealLogEntry,
    draft: DraftOverrides,
}

impl OverrideSession {
    /// Opens a session with the draft seeded from the saved overrides so the
    /// edit fields start out showing them.
    pub fn new(original: MealLogEntry) -> Self {
        let draft = Self::seed_draft(&original);
        Self { original, draft }
    }

    fn seed_draft(entry: &MealLogEntry) -> DraftOverrides {
        entry
            .override_nutrition
            .iter()
            .map(|(k, v)| (k.clone(), format_value(*v)))
            .collect()
    }

    pub fn meal_id(&self) -> i64 {
        self.original.id
    }

    pub fn entry(&self) -> &MealLogEntry {
        &self.original
    }

    pub fn saved_overrides(&self) -> &BTreeMap<String, f64> {
        &self.original.override_nutrition
    }

    pub fn draft(&self) -> &DraftOverrides {
        &self.draft
    }

    pub fn draft_text(&self, key: &str) -> &str {
        self.draft.get(key).map(String::as_str).unwrap_or("")
    }

    /// Draft, then saved override, then the computed value.
    pub fn resolve_display_value(&self, key: &str) -> Option<f64> {
        if let Some(value) = self.draft.get(key).and_then(|raw| parse_draft(raw)) {
            return Some(value);
        }
        self.original.effective_value(key)
    }

    /// Resolved value for every key that has one, for totals and summaries.
    pub fn display_nutrition(&self) -> BTreeMap<String, f64> {
        let mut keys: Vec<&str> = self
            .original
            .nutrition
            .keys()
            .chain(self.original.override_nutrition.keys())
            .chain(self.draft.keys())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys.into_iter()
            .filter_map(|k| self.resolve_display_value(k).map(|v| (k.to_string(), v)))
            .collect()
    }

    /// Stores the text verbatim; it only affects display once it parses.
    pub fn set_draft(&mut self, key: impl Into<String>, raw: impl Into<String>) {
        self.draft.insert(key.into(), raw.into());
    }

    /// Local reset of the edit fields. Saved overrides are untouched until
    /// the next commit.
    pub fn discard_draft(&mut self) {
        self.draft.clear();
    }

    pub fn is_overridden(&self, key: &str) -> bool {
        self.resolve_display_value(key) != self.original.nutrition.get(key).copied()
    }

    /// Replacement override set built from the draft: non-empty entries that
    /// parse and name a known nutrient. Saved keys missing here get dropped.
    pub fn submission(&self) -> OverrideRequest {
        let mut override_nutrition = BTreeMap::new();
        for (key, raw) in &self.draft {
            let Some(value) = parse_draft(raw) else {
                continue;
            };
            if !catalog::is_known(key) {
                warn!(
                    meal_id = self.original.id,
                    key = %key,
                    "dropping override for unknown nutrient"
                );
                continue;
            }
            override_nutrition.insert(key.clone(), value);
        }
        OverrideRequest { override_nutrition }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.submission().override_nutrition != self.original.override_nutrition
    }

    /// Adopts the entry the backend returned after a successful save.
    pub fn apply_saved(&mut self, updated: MealLogEntry) {
        self.draft = Self::seed_draft(&updated);
        self.original = updated;
    }
}
