use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog;
use super::progress::{assess, Assessment, ProgressStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientCategory {
    Macro,
    Vitamin,
    Mineral,
    Lipid,
    Carb,
}

/// One nutrient as reported by `GET nutrition/progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub current: f64,
    pub target: f64,
    #[serde(default)]
    pub unit: String,
    pub category: NutrientCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "isLimit", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_limit: bool,
}

/// Weekly totals keyed by nutrient, replaced wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyProgress(pub BTreeMap<String, ProgressEntry>);

impl WeeklyProgress {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<NutrientMetric> {
        self.0.get(key).map(|entry| NutrientMetric::from_entry(key, entry))
    }

    /// Metrics in catalog order; keys the catalog does not know come last.
    pub fn metrics(&self) -> Vec<NutrientMetric> {
        let mut metrics: Vec<_> = self
            .0
            .iter()
            .map(|(key, entry)| NutrientMetric::from_entry(key, entry))
            .collect();
        // stable: unknown keys keep their BTreeMap order
        metrics.sort_by_key(|m| catalog::position(&m.key));
        metrics
    }

    pub fn metrics_in(&self, category: NutrientCategory) -> Vec<NutrientMetric> {
        self.metrics()
            .into_iter()
            .filter(|m| m.category == category)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientMetric {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub category: NutrientCategory,
    pub current: f64,
    pub target: f64,
    pub is_limit: bool,
}

impl NutrientMetric {
    fn from_entry(key: &str, entry: &ProgressEntry) -> Self {
        let known = catalog::lookup(key);
        let label = entry
            .name
            .clone()
            .or_else(|| known.map(|n| n.label.to_string()))
            .unwrap_or_else(|| catalog::fallback_label(key));
        let unit = if entry.unit.is_empty() {
            known.map(|n| n.unit.to_string()).unwrap_or_default()
        } else {
            entry.unit.clone()
        };
        Self {
            key: key.to_string(),
            label,
            unit,
            category: entry.category,
            current: entry.current,
            target: entry.target,
            is_limit: entry.is_limit,
        }
    }

    pub fn assessment(&self) -> Assessment {
        assess(self.current, self.target, self.is_limit)
    }

    pub fn percentage(&self) -> f64 {
        self.assessment().percentage
    }

    pub fn status(&self) -> ProgressStatus {
        self.assessment().status
    }
}
