use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Low,
    Medium,
    Good,
    /// Target is missing, zero or negative.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub percentage: f64,
    pub status: ProgressStatus,
}

fn has_usable_target(current: f64, target: f64) -> bool {
    current.is_finite() && target.is_finite() && target > 0.0
}

fn raw_percentage(current: f64, target: f64) -> f64 {
    current / target * 100.0
}

/// Display percentage in `[0, 100]`. Over-consumption is clamped for both
/// goal and limit nutrients; callers needing the overshoot use the raw values.
pub fn resolve_percentage(current: f64, target: f64, _is_limit: bool) -> f64 {
    if !has_usable_target(current, target) {
        return 0.0;
    }
    raw_percentage(current, target).clamp(0.0, 100.0)
}

/// Goal nutrients: `<50` low, `<80` medium, else good.
/// Limit nutrients: `<=80` good, `<=100` medium, else low.
pub fn classify_status(percentage: f64, is_limit: bool) -> ProgressStatus {
    if percentage.is_nan() {
        return ProgressStatus::Unknown;
    }
    if is_limit {
        if percentage <= 80.0 {
            ProgressStatus::Good
        } else if percentage <= 100.0 {
            ProgressStatus::Medium
        } else {
            ProgressStatus::Low
        }
    } else if percentage < 50.0 {
        ProgressStatus::Low
    } else if percentage < 80.0 {
        ProgressStatus::Medium
    } else {
        ProgressStatus::Good
    }
}

/// Percentage plus status for one nutrient. Limit nutrients are classified
/// on the unclamped ratio so an exceeded ceiling reads as `Low`.
pub fn assess(current: f64, target: f64, is_limit: bool) -> Assessment {
    if !has_usable_target(current, target) {
        return Assessment {
            percentage: 0.0,
            status: ProgressStatus::Unknown,
        };
    }
    let percentage = resolve_percentage(current, target, is_limit);
    let status = if is_limit {
        classify_status(raw_percentage(current, target), true)
    } else {
        classify_status(percentage, false)
    };
    Assessment { percentage, status }
}
