//! Risk classification
//!
//! Pure mappings from stored numbers and labels to the derived categories
//! served by the API. Nothing here touches storage; the query layer feeds
//! raw values in and gets labels and priorities out.

use serde::Serialize;
use std::fmt;

use crate::domain::Thresholds;

/// Rainfall total (mm) above which intensity is `high`
pub const HIGH_RAINFALL_MM: f64 = 50.0;

/// Rainfall total (mm) above which intensity is `medium`
pub const MEDIUM_RAINFALL_MM: f64 = 25.0;

/// Priority contributed by any station in breach, warning or danger alike
pub const STATION_BREACH_PRIORITY: i32 = 1;

/// Alert priority at or above which an alert is `high`
pub const HIGH_ALERT_PRIORITY: i32 = 3;

/// Current state of a gauge station
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Normal,
    Warning,
    Danger,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    pub fn is_breach(&self) -> bool {
        *self != Self::Normal
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a water level against a station's thresholds
pub fn classify_level(level: f64, thresholds: &Thresholds) -> StationStatus {
    if level >= thresholds.danger {
        StationStatus::Danger
    } else if level >= thresholds.warning {
        StationStatus::Warning
    } else {
        StationStatus::Normal
    }
}

/// Like [`classify_level`], but a station that never reported is `Normal`
pub fn classify_latest(level: Option<f64>, thresholds: &Thresholds) -> StationStatus {
    level
        .map(|l| classify_level(l, thresholds))
        .unwrap_or(StationStatus::Normal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RainfallIntensity {
    Low,
    Medium,
    High,
}

impl RainfallIntensity {
    pub fn classify(total_mm: f64) -> Self {
        if total_mm > HIGH_RAINFALL_MM {
            Self::High
        } else if total_mm > MEDIUM_RAINFALL_MM {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Forecast risk, ordered low < medium < high < critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Sort rank of a stored label; unknown labels sort below `low`
    pub fn rank(label: &str) -> u8 {
        match Self::parse(label) {
            None => 0,
            Some(Self::Low) => 1,
            Some(Self::Medium) => 2,
            Some(Self::High) => 3,
            Some(Self::Critical) => 4,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert priority of a forecast label: critical=4, high=3, medium=2, else 1
pub fn forecast_priority(label: &str) -> i32 {
    match RiskLevel::parse(label) {
        Some(RiskLevel::Critical) => 4,
        Some(RiskLevel::High) => 3,
        Some(RiskLevel::Medium) => 2,
        Some(RiskLevel::Low) | None => 1,
    }
}

/// Tier shown on the alerts panel. There is no low tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Medium,
    High,
}

impl AlertType {
    pub fn from_priority(max_priority: i32) -> Self {
        if max_priority >= HIGH_ALERT_PRIORITY {
            Self::High
        } else {
            Self::Medium
        }
    }
}
