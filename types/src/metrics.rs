//! Physiological metric responses from the worker API.
//!
//! Top-level collections are required. Fields inside a record may be null or
//! absent; the worker does not guarantee them.

use serde::{Deserialize, Serialize};

/// Response of `/api/v1/query/glucose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlucoseResponse {
    pub readings: Vec<GlucoseReading>,
}

/// A single CGM reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlucoseReading {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "glucoseMgDL", default)]
    pub glucose_mg_dl: Option<f64>,
    /// rising, stable or falling
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(rename = "energyState", default)]
    pub energy_state: Option<String>,
}

/// Response of `/api/v1/query/vitals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsResponse {
    pub samples: Vec<VitalSample>,
}

/// A single vital sign sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSample {
    #[serde(default)]
    pub metric_type: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response of `/api/v1/query/health-summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    #[serde(default)]
    pub health_score: Option<f64>,
    #[serde(default)]
    pub health_label: Option<String>,
    #[serde(default)]
    pub glucose: Option<f64>,
    #[serde(default)]
    pub hrv: Option<f64>,
    #[serde(default)]
    pub heart_rate: Option<f64>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub steps: Option<f64>,
    #[serde(default)]
    pub dopamine_debt: Option<f64>,
    #[serde(default)]
    pub skin_score: Option<f64>,
    #[serde(default)]
    pub top_patterns: Option<Vec<SummaryPattern>>,
}

/// A causal pattern highlighted in the health summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryPattern {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub strength: Option<f64>,
}
