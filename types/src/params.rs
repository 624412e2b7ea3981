//! Tool input shapes.
//!
//! Each struct is the argument object of one tool. Required fields and
//! defaults are enforced by serde. With the `validation` feature the structs
//! also derive `garde` rules and a JSON Schema, so the advertised schema is
//! generated from the same definition that is validated.

use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use garde::Validate;
#[cfg(feature = "validation")]
use schemars::JsonSchema;

fn default_glucose_limit() -> f64 {
    100.0
}

fn default_window_hours() -> f64 {
    6.0
}

fn default_min_strength() -> f64 {
    0.6
}

fn default_pattern_limit() -> f64 {
    20.0
}

/// Arguments for tools that query a mandatory date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate, JsonSchema))]
pub struct DateRangeParams {
    /// ISO datetime start
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub start_date: String,
    /// ISO datetime end
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub end_date: String,
}

/// Arguments for `query_glucose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate, JsonSchema))]
pub struct GlucoseParams {
    /// ISO datetime start
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub start_date: String,
    /// ISO datetime end
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub end_date: String,
    /// Max readings to return
    #[serde(default = "default_glucose_limit")]
    #[cfg_attr(feature = "validation", garde(skip))]
    pub limit: f64,
}

/// Arguments for `query_vitals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate, JsonSchema))]
pub struct VitalsParams {
    /// Filter by metric: hrv_sdnn, heart_rate, resting_hr, sleep_analysis, blood_oxygen, respiratory_rate, active_energy, step_count, body_weight
    #[serde(default)]
    #[cfg_attr(feature = "validation", garde(skip))]
    pub metric_type: Option<String>,
    /// ISO datetime start
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub start_date: String,
    /// ISO datetime end
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub end_date: String,
}

/// Arguments for `query_skin`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate, JsonSchema))]
#[cfg_attr(feature = "validation", garde(allow_unvalidated))]
pub struct SkinParams {
    /// ISO datetime start
    #[serde(default)]
    pub start_date: Option<String>,
    /// ISO datetime end
    #[serde(default)]
    pub end_date: Option<String>,
    /// If true, return only the most recent analysis
    #[serde(default)]
    pub latest_only: bool,
}

/// Arguments for `query_causal_graph`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate, JsonSchema))]
#[cfg_attr(feature = "validation", garde(allow_unvalidated))]
pub struct CausalGraphParams {
    /// Filter by edge type: meal_to_glucose, glucose_to_hrv, glucose_to_energy, behavior_to_hrv, meal_to_sleep, behavior_to_sleep, environment_to_hrv, environment_to_sleep, etc.
    #[serde(default)]
    pub edge_type: Option<String>,
    /// ISO datetime start
    #[serde(default)]
    pub start_date: Option<String>,
    /// ISO datetime end
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Arguments for `query_causal_patterns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate, JsonSchema))]
#[cfg_attr(feature = "validation", garde(allow_unvalidated))]
pub struct CausalPatternsParams {
    /// Minimum pattern strength (0-1)
    #[serde(default = "default_min_strength")]
    pub min_strength: f64,
    /// Max patterns to return
    #[serde(default = "default_pattern_limit")]
    pub limit: f64,
}

impl Default for CausalPatternsParams {
    fn default() -> Self {
        Self {
            min_strength: default_min_strength(),
            limit: default_pattern_limit(),
        }
    }
}

/// Arguments for `get_health_summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate, JsonSchema))]
#[cfg_attr(feature = "validation", garde(allow_unvalidated))]
pub struct HealthSummaryParams {
    /// Hours of data to consider
    #[serde(default = "default_window_hours")]
    pub window_hours: f64,
}

impl Default for HealthSummaryParams {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
        }
    }
}
