//! Dashboard payload passed to `render_health_insights`.
//!
//! The assistant synthesizes this structure after querying the data tools;
//! the server validates it and hands it unchanged to the dashboard widget.

use serde::{Deserialize, Serialize};

#[cfg(feature = "validation")]
use garde::Validate;
#[cfg(feature = "validation")]
use schemars::JsonSchema;

/// Arguments for `render_health_insights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate, JsonSchema))]
#[cfg_attr(feature = "validation", garde(allow_unvalidated))]
pub struct HealthInsights {
    /// The user's original health question
    pub question: String,
    /// Narrative insight answering the question
    pub summary: String,
    /// Contributing health factors
    pub factors: Vec<InsightFactor>,
    /// Charts to render in the dashboard
    pub charts: Vec<InsightChart>,
    /// Key metric cards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<InsightMetric>>,
    /// Sleep breakdown data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<SleepBreakdown>,
    /// Actionable health recommendations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// A contributing health factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
pub struct InsightFactor {
    pub name: String,
    pub detail: String,
    pub impact: Impact,
    /// Emoji icon
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Sparkline,
    Ring,
    Gauge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
pub struct InsightChart {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: String,
    pub data: Vec<ChartPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum DeltaStatus {
    Good,
    Warn,
    Bad,
}

/// A key metric card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
pub struct InsightMetric {
    pub label: String,
    pub value: String,
    pub unit: String,
    /// Emoji icon
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_status: Option<DeltaStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparkline: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
pub struct SleepBreakdown {
    pub duration: String,
    pub bedtime: String,
    pub waketime: String,
    pub stages: Vec<SleepStage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
pub struct SleepStage {
    pub label: String,
    pub percent: f64,
}

/// An actionable recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(JsonSchema))]
pub struct Recommendation {
    /// Emoji icon
    pub icon: String,
    pub title: String,
    pub description: String,
}
