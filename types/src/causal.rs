//! Causal graph responses from the worker API.

use serde::{Deserialize, Serialize};

/// Response of `/api/v1/query/causal-graph`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalGraphResponse {
    pub edges: Vec<CausalEdge>,
}

/// A directed edge between two health observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalEdge {
    #[serde(default)]
    pub edge_type: Option<String>,
    #[serde(rename = "sourceNodeID", default)]
    pub source_node_id: Option<String>,
    #[serde(rename = "targetNodeID", default)]
    pub target_node_id: Option<String>,
    #[serde(default)]
    pub causal_strength: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub temporal_offset_seconds: Option<f64>,
}

impl CausalEdge {
    /// Strong edges have both high strength and high confidence.
    pub fn is_strong(&self) -> bool {
        self.causal_strength.is_some_and(|s| s >= 0.7)
            && self.confidence.is_some_and(|c| c >= 0.6)
    }
}

/// Response of `/api/v1/query/causal-patterns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalPatternsResponse {
    pub patterns: Vec<CausalPattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalPattern {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub strength: Option<f64>,
    #[serde(default)]
    pub observation_count: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
