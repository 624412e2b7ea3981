use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{CausalGraphParams, CausalGraphResponse};

use super::format::{group_by, number, or_null, percent};
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/causal-graph";
const EDGES_PER_TYPE: usize = 10;

pub struct CausalGraphTool {
    backend: Arc<dyn HealthBackend>,
}

impl CausalGraphTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for CausalGraphTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_causal_graph",
            title: None,
            description: "Get causal graph edges showing relationships between health metrics (meal\u{2192}glucose, glucose\u{2192}HRV, behavior\u{2192}sleep, etc). Use for understanding health interconnections.",
            input_schema: input_schema::<CausalGraphParams>(),
            read_only: false,
            widget: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: CausalGraphParams = parse_params(arguments)?;
        info!("MCP: Querying causal graph (edge_type: {:?})", params.edge_type);
        let data = self
            .backend
            .fetch(
                PATH,
                &[
                    ("edge_type", params.edge_type.unwrap_or_default()),
                    ("start_date", params.start_date.unwrap_or_default()),
                    ("end_date", params.end_date.unwrap_or_default()),
                ],
            )
            .await?;

        let response: CausalGraphResponse = decode(&data)?;
        if response.edges.is_empty() {
            return Ok(ToolOutput::text(
                "No causal graph edges found for this query.",
            ));
        }
        Ok(ToolOutput::text(render(&response)))
    }
}

fn render(response: &CausalGraphResponse) -> String {
    let mut lines = vec![
        format!("## Causal Graph ({} edges)", response.edges.len()),
        String::new(),
    ];
    let groups = group_by(&response.edges, |e| {
        e.edge_type.as_deref().unwrap_or("null")
    });
    for (edge_type, group) in groups {
        lines.push(format!("### {} ({} edges)", edge_type, group.len()));
        for edge in group.iter().take(EDGES_PER_TYPE) {
            let offset_min = edge
                .temporal_offset_seconds
                .map(|secs| number((secs / 60.0).round()));
            lines.push(format!(
                "- {} \u{2192} {}: strength {}%, confidence {}%, offset {}min{}",
                or_null(&edge.source_node_id),
                or_null(&edge.target_node_id),
                or_null(&edge.causal_strength.map(percent)),
                or_null(&edge.confidence.map(percent)),
                or_null(&offset_min),
                if edge.is_strong() { " **STRONG**" } else { "" }
            ));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::tools::test_support::RecordingBackend;

    fn edge(edge_type: &str, strength: f64, confidence: f64) -> Value {
        json!({
            "edgeType": edge_type,
            "sourceNodeID": "meal-1",
            "targetNodeID": "glucose-7",
            "causalStrength": strength,
            "confidence": confidence,
            "temporalOffsetSeconds": 2730
        })
    }

    #[tokio::test]
    async fn test_groups_and_flags_strong_edges() {
        let backend = RecordingBackend::new(json!({
            "edges": [
                edge("meal_to_glucose", 0.8, 0.65),
                edge("glucose_to_hrv", 0.5, 0.9),
                edge("meal_to_glucose", 0.7, 0.5)
            ]
        }));
        let output = CausalGraphTool::new(backend.clone())
            .call(json!({"edge_type": "meal_to_glucose"}))
            .await
            .unwrap();

        assert!(output.text.starts_with("## Causal Graph (3 edges)"));
        assert!(output.text.contains("### meal_to_glucose (2 edges)"));
        assert!(output.text.contains(
            "- meal-1 \u{2192} glucose-7: strength 80%, confidence 65%, offset 46min **STRONG**"
        ));
        assert!(output.text.contains(
            "- meal-1 \u{2192} glucose-7: strength 70%, confidence 50%, offset 46min\n"
        ));
        assert!(output.text.contains("### glucose_to_hrv (1 edges)"));

        let (_, params) = backend.last_request();
        assert_eq!(
            params,
            vec![("edge_type".to_string(), "meal_to_glucose".to_string())]
        );
    }

    #[tokio::test]
    async fn test_caps_edges_per_type() {
        let edges: Vec<Value> = (0..15).map(|_| edge("glucose_to_energy", 0.3, 0.3)).collect();
        let output = CausalGraphTool::new(RecordingBackend::new(json!({ "edges": edges })))
            .call(json!({}))
            .await
            .unwrap();
        assert!(output.text.contains("### glucose_to_energy (15 edges)"));
        assert_eq!(output.text.matches("- meal-1").count(), EDGES_PER_TYPE);
    }

    #[tokio::test]
    async fn test_null_edge_fields() {
        let backend = RecordingBackend::new(json!({
            "edges": [{
                "edgeType": "behavior_to_sleep",
                "sourceNodeID": "screen-3",
                "targetNodeID": null,
                "causalStrength": 0.9,
                "confidence": null,
                "temporalOffsetSeconds": -10
            }]
        }));
        let output = CausalGraphTool::new(backend).call(json!({})).await.unwrap();
        assert!(output.text.contains(
            "- screen-3 \u{2192} null: strength 90%, confidence null%, offset 0min\n"
        ));
        assert!(!output.text.contains("STRONG"));
    }
}
