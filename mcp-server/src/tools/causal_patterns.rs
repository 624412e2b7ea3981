use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{CausalPatternsParams, CausalPatternsResponse};

use super::format::{number, or_null, percent};
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/causal-patterns";

pub struct CausalPatternsTool {
    backend: Arc<dyn HealthBackend>,
}

impl CausalPatternsTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for CausalPatternsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_causal_patterns",
            title: None,
            description: "Get discovered causal patterns from the health graph. Patterns show relationships like 'high-GL meals \u{2192} glucose spikes \u{2192} poor sleep'. Only returns patterns with 5+ observations.",
            input_schema: input_schema::<CausalPatternsParams>(),
            read_only: false,
            widget: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: CausalPatternsParams = parse_params(arguments)?;
        info!(
            "MCP: Querying causal patterns (min_strength {}, limit {})",
            params.min_strength, params.limit
        );
        let data = self
            .backend
            .fetch(
                PATH,
                &[
                    ("min_strength", number(params.min_strength)),
                    ("limit", number(params.limit)),
                ],
            )
            .await?;

        let response: CausalPatternsResponse = decode(&data)?;
        if response.patterns.is_empty() {
            return Ok(ToolOutput::text(
                "No significant causal patterns discovered yet. More data observations are needed.",
            ));
        }
        Ok(ToolOutput::text(render(&response)))
    }
}

fn render(response: &CausalPatternsResponse) -> String {
    let mut lines = vec![
        format!("## Causal Patterns ({} discovered)", response.patterns.len()),
        String::new(),
    ];
    for pattern in &response.patterns {
        lines.push(format!("### {}", or_null(&pattern.pattern)));
        lines.push(format!(
            "- **Strength**: {}%",
            or_null(&pattern.strength.map(percent))
        ));
        lines.push(format!(
            "- **Observations**: {}",
            or_null(&pattern.observation_count)
        ));
        lines.push(format!("- **Last Updated**: {}", or_null(&pattern.updated_at)));
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::tools::test_support::RecordingBackend;

    #[tokio::test]
    async fn test_defaults_forwarded() {
        let backend = RecordingBackend::new(json!({
            "patterns": [{
                "pattern": "late meals \u{2192} low HRV",
                "strength": 0.82,
                "observationCount": 14,
                "updatedAt": "2026-02-28"
            }]
        }));
        let output = CausalPatternsTool::new(backend.clone())
            .call(json!({}))
            .await
            .unwrap();

        assert!(output.text.contains("### late meals \u{2192} low HRV"));
        assert!(output.text.contains("- **Strength**: 82%"));
        assert!(output.text.contains("- **Observations**: 14"));

        let (path, params) = backend.last_request();
        assert_eq!(path, PATH);
        assert_eq!(
            params,
            vec![
                ("min_strength".to_string(), "0.6".to_string()),
                ("limit".to_string(), "20".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_arguments_forwarded_as_given() {
        let backend = RecordingBackend::new(json!({"patterns": []}));
        let output = CausalPatternsTool::new(backend.clone())
            .call(json!({"min_strength": 0.25, "limit": 2500}))
            .await
            .unwrap();
        assert_eq!(
            output.text,
            "No significant causal patterns discovered yet. More data observations are needed."
        );
        assert_eq!(
            backend.last_request().1,
            vec![
                ("min_strength".to_string(), "0.25".to_string()),
                ("limit".to_string(), "2500".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_non_numeric_strength_rejected() {
        let backend = RecordingBackend::new(json!({"patterns": []}));
        let err = CausalPatternsTool::new(backend.clone())
            .call(json!({"min_strength": "high"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
        assert!(backend.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_null_pattern_fields() {
        let backend = RecordingBackend::new(json!({
            "patterns": [{"pattern": "screen time \u{2192} late sleep", "strength": null, "observationCount": 9, "updatedAt": null}]
        }));
        let output = CausalPatternsTool::new(backend).call(json!({})).await.unwrap();
        assert!(output.text.contains("- **Strength**: null%"));
        assert!(output.text.contains("- **Observations**: 9"));
        assert!(output.text.contains("- **Last Updated**: null"));
    }
}
