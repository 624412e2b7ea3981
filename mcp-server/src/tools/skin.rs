use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{SkinParams, SkinResponse};

use super::format::or_null;
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/skin";

pub struct SkinTool {
    backend: Arc<dyn HealthBackend>,
}

impl SkinTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for SkinTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_skin",
            title: None,
            description: "Get skin analysis results: overall score, condition scores (acne, dark circles, redness, oiliness, pores, wrinkles, eye bags). Use for skin health tracking and cross-domain analysis.",
            input_schema: input_schema::<SkinParams>(),
            read_only: true,
            widget: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: SkinParams = parse_params(arguments)?;
        info!("MCP: Querying skin (latest_only: {})", params.latest_only);
        let latest_only = if params.latest_only {
            "true".to_string()
        } else {
            String::new()
        };
        let data = self
            .backend
            .fetch(
                PATH,
                &[
                    ("start_date", params.start_date.unwrap_or_default()),
                    ("end_date", params.end_date.unwrap_or_default()),
                    ("latest_only", latest_only),
                ],
            )
            .await?;

        let response: SkinResponse = decode(&data)?;
        if response.analyses.is_empty() {
            return Ok(ToolOutput::text("No skin analysis data found."));
        }
        Ok(ToolOutput::text(render(&response)).with_structured(data))
    }
}

fn render(response: &SkinResponse) -> String {
    let mut lines = vec![
        format!("## Skin Analysis ({} scans)", response.analyses.len()),
        String::new(),
    ];
    for scan in &response.analyses {
        lines.push(format!("### Scan: {}", or_null(&scan.timestamp)));
        lines.push(format!(
            "- **Overall Score**: {}/100",
            or_null(&scan.overall_score)
        ));
        lines.push(format!("- **Source**: {}", or_null(&scan.api_source)));
        let conditions = scan.conditions();
        if !conditions.is_empty() {
            lines.push("- **Conditions**:".to_string());
            for condition in &conditions {
                lines.push(format!(
                    "  - {}: {}/100 ({})",
                    or_null(&condition.kind),
                    or_null(&condition.ui_score),
                    condition.severity_label()
                ));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
