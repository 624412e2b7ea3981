use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{DateRangeParams, EnvironmentResponse};

use super::format::or_null;
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/environmental";

pub struct EnvironmentTool {
    backend: Arc<dyn HealthBackend>,
}

impl EnvironmentTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for EnvironmentTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_environment",
            title: None,
            description: "Get environmental conditions: temperature, humidity, AQI, UV index, pollen. Use for environment-health correlations.",
            input_schema: input_schema::<DateRangeParams>(),
            read_only: false,
            widget: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: DateRangeParams = parse_params(arguments)?;
        info!(
            "MCP: Querying environment {} - {}",
            params.start_date, params.end_date
        );
        let data = self
            .backend
            .fetch(
                PATH,
                &[("start_date", params.start_date), ("end_date", params.end_date)],
            )
            .await?;

        let response: EnvironmentResponse = decode(&data)?;
        if response.conditions.is_empty() {
            return Ok(ToolOutput::text(
                "No environmental data found for this period.",
            ));
        }
        Ok(ToolOutput::text(render(&response)))
    }
}

fn render(response: &EnvironmentResponse) -> String {
    let latest = &response.conditions[0];
    let mut lines = vec![
        format!(
            "## Environmental Conditions ({} readings)",
            response.conditions.len()
        ),
        String::new(),
        "### Current".to_string(),
        format!(
            "- **Temperature**: {}\u{00B0}C",
            or_null(&latest.temperature_celsius)
        ),
        format!("- **Humidity**: {}%", or_null(&latest.humidity)),
        format!("- **AQI**: {}", or_null(&latest.aqi_us)),
        format!("- **UV Index**: {}", or_null(&latest.uv_index)),
        format!("- **Pollen**: {}/12", or_null(&latest.pollen_index)),
        format!("- **Condition**: {}", or_null(&latest.condition)),
    ];
    let risks = latest.risks();
    if !risks.is_empty() {
        lines.push(String::new());
        lines.push(format!("### Health Risks: {}", risks.join(", ")));
    }
    lines.join("\n")
}
