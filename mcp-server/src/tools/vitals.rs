use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{VitalsParams, VitalsResponse};

use super::format::{fixed, group_by, mean, or_null};
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/vitals";

pub struct VitalsTool {
    backend: Arc<dyn HealthBackend>,
}

impl VitalsTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for VitalsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_vitals",
            title: None,
            description: "Get physiological vitals: HRV, heart rate, sleep, SpO2, steps, weight. Supports filtering by metric type. After gathering data, always call render_health_insights to display a visual dashboard.",
            input_schema: input_schema::<VitalsParams>(),
            read_only: true,
            widget: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: VitalsParams = parse_params(arguments)?;
        info!(
            "MCP: Querying vitals {} - {} (metric: {:?})",
            params.start_date, params.end_date, params.metric_type
        );
        let data = self
            .backend
            .fetch(
                PATH,
                &[
                    ("start_date", params.start_date),
                    ("end_date", params.end_date),
                    ("metric_type", params.metric_type.unwrap_or_default()),
                ],
            )
            .await?;

        let response: VitalsResponse = decode(&data)?;
        if response.samples.is_empty() {
            return Ok(ToolOutput::text("No vitals data found for this period."));
        }
        Ok(ToolOutput::text(render(&response)).with_structured(data))
    }
}

fn render(response: &VitalsResponse) -> String {
    let mut lines = vec![
        format!("## Vitals ({} samples)", response.samples.len()),
        String::new(),
    ];
    let groups = group_by(&response.samples, |s| {
        s.metric_type.as_deref().unwrap_or("null")
    });
    for (metric, group) in groups {
        let values: Vec<f64> = group.iter().filter_map(|s| s.value).collect();
        let average = (!values.is_empty()).then(|| fixed(mean(&values), 1));
        let latest = group[0];
        let unit = or_null(&latest.unit);
        lines.push(format!("### {}", metric));
        lines.push(format!(
            "- **Latest**: {} {} ({})",
            or_null(&latest.value),
            unit,
            or_null(&latest.timestamp)
        ));
        lines.push(format!("- **Average**: {} {}", or_null(&average), unit));
        lines.push(format!("- **Samples**: {}", group.len()));
        lines.push(String::new());
    }
    lines.join("\n")
}
