use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{GlucoseParams, GlucoseResponse};

use super::format::{fixed, mean, number, or_null};
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/glucose";
const RECENT_READINGS: usize = 20;

pub struct GlucoseTool {
    backend: Arc<dyn HealthBackend>,
}

impl GlucoseTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for GlucoseTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_glucose",
            title: None,
            description: "Get CGM glucose readings with trend (rising/stable/falling) and energy state. Use for glucose analysis, meal impact, and energy patterns.",
            input_schema: input_schema::<GlucoseParams>(),
            read_only: true,
            widget: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: GlucoseParams = parse_params(arguments)?;
        info!(
            "MCP: Querying glucose {} - {} (limit {})",
            params.start_date, params.end_date, params.limit
        );
        let data = self
            .backend
            .fetch(
                PATH,
                &[
                    ("start_date", params.start_date),
                    ("end_date", params.end_date),
                    ("limit", number(params.limit)),
                ],
            )
            .await?;

        let response: GlucoseResponse = decode(&data)?;
        if response.readings.is_empty() {
            return Ok(ToolOutput::text("No glucose readings found for this period."));
        }
        Ok(ToolOutput::text(render(&response)).with_structured(data))
    }
}

fn render(response: &GlucoseResponse) -> String {
    let readings = &response.readings;
    // Statistics cover the readings that carry a value
    let values: Vec<f64> = readings.iter().filter_map(|r| r.glucose_mg_dl).collect();
    let (average, min, max) = if values.is_empty() {
        (None, None, None)
    } else {
        (
            Some(fixed(mean(&values), 0)),
            values.iter().copied().reduce(f64::min),
            values.iter().copied().reduce(f64::max),
        )
    };

    let mut lines = vec![
        format!("## Glucose Readings ({} samples)", readings.len()),
        format!("- **Average**: {} mg/dL", or_null(&average)),
        format!("- **Range**: {}\u{2013}{} mg/dL", or_null(&min), or_null(&max)),
        String::new(),
        "### Recent Readings".to_string(),
    ];
    lines.extend(readings.iter().take(RECENT_READINGS).map(|r| {
        format!(
            "- {}: **{}** mg/dL ({}, {})",
            or_null(&r.timestamp),
            or_null(&r.glucose_mg_dl),
            or_null(&r.trend),
            or_null(&r.energy_state)
        )
    }));
    lines.join("\n")
}
