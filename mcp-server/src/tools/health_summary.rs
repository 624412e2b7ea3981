use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{HealthSummary, HealthSummaryParams, WIDGET_URI};

use super::format::{fixed, number, or_null, percent, thousands};
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
    WidgetBinding,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/health-summary";

pub struct HealthSummaryTool {
    backend: Arc<dyn HealthBackend>,
}

impl HealthSummaryTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for HealthSummaryTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_health_summary",
            title: Some("Health Summary"),
            description: "Get health score, latest vitals, and active causal patterns. Best starting point for understanding a user's current health state.",
            input_schema: input_schema::<HealthSummaryParams>(),
            read_only: true,
            widget: Some(WidgetBinding {
                resource_uri: WIDGET_URI,
                invoking: Some("Analyzing your health data\u{2026}"),
                invoked: Some("Here is your health dashboard"),
            }),
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: HealthSummaryParams = parse_params(arguments)?;
        info!("MCP: Health summary over {}h", params.window_hours);
        let data = self
            .backend
            .fetch(PATH, &[("window_hours", number(params.window_hours))])
            .await?;

        let summary: HealthSummary = decode(&data)?;
        Ok(ToolOutput::text(render(&summary)).with_structured(data))
    }
}

fn vital(label: &str, value: Option<String>) -> String {
    match value {
        Some(value) => format!("- **{}**: {}", label, value),
        None => format!("- **{}**: No data", label),
    }
}

fn render(summary: &HealthSummary) -> String {
    let mut lines = vec![
        format!(
            "## Health Score: {}/100 ({})",
            or_null(&summary.health_score),
            or_null(&summary.health_label)
        ),
        "### Current Vitals".to_string(),
        vital("Glucose", summary.glucose.map(|v| format!("{} mg/dL", v))),
        vital("HRV", summary.hrv.map(|v| format!("{} ms", v.round()))),
        vital("Heart Rate", summary.heart_rate.map(|v| format!("{} bpm", v))),
        vital("Sleep", summary.sleep_hours.map(|v| format!("{} hours", fixed(v, 1)))),
        vital("Steps", summary.steps.map(thousands)),
    ];
    if let Some(debt) = summary.dopamine_debt {
        lines.push(format!("- **Dopamine Debt**: {}/100", debt.round()));
    }
    if let Some(score) = summary.skin_score {
        lines.push(format!("- **Skin Score**: {}/100", score));
    }
    let patterns = summary.top_patterns.as_deref().unwrap_or_default();
    if !patterns.is_empty() {
        lines.push("### Active Causal Patterns".to_string());
        for pattern in patterns {
            lines.push(format!(
                "- {} (strength: {}%)",
                or_null(&pattern.pattern),
                or_null(&pattern.strength.map(percent))
            ));
        }
    }
    lines.join("\n")
}
