use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use vita_types::{HealthInsights, WIDGET_URI};

use super::{
    input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput, WidgetBinding,
};

/// Hands an assistant-authored dashboard payload to the widget.
///
/// No backend call: the payload is validated and echoed back as structured
/// content.
pub struct RenderInsightsTool;

#[async_trait]
impl ToolHandler for RenderInsightsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "render_health_insights",
            title: Some("Render Health Insights"),
            description: "IMPORTANT: You MUST call this tool as the final step after answering any health question. It renders a visual health dashboard for the user. After calling data tools (health summary, glucose, vitals, behavior, meals, etc.) and forming your analysis, ALWAYS call this tool to display the results visually. Pass your synthesized insights, contributing factors, relevant metrics with sparklines, chart data, and actionable recommendations.",
            input_schema: input_schema::<HealthInsights>(),
            read_only: true,
            widget: Some(WidgetBinding {
                resource_uri: WIDGET_URI,
                invoking: None,
                invoked: None,
            }),
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let insights: HealthInsights = parse_params(arguments)?;
        info!(
            "MCP: Rendering dashboard ({} factors, {} charts)",
            insights.factors.len(),
            insights.charts.len()
        );
        let structured = serde_json::to_value(&insights).map_err(ToolError::Encode)?;
        Ok(ToolOutput::text(format!(
            "Health dashboard rendered for: \"{}\"",
            insights.question
        ))
        .with_structured(structured))
    }
}
