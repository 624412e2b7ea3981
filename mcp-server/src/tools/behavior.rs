use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{BehaviorResponse, DateRangeParams};

use super::format::fixed;
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/behavioral";

pub struct BehaviorTool {
    backend: Arc<dyn HealthBackend>,
}

impl BehaviorTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[derive(Default)]
struct CategoryStats {
    count: usize,
    total_minutes: f64,
    max_debt: f64,
}

#[async_trait]
impl ToolHandler for BehaviorTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_behavior",
            title: None,
            description: "Get behavioral events: screen time, app usage, dopamine debt scores. Use for digital wellness and behavior-health correlations.",
            input_schema: input_schema::<DateRangeParams>(),
            read_only: false,
            widget: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: DateRangeParams = parse_params(arguments)?;
        info!(
            "MCP: Querying behavior {} - {}",
            params.start_date, params.end_date
        );
        let data = self
            .backend
            .fetch(
                PATH,
                &[("start_date", params.start_date), ("end_date", params.end_date)],
            )
            .await?;

        let response: BehaviorResponse = decode(&data)?;
        if response.events.is_empty() {
            return Ok(ToolOutput::text(
                "No behavioral events found for this period.",
            ));
        }
        Ok(ToolOutput::text(render(&response)))
    }
}

fn render(response: &BehaviorResponse) -> String {
    let mut categories: Vec<(&str, CategoryStats)> = Vec::new();
    for event in &response.events {
        let category = event.category.as_deref().unwrap_or("null");
        let index = match categories.iter().position(|(c, _)| *c == category) {
            Some(index) => index,
            None => {
                categories.push((category, CategoryStats::default()));
                categories.len() - 1
            }
        };
        let stats = &mut categories[index].1;
        stats.count += 1;
        stats.total_minutes += event.duration.unwrap_or(0.0) / 60.0;
        if let Some(debt) = event.dopamine_debt_score {
            stats.max_debt = stats.max_debt.max(debt);
        }
    }

    let mut lines = vec![
        format!("## Behavioral Summary ({} events)", response.events.len()),
        String::new(),
    ];
    for (category, stats) in categories {
        lines.push(format!("### {}", category));
        lines.push(format!("- **Events**: {}", stats.count));
        lines.push(format!("- **Total Time**: {} min", fixed(stats.total_minutes, 0)));
        if stats.max_debt > 0.0 {
            lines.push(format!(
                "- **Max Dopamine Debt**: {}/100",
                fixed(stats.max_debt, 0)
            ));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
