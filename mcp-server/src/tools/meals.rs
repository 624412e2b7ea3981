use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use vita_types::{DateRangeParams, MealsResponse};

use super::format::{fixed, or_null};
use super::{
    decode, input_schema, parse_params, ToolDescriptor, ToolError, ToolHandler, ToolOutput,
};
use crate::client::HealthBackend;

const PATH: &str = "/api/v1/query/meals";

pub struct MealsTool {
    backend: Arc<dyn HealthBackend>,
}

impl MealsTool {
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ToolHandler for MealsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "query_meals",
            title: None,
            description: "Get meal events with ingredients, glycemic load, and cooking method. Use for nutrition analysis and glucose-meal correlations.",
            input_schema: input_schema::<DateRangeParams>(),
            read_only: false,
            widget: None,
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError> {
        let params: DateRangeParams = parse_params(arguments)?;
        info!("MCP: Querying meals {} - {}", params.start_date, params.end_date);
        let data = self
            .backend
            .fetch(
                PATH,
                &[("start_date", params.start_date), ("end_date", params.end_date)],
            )
            .await?;

        let response: MealsResponse = decode(&data)?;
        if response.meals.is_empty() {
            return Ok(ToolOutput::text("No meals found for this period."));
        }
        Ok(ToolOutput::text(render(&response)))
    }
}

fn render(response: &MealsResponse) -> String {
    let mut lines = vec![
        format!("## Meals ({} events)", response.meals.len()),
        String::new(),
    ];
    for meal in &response.meals {
        let ingredients = meal
            .ingredient_list()
            .into_iter()
            .map(|i| or_null(&i.name))
            .collect::<Vec<_>>()
            .join(", ");

        lines.push(format!("### {}", or_null(&meal.timestamp)));
        lines.push(format!(
            "- **Source**: {} ({})",
            or_null(&meal.source),
            or_null(&meal.event_type)
        ));
        lines.push(format!(
            "- **Ingredients**: {}",
            if ingredients.is_empty() { "N/A" } else { ingredients.as_str() }
        ));
        if let Some(method) = meal.cooking_method.as_deref().filter(|m| !m.is_empty()) {
            lines.push(format!("- **Cooking**: {}", method));
        }
        if let Some(load) = meal.estimated_glycemic_load {
            lines.push(format!("- **Glycemic Load**: {}", fixed(load, 1)));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
