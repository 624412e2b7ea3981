//! Tool registry.
//!
//! The catalog is fixed at process start. Every protocol-server instance
//! builds its own [`ToolRegistry`] whose handlers capture the shared
//! [`HealthBackend`], so the catalog content is identical across sessions.

use async_trait::async_trait;
use schemars::{generate::SchemaSettings, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::client::{HealthBackend, WorkerError};

mod behavior;
mod causal_graph;
mod causal_patterns;
mod environment;
mod format;
mod glucose;
mod health_summary;
mod meals;
mod render_insights;
mod skin;
mod vitals;

/// Errors produced by a tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments did not match the tool's input schema. Raised before any
    /// backend call is made.
    #[error("{0}")]
    InvalidParams(String),

    #[error("Tool {0} not found")]
    UnknownTool(String),

    /// The backend failed or returned something undecodable.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error("Failed to encode tool output: {0}")]
    Encode(serde_json::Error),
}

/// Presentation widget a tool renders into.
#[derive(Debug, Clone, Copy)]
pub struct WidgetBinding {
    pub resource_uri: &'static str,
    /// Status text shown while the tool runs.
    pub invoking: Option<&'static str>,
    /// Status text shown once the tool finished.
    pub invoked: Option<&'static str>,
}

/// Static description of a tool, advertised by `tools/list`.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub title: Option<&'static str>,
    pub description: &'static str,
    pub input_schema: Value,
    pub read_only: bool,
    pub widget: Option<WidgetBinding>,
}

impl ToolDescriptor {
    /// Encode as an MCP `Tool` object.
    pub fn to_json(&self) -> Value {
        let mut tool = json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        });
        if let Some(title) = self.title {
            tool["title"] = json!(title);
        }
        if self.read_only {
            tool["annotations"] = json!({ "readOnlyHint": true });
        }
        if let Some(widget) = &self.widget {
            let mut meta = Map::new();
            meta.insert("ui".into(), json!({ "resourceUri": widget.resource_uri }));
            meta.insert("openai/outputTemplate".into(), json!(widget.resource_uri));
            if let Some(invoking) = widget.invoking {
                meta.insert("openai/toolInvocation/invoking".into(), json!(invoking));
            }
            if let Some(invoked) = widget.invoked {
                meta.insert("openai/toolInvocation/invoked".into(), json!(invoked));
            }
            tool["_meta"] = Value::Object(meta);
        }
        tool
    }
}

/// Dual-format tool result: markdown for the assistant plus an optional
/// machine-readable payload for widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub structured: Option<Value>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: None,
        }
    }

    pub fn with_structured(mut self, structured: Value) -> Self {
        self.structured = Some(structured);
        self
    }

    /// Encode as an MCP `CallToolResult`.
    pub fn to_json(&self, is_error: bool) -> Value {
        let mut result = json!({
            "content": [{ "type": "text", "text": self.text }],
        });
        if let Some(structured) = &self.structured {
            result["structuredContent"] = structured.clone();
        }
        if is_error {
            result["isError"] = json!(true);
        }
        result
    }
}

/// An invocable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    /// Run the tool. `arguments` is the raw JSON object sent by the client.
    async fn call(&self, arguments: Value) -> Result<ToolOutput, ToolError>;
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

/// Ordered catalog of tools bound to one backend.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Build the full VITA catalog.
    pub fn new(backend: Arc<dyn HealthBackend>) -> Self {
        let mut registry = Self::empty();
        registry.register(health_summary::HealthSummaryTool::new(backend.clone()));
        registry.register(glucose::GlucoseTool::new(backend.clone()));
        registry.register(meals::MealsTool::new(backend.clone()));
        registry.register(vitals::VitalsTool::new(backend.clone()));
        registry.register(behavior::BehaviorTool::new(backend.clone()));
        registry.register(environment::EnvironmentTool::new(backend.clone()));
        registry.register(skin::SkinTool::new(backend.clone()));
        registry.register(causal_patterns::CausalPatternsTool::new(backend.clone()));
        registry.register(causal_graph::CausalGraphTool::new(backend));
        registry.register(render_insights::RenderInsightsTool);
        registry
    }

    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    /// Add a tool. Names are unique; a later registration with the same name
    /// replaces the earlier one.
    pub fn register(&mut self, handler: impl ToolHandler + 'static) {
        let descriptor = handler.descriptor();
        let entry = RegisteredTool {
            descriptor,
            handler: Arc::new(handler),
        };
        match self
            .tools
            .iter_mut()
            .find(|t| t.descriptor.name == entry.descriptor.name)
        {
            Some(existing) => *existing = entry,
            None => self.tools.push(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors().find(|d| d.name == name)
    }

    /// Invoke the named tool.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.descriptor.name == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        debug!("MCP: Calling tool {}", name);
        tool.handler.call(arguments).await
    }
}

/// Deserialize and validate tool arguments.
pub(crate) fn parse_params<P>(arguments: Value) -> Result<P, ToolError>
where
    P: DeserializeOwned + garde::Validate,
    P::Context: Default,
{
    let params: P =
        serde_json::from_value(arguments).map_err(|e| ToolError::InvalidParams(e.to_string()))?;
    params
        .validate()
        .map_err(|report| ToolError::InvalidParams(report.to_string()))?;
    Ok(params)
}

/// Decode a typed view of a worker response.
pub(crate) fn decode<T: DeserializeOwned>(data: &Value) -> Result<T, ToolError> {
    T::deserialize(data).map_err(|e| ToolError::Worker(WorkerError::UnexpectedShape(e)))
}

/// Input schema generated from the argument type, with nested types inlined.
pub(crate) fn input_schema<P: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator();
    let mut schema = generator.into_root_schema_for::<P>().to_value();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}
