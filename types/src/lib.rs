//! Shared types for the VITA health MCP server.
//!
//! This crate contains the tool input shapes, the response models returned by
//! the VITA worker API, and the payload rendered by the dashboard widget.

/// Default port for the MCP HTTP listener.
pub const DEFAULT_PORT: u16 = 3000;

/// Default base URL of the VITA analytics worker.
pub const DEFAULT_WORKER_URL: &str = "https://vita-cloud.workers.dev";

/// Default path of the MCP Streamable HTTP endpoint.
pub const DEFAULT_MCP_PATH: &str = "/mcp";

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "vita-mcp";

/// Resource URI of the dashboard widget bundle.
pub const WIDGET_URI: &str = "ui://widget/vita-dashboard.html";

pub mod causal;
pub mod insights;
pub mod lifestyle;
pub mod metrics;
pub mod params;

pub use causal::{CausalEdge, CausalGraphResponse, CausalPattern, CausalPatternsResponse};
pub use insights::{
    ChartKind, ChartPoint, DeltaStatus, HealthInsights, Impact, InsightChart, InsightFactor,
    InsightMetric, Recommendation, SleepBreakdown, SleepStage,
};
pub use lifestyle::{
    BehaviorEvent, BehaviorResponse, EnvironmentCondition, EnvironmentResponse, Ingredient, Meal,
    MealsResponse, SkinAnalysis, SkinCondition, SkinResponse,
};
pub use metrics::{
    GlucoseReading, GlucoseResponse, HealthSummary, SummaryPattern, VitalSample, VitalsResponse,
};
pub use params::{
    CausalGraphParams, CausalPatternsParams, DateRangeParams, GlucoseParams, HealthSummaryParams,
    SkinParams, VitalsParams,
};
