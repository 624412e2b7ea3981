//! Integration tests for tool and resource calls over the MCP endpoint.

mod common;

use axum::http::StatusCode;
use common::{call_tool, create_test_app, initialize, post};
use serde_json::json;

#[tokio::test]
async fn test_tools_list() {
    let app = create_test_app();
    let id = initialize(&app).await;
    let reply = post(
        &app,
        Some(&id),
        json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }),
    )
    .await;

    let tools = reply.body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 10);
    let summary = tools
        .iter()
        .find(|t| t["name"] == "get_health_summary")
        .unwrap();
    assert_eq!(
        summary["_meta"]["openai/outputTemplate"],
        "ui://widget/vita-dashboard.html"
    );
    let vitals = tools.iter().find(|t| t["name"] == "query_vitals").unwrap();
    assert_eq!(
        vitals["inputSchema"]["required"],
        json!(["start_date", "end_date"])
    );
}

#[tokio::test]
async fn test_missing_required_argument_skips_backend() {
    let app = create_test_app();
    let id = initialize(&app).await;
    let reply = call_tool(
        &app,
        &id,
        "query_vitals",
        json!({ "end_date": "2026-03-02T00:00:00Z" }),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["error"]["code"], -32602);
    assert!(reply.body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("start_date"));
    assert_eq!(app.backend.calls(), 0);
}

#[tokio::test]
async fn test_upstream_error_becomes_tool_error() {
    let app = create_test_app();
    app.backend.fail("/api/v1/query/glucose", 503, "overloaded");
    let id = initialize(&app).await;
    let reply = call_tool(
        &app,
        &id,
        "query_glucose",
        json!({ "start_date": "2026-03-01T00:00:00Z", "end_date": "2026-03-02T00:00:00Z" }),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.get("error").is_none());
    let result = &reply.body["result"];
    assert_eq!(result["isError"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("503"));
    assert!(text.contains("overloaded"));

    // The session survives the failure
    assert!(app.sessions.contains(&id));
    assert_eq!(app.backend.calls(), 1);
}

#[tokio::test]
async fn test_health_summary_structured_content() {
    let app = create_test_app();
    app.backend.respond(
        "/api/v1/query/health-summary",
        json!({
            "healthScore": 82,
            "healthLabel": "Great",
            "glucose": 98,
            "hrv": 55,
            "heartRate": 58,
            "sleepHours": 8,
            "steps": 9100,
            "dopamineDebt": null,
            "skinScore": null,
            "topPatterns": []
        }),
    );
    let id = initialize(&app).await;
    let reply = call_tool(&app, &id, "get_health_summary", json!({})).await;

    let result = &reply.body["result"];
    assert!(result.get("isError").is_none());
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("## Health Score: 82/100 (Great)"));
    assert_eq!(result["structuredContent"]["healthScore"], 82);
}

#[tokio::test]
async fn test_render_insights_needs_no_backend() {
    let app = create_test_app();
    let id = initialize(&app).await;
    let reply = call_tool(
        &app,
        &id,
        "render_health_insights",
        json!({
            "question": "How did I sleep?",
            "summary": "Well, mostly.",
            "factors": [],
            "charts": []
        }),
    )
    .await;

    let result = &reply.body["result"];
    assert_eq!(
        result["content"][0]["text"],
        "Health dashboard rendered for: \"How did I sleep?\""
    );
    assert_eq!(result["structuredContent"]["summary"], "Well, mostly.");
    assert_eq!(app.backend.calls(), 0);
}

#[tokio::test]
async fn test_unknown_tool() {
    let app = create_test_app();
    let id = initialize(&app).await;
    let reply = call_tool(&app, &id, "query_mood", json!({})).await;
    assert_eq!(reply.body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_widget_resource() {
    let app = create_test_app();
    let id = initialize(&app).await;

    let reply = post(
        &app,
        Some(&id),
        json!({ "jsonrpc": "2.0", "id": 1, "method": "resources/list" }),
    )
    .await;
    let resources = reply.body["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["mimeType"], "text/html;profile=mcp-app");

    let reply = post(
        &app,
        Some(&id),
        json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "resources/read",
            "params": { "uri": "ui://widget/vita-dashboard.html" }
        }),
    )
    .await;
    let contents = &reply.body["result"]["contents"][0];
    assert!(contents["text"].as_str().unwrap().contains("<html"));

    let reply = post(
        &app,
        Some(&id),
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "resources/read",
            "params": { "uri": "ui://widget/other.html" }
        }),
    )
    .await;
    assert_eq!(reply.body["error"]["code"], -32002);
}

#[tokio::test]
async fn test_sessions_share_backend() {
    let app = create_test_app();
    app.backend.respond(
        "/api/v1/query/causal-patterns",
        json!({ "patterns": [] }),
    );
    let a = initialize(&app).await;
    let b = initialize(&app).await;

    for id in [&a, &b] {
        let reply = call_tool(&app, id, "query_causal_patterns", json!({})).await;
        assert_eq!(
            reply.body["result"]["content"][0]["text"],
            "No significant causal patterns discovered yet. More data observations are needed."
        );
    }
    assert_eq!(app.backend.calls(), 2);
}
