//! Route handlers for the gateway API.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use briefwire_schedule::inputs;

use crate::server::AppState;

/// GET /health — basic health check.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "briefwire-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// GET /api/cron — evaluate schedules at the current instant and refresh
/// whatever is due. Protected by the trigger secret.
pub async fn trigger_refresh(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.runner.run_now().await {
        Ok(report) if report.due_count == 0 => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "No schedules to run at this time",
                "timestamp": report.timestamp,
            })),
        ),
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": format!("Processed {} schedules", report.due_count),
                "timestamp": report.timestamp,
                "results": report.outcomes,
            })),
        ),
        Err(e) => {
            tracing::warn!("⚠️  Refresh run failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Internal server error",
                    "message": e.to_string(),
                })),
            )
        }
    }
}

/// GET /api/topics — topic catalog with the latest brief per topic.
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let topics = match inputs::load_topics(&state.config.topics_path()) {
        Ok(topics) => topics,
        Err(e) => {
            tracing::warn!("⚠️  Failed to load topics: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Internal server error"})),
            );
        }
    };

    let store = state.runner.store();
    let enriched: Vec<serde_json::Value> = topics
        .iter()
        .map(|topic| {
            let mut value =
                serde_json::to_value(topic).unwrap_or(serde_json::Value::Null);
            if let Some(obj) = value.as_object_mut() {
                obj.insert(
                    "latest".to_string(),
                    serde_json::to_value(store.latest(&topic.id))
                        .unwrap_or(serde_json::Value::Null),
                );
                obj.insert(
                    "historyCount".to_string(),
                    serde_json::json!(store.count(&topic.id)),
                );
            }
            value
        })
        .collect();

    (StatusCode::OK, Json(serde_json::json!({"topics": enriched})))
}

/// POST /api/v1/bulk — development stand-in for a bulk generation backend.
/// Accepts the bulk request shape and answers every request with a
/// deterministic mock report.
pub async fn bulk_generate(
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let requests = match body.get("requests").and_then(|r| r.as_array()) {
        Some(requests) => requests,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Invalid request format. Expected { model, requests: array }",
                })),
            );
        }
    };

    let responses: Vec<serde_json::Value> = requests
        .iter()
        .map(|request| {
            let id = request.get("id").and_then(|i| i.as_str()).unwrap_or("");
            let topic = topic_from_messages(request.get("messages"));
            serde_json::json!({
                "id": id,
                "output": mock_report(&topic),
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({"responses": responses})),
    )
}

/// Pull the topic name out of a request's user message. The generation
/// client tags it with a `TOPIC_PROMPT:` line.
fn topic_from_messages(messages: Option<&serde_json::Value>) -> String {
    messages
        .and_then(|m| m.as_array())
        .and_then(|msgs| {
            msgs.iter().find(|m| {
                m.get("role").and_then(|r| r.as_str()) == Some("user")
            })
        })
        .and_then(|m| m.get("content").and_then(|c| c.as_str()))
        .and_then(|content| content.split("TOPIC_PROMPT: ").nth(1))
        .and_then(|rest| rest.lines().next())
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .unwrap_or("Unknown Topic")
        .to_string()
}

fn mock_report(topic: &str) -> String {
    serde_json::json!({
        "title": format!("{topic} — Intelligence Update"),
        "summary": format!(
            "Mock bulk synthesis for {} covering signals, funding motion, and policy shifts.",
            topic.to_lowercase()
        ),
        "markdown": format!(
            "## Signal Radar\n\n- {topic} activity is accelerating across research and deployment.\n- Watch for consolidation among the leading vendors.\n\n## Funding Flow\n\n- Capital continues to rotate into {topic} infrastructure plays.\n\n## Policy Watch\n\n- Regulators are drafting guidance that will shape {topic} adoption.\n\n## Action Playbook\n\n- Brief stakeholders on the near-term outlook for {topic}.\n- Re-evaluate vendor positioning next quarter.\n"
        ),
        "sources": [
            "https://example.com/reports/signal-radar",
            "https://example.com/reports/funding-flow",
            "https://example.com/reports/policy-watch",
        ],
    })
    .to_string()
}
