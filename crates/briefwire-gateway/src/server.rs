//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use briefwire_core::BriefwireConfig;
use briefwire_schedule::RefreshRunner;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub config: BriefwireConfig,
    pub runner: Arc<RefreshRunner>,
    pub start_time: std::time::Instant,
}

/// Trigger auth middleware — validates `Authorization: Bearer <secret>`.
async fn require_secret(
    State(state): State<Arc<AppState>>,
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    // No secret configured: open trigger (development mode)
    let expected = state.config.gateway.trigger_secret.as_str();
    if expected.is_empty() {
        return next.run(req).await;
    }

    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if from_header == format!("Bearer {expected}") {
        return next.run(req).await;
    }

    axum::response::Response::builder()
        .status(axum::http::StatusCode::UNAUTHORIZED)
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from(
            serde_json::json!({"error": "Unauthorized"}).to_string(),
        ))
        .unwrap()
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    // Protected routes — require the trigger secret
    let protected = Router::new()
        .route("/api/cron", get(super::routes::trigger_refresh))
        .route_layer(axum::middleware::from_fn_with_state(
            shared.clone(),
            require_secret,
        ));

    // Public routes — no auth
    let public = Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/api/topics", get(super::routes::list_topics))
        .route("/api/v1/bulk", post(super::routes::bulk_generate));

    protected
        .merge(public)
        .layer({
            let cors = CorsLayer::new()
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
                .max_age(std::time::Duration::from_secs(3600));

            // Restrict CORS origins in production via env var
            // Example: BRIEFWIRE_CORS_ORIGINS=https://briefwire.example.com
            if let Ok(origins_str) = std::env::var("BRIEFWIRE_CORS_ORIGINS") {
                let origins: Vec<_> = origins_str
                    .split(',')
                    .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                    .collect();
                cors.allow_origin(origins)
            } else {
                // Development fallback — allow all origins
                cors.allow_origin(Any)
            }
        })
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(config: BriefwireConfig) -> anyhow::Result<()> {
    let state = AppState {
        runner: Arc::new(RefreshRunner::new(config.clone())),
        config,
        start_time: std::time::Instant::now(),
    };

    let addr = format!(
        "{}:{}",
        state.config.gateway.host, state.config.gateway.port
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_config(name: &str, secret: &str) -> BriefwireConfig {
        let dir = std::env::temp_dir().join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("topics.json"), r#"{"topics": []}"#).unwrap();
        std::fs::write(dir.join("schedules.json"), r#"{"schedules": []}"#).unwrap();
        std::fs::write(dir.join("instructions.md"), "Always cite sources.\n").unwrap();
        let mut config = BriefwireConfig {
            data_dir: dir.to_string_lossy().into_owned(),
            ..BriefwireConfig::default()
        };
        config.gateway.trigger_secret = secret.to_string();
        config
    }

    fn test_router(config: BriefwireConfig) -> Router {
        build_router(AppState {
            runner: Arc::new(RefreshRunner::new(config.clone())),
            config,
            start_time: std::time::Instant::now(),
        })
    }

    #[tokio::test]
    async fn trigger_without_secret_is_rejected() {
        let config = test_config("briefwire-test-gw-auth-missing", "s3cret");
        let app = test_router(config.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cron")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Unauthorized");
        std::fs::remove_dir_all(config.resolve_data_dir()).ok();
    }

    #[tokio::test]
    async fn trigger_with_wrong_secret_is_rejected() {
        let config = test_config("briefwire-test-gw-auth-wrong", "s3cret");
        let app = test_router(config.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cron")
                    .header("Authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        std::fs::remove_dir_all(config.resolve_data_dir()).ok();
    }

    #[tokio::test]
    async fn trigger_with_bearer_secret_runs() {
        let config = test_config("briefwire-test-gw-auth-ok", "s3cret");
        let app = test_router(config.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cron")
                    .header("Authorization", "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        std::fs::remove_dir_all(config.resolve_data_dir()).ok();
    }

    #[tokio::test]
    async fn empty_secret_leaves_trigger_open() {
        let config = test_config("briefwire-test-gw-auth-open", "");
        let app = test_router(config.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cron")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        std::fs::remove_dir_all(config.resolve_data_dir()).ok();
    }

    #[tokio::test]
    async fn health_is_public() {
        let config = test_config("briefwire-test-gw-health", "s3cret");
        let app = test_router(config.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        std::fs::remove_dir_all(config.resolve_data_dir()).ok();
    }
}
