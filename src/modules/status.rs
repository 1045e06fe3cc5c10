use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use elibros_kernel::openapi::{json_response, object, operation, schema_ref};
use elibros_kernel::{InitCtx, Module};
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// Service version and backend reachability, for the UI's "try again"
/// banner.
pub struct StatusModule {
    state: AppState,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub service: &'static str,
    pub version: &'static str,
    pub backend: BackendStatus,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Up,
    Down,
}

#[async_trait]
impl Module for StatusModule {
    fn name(&self) -> &'static str {
        "status"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = %self.state.api.base_url(),
            "status module initialized"
        );
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.state.api.ping().await {
            tracing::info!(module = self.name(), "backend reachable");
        } else {
            tracing::warn!(module = self.name(), "backend unreachable at startup");
        }
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(status))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": operation("Status", "Service and backend status", vec![
                        ("200", json_response("Status report", schema_ref("StatusReport")))
                    ])
                }
            },
            "components": {
                "schemas": {
                    "StatusReport": object(json!({
                        "service": { "type": "string" },
                        "version": { "type": "string" },
                        "backend": { "type": "string", "enum": ["up", "down"] }
                    }), &["service", "version", "backend"])
                }
            }
        }))
    }
}

async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    let backend = if state.api.ping().await {
        BackendStatus::Up
    } else {
        BackendStatus::Down
    };

    Json(StatusReport {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        backend,
    })
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(StatusModule { state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::{get as get_json, state_for};
    use axum::http::StatusCode;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reports_backend_up_for_any_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let router = create_module(state_for(&server)).routes();
        let (status, body) = get_json(&router, "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend"], "up");
        assert_eq!(body["service"], "elibros-web");
    }

    #[tokio::test]
    async fn reports_backend_down_when_unreachable() {
        let server = MockServer::start().await;
        let state = state_for(&server);
        drop(server);

        let router = create_module(state).routes();
        let (_, body) = get_json(&router, "/", None).await;
        assert_eq!(body["backend"], "down");
    }
}
