//! Admin console. Every route requires the [`AdminSession`] guard.

mod cupons;
mod livros;
mod pedidos;
mod termos;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use elibros_authz::AdminSession;
use elibros_client::models::{AdminStats, Taxonomia};
use elibros_client::money::parse_decimal;
use elibros_http::AppError;
use elibros_kernel::openapi::{authed_operation, json_response, object, schema_ref};
use elibros_kernel::{InitCtx, Module};
use elibros_search::SortDirection;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::state::AppState;

pub struct AdminModule {
    state: AppState,
}

/// `?search&ordering` shared by the ranked admin lists.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
}

impl ListQuery {
    pub fn term(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }

    pub fn direction(&self, default: SortDirection) -> SortDirection {
        match self.ordering.as_deref().map(str::trim) {
            Some(ordering) if !ordering.is_empty() => SortDirection::from_ordering(ordering),
            _ => default,
        }
    }
}

/// Decimal form input sent either as a JSON number or as text.
pub(crate) fn amount(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_decimal(text),
        _ => None,
    }
}

/// Whether the form left a decimal field empty.
pub(crate) fn is_blank(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

#[async_trait]
impl Module for AdminModule {
    fn name(&self) -> &'static str {
        "admin"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "admin module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        let mut router = Router::new()
            .route("/dashboard", get(dashboard))
            .nest("/cupons", cupons::routes())
            .nest("/livros", livros::routes())
            .nest("/pedidos", pedidos::routes());

        for taxonomia in Taxonomia::ALL {
            router = router.nest(&format!("/{}", taxonomia.segment()), termos::routes(taxonomia));
        }

        router.with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let mut paths = Map::new();
        paths.insert(
            "/dashboard".to_string(),
            json!({
                "get": authed_operation("Admin", "Dashboard counters", None, vec![
                    ("200", json_response("Counters", schema_ref("AdminStats"))),
                    ("403", elibros_kernel::openapi::error_response("Not an administrator"))
                ])
            }),
        );
        extend(&mut paths, "/cupons", cupons::paths());
        extend(&mut paths, "/livros", livros::paths());
        extend(&mut paths, "/pedidos", pedidos::paths());
        for taxonomia in Taxonomia::ALL {
            extend(&mut paths, &format!("/{}", taxonomia.segment()), termos::paths(taxonomia));
        }

        let mut schemas = Map::new();
        schemas.insert(
            "AdminStats".to_string(),
            object(json!({
                "total_livros": { "type": "integer" },
                "total_clientes": { "type": "integer" },
                "total_pedidos": { "type": "integer" },
                "total_generos": { "type": "integer" },
                "total_categorias": { "type": "integer" },
                "total_administradores": { "type": "integer" }
            }), &[]),
        );
        for fragment in [
            cupons::schemas(),
            livros::schemas(),
            pedidos::schemas(),
            termos::schemas(),
        ] {
            if let Value::Object(map) = fragment {
                schemas.extend(map);
            }
        }

        Some(json!({
            "paths": Value::Object(paths),
            "components": { "schemas": Value::Object(schemas) }
        }))
    }
}

/// Copies sub-router paths under `prefix`; `/` maps to the prefix itself.
fn extend(paths: &mut Map<String, Value>, prefix: &str, fragment: Value) {
    if let Value::Object(map) = fragment {
        for (path, item) in map {
            let full = if path == "/" {
                prefix.to_string()
            } else {
                format!("{prefix}{path}")
            };
            paths.insert(full, item);
        }
    }
}

async fn dashboard(
    State(state): State<AppState>,
    admin: AdminSession,
) -> Result<Json<AdminStats>, AppError> {
    Ok(Json(state.api.admin_stats(admin.token()).await?))
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(AdminModule { state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::{get as get_json, mount_admin, state_for};
    use axum::http::StatusCode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn amounts_accept_numbers_and_text() {
        assert_eq!(amount(Some(&json!(12.5))), Some(12.5));
        assert_eq!(amount(Some(&json!("12,50"))), Some(12.5));
        assert_eq!(amount(Some(&json!("doze"))), None);
        assert!(is_blank(Some(&json!(" "))));
        assert!(!is_blank(Some(&json!(0))));
    }

    #[test]
    fn ordering_falls_back_to_the_default() {
        let query = ListQuery::default();
        assert_eq!(query.direction(SortDirection::Descending), SortDirection::Descending);
        let query = ListQuery {
            ordering: Some("-nome".into()),
            ..ListQuery::default()
        };
        assert_eq!(query.direction(SortDirection::Ascending), SortDirection::Descending);
    }

    #[test]
    fn openapi_covers_every_taxonomy() {
        let state = AppState::from_settings(&Default::default()).unwrap();
        let spec = create_module(state).openapi().unwrap();
        for path in [
            "/dashboard",
            "/cupons",
            "/cupons/{id}",
            "/generos",
            "/autores/{id}",
            "/livros/opcoes",
            "/pedidos/{id}/cancelar",
        ] {
            assert!(spec["paths"][path].is_object(), "missing {path}");
        }
    }

    #[tokio::test]
    async fn customers_are_turned_away() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/admin/user_info/"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"detail": "Sem permissão"})),
            )
            .mount(&server)
            .await;
        let router = create_module(state_for(&server)).routes();

        let (status, body) = get_json(&router, "/dashboard", Some("cliente")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Acesso restrito a administradores");
    }

    #[tokio::test]
    async fn dashboard_for_staff() {
        let server = MockServer::start().await;
        mount_admin(&server, "staff").await;
        Mock::given(method("GET"))
            .and(path("/api/v1/admin/dashboard_stats/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"total_livros": 120, "total_pedidos": 8})),
            )
            .mount(&server)
            .await;
        let router = create_module(state_for(&server)).routes();

        let (status, body) = get_json(&router, "/dashboard", Some("staff")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_livros"], 120);
    }
}
