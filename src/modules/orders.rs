use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use elibros_authz::Session;
use elibros_client::models::{
    Cancelamento, OrderStatus, Pedido, PedidoFiltro, PedidoStats, PedidoUpdate, Scope,
};
use elibros_http::AppError;
use elibros_kernel::openapi::{
    array_of, authed_operation, error_response, json_response, object, schema_ref,
};
use elibros_kernel::{InitCtx, Module};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;
use crate::utils::parse_id;

const INVALID_ORDER_ID: &str = "ID do pedido inválido";
const ORDER_CLOSED: &str = "Este pedido já foi finalizado";

/// The customer's "my orders" pages.
pub struct OrdersModule {
    state: AppState,
}

/// Tabs of the order history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aba {
    /// `PRO`, `CON` and `ENV`.
    Andamento,
    /// `ENT` and `CAN`.
    Finalizados,
}

impl Aba {
    pub fn contains(self, status: OrderStatus) -> bool {
        match self {
            Aba::Andamento => !status.is_final(),
            Aba::Finalizados => status.is_final(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub aba: Option<Aba>,
}

#[derive(Debug, Serialize)]
pub struct OrderHistory {
    pub aba: Option<Aba>,
    pub total: usize,
    pub pedidos: Vec<Pedido>,
}

#[async_trait]
impl Module for OrdersModule {
    fn name(&self) -> &'static str {
        "orders"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "orders module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(history))
            .route("/estatisticas", get(statistics))
            .route("/{id}", get(order_detail))
            .route("/{id}/recebimento", post(confirm_delivery))
            .route("/{id}/cancelar", post(cancel_order))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let order = |what| json_response(what, schema_ref("Pedido"));
        Some(json!({
            "paths": {
                "/": {
                    "get": authed_operation("Orders", "Order history, newest first", None, vec![
                        ("200", json_response("Orders", schema_ref("OrderHistory")))
                    ])
                },
                "/estatisticas": {
                    "get": authed_operation("Orders", "Order counts by status", None, vec![
                        ("200", json_response("Statistics", json!({ "type": "object" })))
                    ])
                },
                "/{id}": {
                    "get": authed_operation("Orders", "One order", None, vec![
                        ("200", order("Order")),
                        ("404", error_response("Unknown order"))
                    ])
                },
                "/{id}/recebimento": {
                    "post": authed_operation("Orders", "Confirm delivery", None, vec![
                        ("200", order("Delivered order")),
                        ("409", error_response("Order already closed"))
                    ])
                },
                "/{id}/cancelar": {
                    "post": authed_operation(
                        "Orders",
                        "Cancel an order",
                        Some(schema_ref("Cancelamento")),
                        vec![
                            ("200", order("Cancelled order")),
                            ("409", error_response("Order already closed"))
                        ],
                    )
                }
            },
            "components": {
                "schemas": {
                    "Pedido": object(json!({
                        "id": { "type": "integer" },
                        "numero_pedido": { "type": "string" },
                        "status": { "type": "string", "enum": ["PRO", "CON", "ENV", "ENT", "CAN"] },
                        "valor_total": { "type": "string" },
                        "data_pedido": { "type": "string" },
                        "itens": { "type": "array", "items": { "type": "object" } }
                    }), &["id", "numero_pedido", "status"]),
                    "OrderHistory": object(json!({
                        "aba": {
                            "type": "string",
                            "enum": ["andamento", "finalizados"],
                            "nullable": true
                        },
                        "total": { "type": "integer" },
                        "pedidos": array_of("Pedido")
                    }), &["total", "pedidos"]),
                    "Cancelamento": object(json!({
                        "motivo": { "type": "string" }
                    }), &[])
                }
            }
        }))
    }
}

/// Newest first; orders without a readable date go last.
pub(crate) fn newest_first(pedidos: &mut [Pedido]) {
    pedidos.sort_by_key(|pedido| std::cmp::Reverse(pedido.placed_at()));
}

async fn history(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<OrderHistory>, AppError> {
    let listing = state
        .api
        .pedidos(Scope::Customer, &PedidoFiltro::default(), session.token())
        .await?;

    let mut pedidos: Vec<Pedido> = listing
        .into_results()
        .into_iter()
        .filter(|pedido| query.aba.map_or(true, |aba| aba.contains(pedido.status)))
        .collect();
    newest_first(&mut pedidos);

    Ok(Json(OrderHistory {
        aba: query.aba,
        total: pedidos.len(),
        pedidos,
    }))
}

async fn statistics(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<PedidoStats>, AppError> {
    Ok(Json(state.api.estatisticas_pedidos(Scope::Customer, session.token()).await?))
}

async fn order_detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Pedido>, AppError> {
    let id = parse_id(&id, INVALID_ORDER_ID)?;
    Ok(Json(state.api.pedido(Scope::Customer, id, session.token()).await?))
}

/// Fetches the order and refuses it when it already reached a final status.
pub(crate) async fn open_order(
    state: &AppState,
    scope: Scope,
    id: u64,
    token: &str,
) -> Result<Pedido, AppError> {
    let pedido = state.api.pedido(scope, id, token).await?;
    if pedido.status.is_final() {
        return Err(AppError::conflict(
            vec![json!({"field": "status", "error": pedido.status.code()})],
            ORDER_CLOSED,
        ));
    }
    Ok(pedido)
}

async fn confirm_delivery(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Pedido>, AppError> {
    let id = parse_id(&id, INVALID_ORDER_ID)?;
    open_order(&state, Scope::Customer, id, session.token()).await?;

    let update = PedidoUpdate {
        status: Some(OrderStatus::Entregue),
        ..PedidoUpdate::default()
    };
    let pedido = state
        .api
        .atualizar_pedido(Scope::Customer, id, &update, session.token())
        .await?;
    tracing::info!(pedido_id = id, "delivery confirmed by customer");
    Ok(Json(pedido))
}

async fn cancel_order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    body: Option<Json<Cancelamento>>,
) -> Result<Json<Pedido>, AppError> {
    let id = parse_id(&id, INVALID_ORDER_ID)?;
    open_order(&state, Scope::Customer, id, session.token()).await?;

    let cancelamento = body.map(|Json(c)| c).unwrap_or_default();
    let pedido = state
        .api
        .cancelar_pedido(Scope::Customer, id, &cancelamento, session.token())
        .await?;
    tracing::info!(pedido_id = id, "order cancelled by customer");
    Ok(Json(pedido))
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(OrdersModule { state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::{call, get as get_json, state_for};
    use axum::http::{Method, StatusCode};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pedido(id: u64, status: &str, data: &str) -> serde_json::Value {
        json!({
            "id": id,
            "numero_pedido": format!("#{id:05}"),
            "status": status,
            "valor_total": "50.00",
            "data_pedido": data
        })
    }

    async fn setup() -> (MockServer, Router) {
        let server = MockServer::start().await;
        let router = create_module(state_for(&server)).routes();
        (server, router)
    }

    #[tokio::test]
    async fn history_splits_tabs_newest_first() {
        let (server, router) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/pedidos/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 4,
                "results": [
                    pedido(1, "ENT", "2025-01-10T10:00:00Z"),
                    pedido(2, "PRO", "2025-02-01T10:00:00Z"),
                    pedido(3, "ENV", "2025-03-01T10:00:00Z"),
                    pedido(4, "CAN", "ontem")
                ]
            })))
            .mount(&server)
            .await;

        let (status, body) = get_json(&router, "/?aba=andamento", Some("tok")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["pedidos"][0]["id"], 3);
        assert_eq!(body["pedidos"][1]["id"], 2);

        let (_, body) = get_json(&router, "/?aba=finalizados", Some("tok")).await;
        assert_eq!(body["pedidos"][0]["id"], 1);
        assert_eq!(body["pedidos"][1]["id"], 4);

        let (_, body) = get_json(&router, "/", Some("tok")).await;
        assert_eq!(body["total"], 4);
    }

    #[tokio::test]
    async fn delivered_orders_cannot_be_confirmed_again() {
        let (server, router) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/pedidos/5/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pedido(5, "ENT", "2025-01-10T10:00:00Z")),
            )
            .mount(&server)
            .await;

        let (status, body) = call(&router, Method::POST, "/5/recebimento", Some("tok"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], ORDER_CLOSED);
    }

    #[tokio::test]
    async fn delivery_confirmation_patches_the_status() {
        let (server, router) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/pedidos/5/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pedido(5, "ENV", "2025-01-10T10:00:00Z")),
            )
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/pedidos/5/"))
            .and(body_json(json!({"status": "ENT"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pedido(5, "ENT", "2025-01-10T10:00:00Z")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = call(&router, Method::POST, "/5/recebimento", Some("tok"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ENT");
    }

    #[tokio::test]
    async fn cancelling_sends_the_reason() {
        let (server, router) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/pedidos/6/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pedido(6, "PRO", "2025-01-10T10:00:00Z")),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/pedidos/6/cancelar/"))
            .and(body_json(json!({"motivo": "Comprei errado"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/pedidos/6/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(pedido(6, "CAN", "2025-01-10T10:00:00Z")),
            )
            .mount(&server)
            .await;

        let (status, body) = call(
            &router,
            Method::POST,
            "/6/cancelar",
            Some("tok"),
            Some(json!({"motivo": "Comprei errado"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "CAN");
    }

    #[tokio::test]
    async fn unknown_tabs_are_rejected() {
        let (_server, router) = setup().await;
        let (status, _) = get_json(&router, "/?aba=todos", Some("tok")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
