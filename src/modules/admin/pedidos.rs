use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use elibros_authz::AdminSession;
use elibros_client::models::{
    Cancelamento, OrderStatus, Pedido, PedidoFiltro, PedidoStats, PedidoUpdate, Scope,
};
use elibros_http::AppError;
use elibros_kernel::openapi::{
    array_of, authed_operation, error_response, json_response, object, schema_ref,
};
use elibros_search::{rank_orders, OrderKeys, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ListQuery;
use crate::modules::orders::open_order;
use crate::state::AppState;
use crate::utils::{non_blank, parse_id};

const INVALID_ORDER_ID: &str = "ID do pedido inválido";
const INVALID_STATUS: &str = "Status inválido";

#[derive(Debug, Default, Deserialize)]
pub struct AdminOrderQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderList {
    pub total: usize,
    pub pedidos: Vec<Pedido>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusOption {
    pub codigo: &'static str,
    pub label: &'static str,
}

impl From<OrderStatus> for StatusOption {
    fn from(status: OrderStatus) -> Self {
        Self {
            codigo: status.code(),
            label: status.label(),
        }
    }
}

/// An order plus the statuses the admin may move it to.
#[derive(Debug, Serialize)]
pub struct AdminOrder {
    #[serde(flatten)]
    pub pedido: Pedido,
    pub proximos_status: Vec<StatusOption>,
}

impl From<Pedido> for AdminOrder {
    fn from(pedido: Pedido) -> Self {
        let proximos_status = pedido
            .status
            .next_statuses()
            .iter()
            .copied()
            .map(StatusOption::from)
            .collect();
        Self {
            pedido,
            proximos_status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

fn parse_status(raw: Option<String>) -> Result<Option<OrderStatus>, AppError> {
    non_blank(raw)
        .map(|raw| raw.parse::<OrderStatus>())
        .transpose()
        .map_err(|_| AppError::invalid_field("status", INVALID_STATUS))
}

/// Refuses moves that skip a step of the order lifecycle.
fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
    if from == to || from.next_statuses().contains(&to) {
        return Ok(());
    }
    Err(AppError::invalid_field(
        "status",
        format!("Não é possível alterar o status de {} para {}", from.label(), to.label()),
    ))
}

fn order_keys(pedido: &Pedido) -> OrderKeys<'_> {
    OrderKeys {
        number: pedido.numero_pedido.trim_start_matches('#'),
        client_name: &pedido.cliente.nome,
        client_email: &pedido.cliente.email,
        placed_at: pedido.placed_at(),
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/estatisticas", get(statistics))
        .route("/{id}", get(detail).patch(update))
        .route("/{id}/cancelar", post(cancel))
}

pub(super) fn paths() -> Value {
    let order = |what| json_response(what, schema_ref("AdminOrder"));
    json!({
        "/": {
            "get": authed_operation(
                "Admin orders",
                "Orders ranked by number, client name or e-mail",
                None,
                vec![
                    ("200", json_response("Orders", schema_ref("AdminOrderList"))),
                    ("400", error_response("Unknown status filter"))
                ],
            )
        },
        "/estatisticas": {
            "get": authed_operation("Admin orders", "Order counts and sales total", None, vec![
                ("200", json_response("Statistics", json!({ "type": "object" })))
            ])
        },
        "/{id}": {
            "get": authed_operation(
                "Admin orders",
                "One order with its allowed next statuses",
                None,
                vec![
                    ("200", order("Order")),
                    ("404", error_response("Unknown order"))
                ],
            ),
            "patch": authed_operation(
                "Admin orders",
                "Change status or notes",
                Some(schema_ref("StatusForm")),
                vec![
                    ("200", order("Updated order")),
                    ("409", error_response("Order already closed")),
                    ("422", error_response("Status change not allowed"))
                ],
            )
        },
        "/{id}/cancelar": {
            "post": authed_operation(
                "Admin orders",
                "Cancel an order",
                Some(schema_ref("Cancelamento")),
                vec![
                    ("200", order("Cancelled order")),
                    ("409", error_response("Order already closed"))
                ],
            )
        }
    })
}

pub(super) fn schemas() -> Value {
    let status = json!({ "type": "string", "enum": ["PRO", "CON", "ENV", "ENT", "CAN"] });
    json!({
        "AdminOrderList": object(json!({
            "total": { "type": "integer" },
            "pedidos": array_of("Pedido")
        }), &["total", "pedidos"]),
        "AdminOrder": object(json!({
            "id": { "type": "integer" },
            "numero_pedido": { "type": "string" },
            "status": status,
            "cliente": { "type": "object" },
            "proximos_status": {
                "type": "array",
                "items": object(json!({
                    "codigo": { "type": "string" },
                    "label": { "type": "string" }
                }), &["codigo", "label"])
            }
        }), &["id", "numero_pedido", "status", "proximos_status"]),
        "StatusForm": object(json!({
            "status": status,
            "observacoes": { "type": "string" }
        }), &[])
    })
}

async fn list(
    State(state): State<AppState>,
    admin: AdminSession,
    Query(query): Query<AdminOrderQuery>,
) -> Result<Json<AdminOrderList>, AppError> {
    let status = non_blank(query.status)
        .map(|raw| raw.parse::<OrderStatus>())
        .transpose()
        .map_err(|_| AppError::bad_request(INVALID_STATUS))?;
    let list = ListQuery {
        search: query.search,
        ordering: query.ordering,
    };

    // The backend matches numbers without their `#`.
    let filtro = PedidoFiltro {
        search: non_blank(Some(list.term().trim().trim_start_matches('#').to_string())),
        status,
        page: query.page,
        ..PedidoFiltro::default()
    };
    let pedidos: Vec<Pedido> = state
        .api
        .pedidos(Scope::Admin, &filtro, admin.token())
        .await?
        .into_results()
        .into_iter()
        .filter(|pedido| status.map_or(true, |wanted| pedido.status == wanted))
        .collect();

    let pedidos = rank_orders(
        &pedidos,
        list.term(),
        list.direction(SortDirection::Descending),
        order_keys,
    );
    Ok(Json(AdminOrderList {
        total: pedidos.len(),
        pedidos,
    }))
}

async fn statistics(
    State(state): State<AppState>,
    admin: AdminSession,
) -> Result<Json<PedidoStats>, AppError> {
    Ok(Json(state.api.estatisticas_pedidos(Scope::Admin, admin.token()).await?))
}

async fn detail(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<AdminOrder>, AppError> {
    let id = parse_id(&id, INVALID_ORDER_ID)?;
    let pedido = state.api.pedido(Scope::Admin, id, admin.token()).await?;
    Ok(Json(pedido.into()))
}

async fn update(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    Json(form): Json<StatusForm>,
) -> Result<Json<AdminOrder>, AppError> {
    let id = parse_id(&id, INVALID_ORDER_ID)?;
    let status = parse_status(form.status)?;
    let observacoes = form.observacoes.map(|text| text.trim().to_string());
    if status.is_none() && observacoes.is_none() {
        return Err(AppError::invalid_field("status", "Informe o novo status ou as observações"));
    }

    let atual = open_order(&state, Scope::Admin, id, admin.token()).await?;
    if let Some(status) = status {
        check_transition(atual.status, status)?;
    }

    let update = PedidoUpdate { status, observacoes };
    let pedido = state
        .api
        .atualizar_pedido(Scope::Admin, id, &update, admin.token())
        .await?;
    tracing::info!(
        pedido_id = id,
        from = atual.status.code(),
        to = pedido.status.code(),
        "order updated by admin"
    );
    Ok(Json(pedido.into()))
}

async fn cancel(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    body: Option<Json<Cancelamento>>,
) -> Result<Json<AdminOrder>, AppError> {
    let id = parse_id(&id, INVALID_ORDER_ID)?;
    open_order(&state, Scope::Admin, id, admin.token()).await?;

    let cancelamento = body.map(|Json(c)| c).unwrap_or_default();
    let pedido = state
        .api
        .cancelar_pedido(Scope::Admin, id, &cancelamento, admin.token())
        .await?;
    tracing::info!(pedido_id = id, "order cancelled by admin");
    Ok(Json(pedido.into()))
}
