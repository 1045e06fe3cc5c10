use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use elibros_authz::Session;
use elibros_client::models::{
    Carrinho, FreteCarrinhoRequest, ItemCarrinho, NovoItem, OpcaoFrete, ResultadoFrete,
};
use elibros_client::Cep;
use elibros_http::AppError;
use elibros_kernel::openapi::{authed_operation, error_response, json_response, object, schema_ref};
use elibros_kernel::{InitCtx, Module};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;
use crate::utils::{parse_cep, parse_id, round_cents};

const INVALID_ITEM_ID: &str = "ID do item inválido";
const QUANTITY_TOO_LOW: &str = "A quantidade deve ser pelo menos 1";

/// The signed-in customer's cart.
pub struct CartModule {
    state: AppState,
}

/// Cart as the cart page shows it.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub itens: Vec<ItemCarrinho>,
    pub quantidade_total: u32,
    pub subtotal: f64,
}

impl From<Carrinho> for CartView {
    fn from(carrinho: Carrinho) -> Self {
        Self {
            quantidade_total: carrinho.quantidade_total(),
            subtotal: carrinho.subtotal(),
            itens: carrinho.itens,
        }
    }
}

/// Cart totals for one destination.
#[derive(Debug, Clone, Serialize)]
pub struct CartQuote {
    pub subtotal: f64,
    pub quantidade_total: u32,
    pub frete: Option<OpcaoFrete>,
    pub valor_frete: f64,
    pub total: f64,
    pub opcoes: Vec<OpcaoFrete>,
}

impl CartQuote {
    /// Pre-selects `tipo`, else `padrao`, else the first option. Shipping is
    /// zero when the option is free or nothing was offered.
    pub fn new(carrinho: &Carrinho, resultado: &ResultadoFrete, tipo: Option<&str>) -> Self {
        let subtotal = carrinho.subtotal();
        let frete = resultado.select(tipo).cloned();
        let valor_frete = frete.as_ref().map_or(0.0, OpcaoFrete::charge);

        Self {
            subtotal,
            quantidade_total: carrinho.quantidade_total(),
            total: round_cents(subtotal + valor_frete),
            frete,
            valor_frete,
            opcoes: resultado.opcoes.clone(),
        }
    }
}

pub(crate) const EMPTY_CART: &str = "Seu carrinho está vazio";

/// Fetches the cart and its shipping quote for `cep` together. An empty
/// cart fails first, whatever the quote answered.
pub(crate) async fn quote(
    state: &AppState,
    session: &Session,
    cep: Cep,
    tipo: Option<&str>,
) -> Result<(Carrinho, CartQuote), AppError> {
    let request = FreteCarrinhoRequest { cep };
    let (carrinho, resultado) = tokio::join!(
        state.api.carrinho(session.token()),
        state.api.frete_carrinho(&request, session.token())
    );
    // An empty cart explains a rejected quote better than the backend does.
    let carrinho = carrinho?;
    if carrinho.is_empty() {
        return Err(AppError::invalid_field("carrinho", EMPTY_CART));
    }
    let resultado = resultado?;

    let quote = CartQuote::new(&carrinho, &resultado, tipo);
    Ok((carrinho, quote))
}

#[derive(Debug, Deserialize)]
pub struct AddItemForm {
    pub livro_id: u64,
    #[serde(default = "one")]
    pub quantidade: u32,
}

#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub quantidade: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct CartShippingForm {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub tipo: Option<String>,
}

fn one() -> u32 {
    1
}

fn check_quantity(quantidade: u32) -> Result<(), AppError> {
    if quantidade < 1 {
        return Err(AppError::invalid_field("quantidade", QUANTITY_TOO_LOW));
    }
    Ok(())
}

#[async_trait]
impl Module for CartModule {
    fn name(&self) -> &'static str {
        "cart"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "cart module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(show_cart))
            .route("/itens", post(add_item))
            .route("/itens/{id}", patch(update_item).delete(remove_item))
            .route("/frete", post(cart_shipping))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let cart = || json_response("Cart after the change", schema_ref("CartView"));
        Some(json!({
            "paths": {
                "/": {
                    "get": authed_operation("Cart", "Show the cart", None, vec![("200", cart())])
                },
                "/itens": {
                    "post": authed_operation(
                        "Cart",
                        "Add a book",
                        Some(schema_ref("AddItemForm")),
                        vec![
                            ("200", cart()),
                            ("422", error_response("Quantity below 1"))
                        ],
                    )
                },
                "/itens/{id}": {
                    "patch": authed_operation(
                        "Cart",
                        "Change an item's quantity",
                        Some(schema_ref("QuantityForm")),
                        vec![
                            ("200", cart()),
                            ("422", error_response("Quantity below 1"))
                        ],
                    ),
                    "delete": authed_operation("Cart", "Remove an item", None, vec![
                        ("200", cart())
                    ])
                },
                "/frete": {
                    "post": authed_operation(
                        "Cart",
                        "Shipping quote for the cart",
                        Some(schema_ref("CartShippingForm")),
                        vec![
                            ("200", json_response("Totals", schema_ref("CartQuote"))),
                            ("422", error_response("Invalid CEP"))
                        ],
                    )
                }
            },
            "components": {
                "schemas": {
                    "CartView": object(json!({
                        "itens": { "type": "array", "items": { "type": "object" } },
                        "quantidade_total": { "type": "integer" },
                        "subtotal": { "type": "number" }
                    }), &["itens", "quantidade_total", "subtotal"]),
                    "AddItemForm": object(json!({
                        "livro_id": { "type": "integer" },
                        "quantidade": { "type": "integer", "minimum": 1 }
                    }), &["livro_id"]),
                    "QuantityForm": object(json!({
                        "quantidade": { "type": "integer", "minimum": 1 }
                    }), &["quantidade"]),
                    "CartShippingForm": object(json!({
                        "cep": { "type": "string" },
                        "tipo": { "type": "string" }
                    }), &["cep"]),
                    "CartQuote": object(json!({
                        "subtotal": { "type": "number" },
                        "quantidade_total": { "type": "integer" },
                        "frete": { "type": "object", "nullable": true },
                        "valor_frete": { "type": "number" },
                        "total": { "type": "number" },
                        "opcoes": { "type": "array", "items": { "type": "object" } }
                    }), &["subtotal", "valor_frete", "total", "opcoes"])
                }
            }
        }))
    }
}

async fn show_cart(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(state.api.carrinho(session.token()).await?.into()))
}

async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddItemForm>,
) -> Result<Json<CartView>, AppError> {
    check_quantity(form.quantidade)?;

    let item = NovoItem {
        livro_id: form.livro_id,
        quantidade: form.quantidade,
    };
    state.api.adicionar_item(&item, session.token()).await?;
    tracing::debug!(livro_id = item.livro_id, quantidade = item.quantidade, "item added to cart");

    Ok(Json(state.api.carrinho(session.token()).await?.into()))
}

async fn update_item(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(form): Json<QuantityForm>,
) -> Result<Json<CartView>, AppError> {
    let id = parse_id(&id, INVALID_ITEM_ID)?;
    check_quantity(form.quantidade)?;

    state.api.atualizar_item(id, form.quantidade, session.token()).await?;
    Ok(Json(state.api.carrinho(session.token()).await?.into()))
}

async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<CartView>, AppError> {
    let id = parse_id(&id, INVALID_ITEM_ID)?;

    state.api.remover_item(id, session.token()).await?;
    Ok(Json(state.api.carrinho(session.token()).await?.into()))
}

async fn cart_shipping(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CartShippingForm>,
) -> Result<Json<CartQuote>, AppError> {
    let cep = parse_cep(&form.cep)?;
    let (_, quote) = quote(&state, &session, cep, form.tipo.as_deref()).await?;
    Ok(Json(quote))
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(CartModule { state })
}
