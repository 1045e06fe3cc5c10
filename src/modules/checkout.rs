//! Checkout: delivery address, shipping choice, coupon estimate and order
//! placement. Totals here are estimates; the backend recomputes them when
//! the order is created.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use elibros_authz::Session;
use elibros_client::models::{
    Cupom, Endereco, ItemCarrinho, OpcaoFrete, Pedido, PedidoCreate, TipoValor,
};
use elibros_client::money::format_brl;
use elibros_client::ApiError;
use elibros_http::{AppError, FieldErrors};
use elibros_kernel::openapi::{
    array_of, authed_operation, error_response, json_response, object, operation, schema_ref,
};
use elibros_kernel::{InitCtx, Module};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::modules::cart;
use crate::state::AppState;
use crate::utils::{non_blank, parse_cep, rfc3339, round_cents};

const PIX: &str = "pix";
const INVALID_COUPON: &str = "Cupom inválido ou expirado";

pub struct CheckoutModule {
    state: AppState,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethod {
    pub id: &'static str,
    pub nome: &'static str,
    pub descricao: &'static str,
}

const PAYMENT_METHODS: [PaymentMethod; 1] = [PaymentMethod {
    id: PIX,
    nome: "Pix",
    descricao: "Pagamento instantâneo pelo QR code",
}];

/// Where the order ships to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destino {
    /// The address saved in the customer's profile.
    #[default]
    Meu,
    Outro,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub endereco: Destino,
    #[serde(default)]
    pub outro_endereco: Option<Endereco>,
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub frete_tipo: Option<String>,
    #[serde(default)]
    pub cupom: Option<String>,
    #[serde(default)]
    pub metodo_pagamento: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CupomAplicado {
    pub codigo: String,
    pub tipo_valor: TipoValor,
    pub valor: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PixPayment {
    pub payload: String,
    pub qr_code_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub itens: Vec<ItemCarrinho>,
    pub quantidade_total: u32,
    pub subtotal: f64,
    pub frete: Option<OpcaoFrete>,
    pub valor_frete: f64,
    pub opcoes_frete: Vec<OpcaoFrete>,
    pub cupom: Option<CupomAplicado>,
    pub desconto: f64,
    pub total: f64,
    pub metodo_pagamento: Option<String>,
    pub pix: Option<PixPayment>,
}

#[async_trait]
impl Module for CheckoutModule {
    fn name(&self) -> &'static str {
        "checkout"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            qr_code_url = %ctx.settings.integrations.qr_code_url,
            "checkout module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/pagamento", get(payment_methods))
            .route("/resumo", post(summary))
            .route("/confirmar", post(confirm))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/pagamento": {
                    "get": operation("Checkout", "Supported payment methods", vec![
                        ("200", json_response("Payment methods", array_of("PaymentMethod")))
                    ])
                },
                "/resumo": {
                    "post": authed_operation(
                        "Checkout",
                        "Order summary",
                        Some(schema_ref("CheckoutForm")),
                        vec![
                            ("200", json_response("Summary", schema_ref("CheckoutSummary"))),
                            ("422", error_response("Empty cart, missing address or invalid coupon"))
                        ],
                    )
                },
                "/confirmar": {
                    "post": authed_operation(
                        "Checkout",
                        "Place the order",
                        Some(schema_ref("CheckoutForm")),
                        vec![
                            ("201", json_response("Created order", json!({ "type": "object" }))),
                            ("422", error_response("Missing payment method or shipping option"))
                        ],
                    )
                }
            },
            "components": {
                "schemas": {
                    "PaymentMethod": object(json!({
                        "id": { "type": "string" },
                        "nome": { "type": "string" },
                        "descricao": { "type": "string" }
                    }), &["id", "nome"]),
                    "CheckoutForm": object(json!({
                        "endereco": { "type": "string", "enum": ["meu", "outro"] },
                        "outro_endereco": { "type": "object" },
                        "cep": { "type": "string" },
                        "frete_tipo": { "type": "string" },
                        "cupom": { "type": "string" },
                        "metodo_pagamento": { "type": "string" }
                    }), &[]),
                    "CheckoutSummary": object(json!({
                        "itens": { "type": "array", "items": { "type": "object" } },
                        "quantidade_total": { "type": "integer" },
                        "subtotal": { "type": "number" },
                        "frete": { "type": "object", "nullable": true },
                        "valor_frete": { "type": "number" },
                        "opcoes_frete": { "type": "array", "items": { "type": "object" } },
                        "cupom": { "type": "object", "nullable": true },
                        "desconto": { "type": "number" },
                        "total": { "type": "number" },
                        "metodo_pagamento": { "type": "string", "nullable": true },
                        "pix": { "type": "object", "nullable": true }
                    }), &["itens", "subtotal", "valor_frete", "desconto", "total"])
                }
            }
        }))
    }
}

async fn payment_methods() -> Json<Vec<PaymentMethod>> {
    Json(PAYMENT_METHODS.to_vec())
}

/// CEP of the chosen destination, without mask.
async fn destination_cep(
    state: &AppState,
    session: &Session,
    form: &CheckoutForm,
) -> Result<elibros_client::Cep, AppError> {
    let raw = match form.endereco {
        Destino::Meu => {
            let perfil = state.api.perfil(session.token()).await?;
            perfil.endereco.map(|endereco| endereco.cep).ok_or_else(|| {
                AppError::invalid_field(
                    "endereco",
                    "Cadastre um endereço no seu perfil para continuar",
                )
            })?
        }
        Destino::Outro => form
            .outro_endereco
            .as_ref()
            .map(|endereco| endereco.cep.clone())
            .or_else(|| form.cep.clone())
            .unwrap_or_default(),
    };

    if raw.trim().is_empty() {
        return Err(AppError::invalid_field("cep", "CEP é obrigatório"));
    }
    parse_cep(&raw)
}

/// Looks `codigo` up and checks its validity window at `now`.
async fn coupon(
    state: &AppState,
    session: &Session,
    codigo: &str,
    now: OffsetDateTime,
) -> Result<Cupom, AppError> {
    let cupom = state
        .api
        .validar_cupom(codigo, session.token())
        .await
        .map_err(|err| match err {
            ApiError::Status { status: 400 | 404, .. } => {
                AppError::invalid_field("cupom", INVALID_COUPON)
            }
            other => AppError::from(other),
        })?;

    if !cupom.is_valid_at(now) {
        tracing::debug!(codigo, "coupon outside its validity window");
        return Err(AppError::invalid_field("cupom", INVALID_COUPON));
    }
    Ok(cupom)
}

fn check_payment_method(metodo: Option<&str>) -> Result<(), AppError> {
    match metodo {
        Some(metodo) if !PAYMENT_METHODS.iter().any(|known| known.id == metodo) => Err(
            AppError::invalid_field("metodo_pagamento", "Forma de pagamento não suportada"),
        ),
        _ => Ok(()),
    }
}

async fn build_summary(
    state: &AppState,
    session: &Session,
    form: CheckoutForm,
    now: OffsetDateTime,
) -> Result<CheckoutSummary, AppError> {
    let metodo_pagamento = non_blank(form.metodo_pagamento.clone()).map(|m| m.to_lowercase());
    check_payment_method(metodo_pagamento.as_deref())?;

    let cep = destination_cep(state, session, &form).await?;
    let (carrinho, quote) = cart::quote(state, session, cep, form.frete_tipo.as_deref()).await?;

    let cupom = match non_blank(form.cupom) {
        Some(codigo) => Some(coupon(state, session, &codigo, now).await?),
        None => None,
    };
    let desconto = cupom.as_ref().map_or(0.0, |c| c.discount_for(quote.subtotal));
    let total = round_cents(quote.subtotal - desconto + quote.valor_frete).max(0.0);

    let pix = (metodo_pagamento.as_deref() == Some(PIX)).then(|| {
        let payload = format!("Pagamento Pix {}", format_brl(total));
        PixPayment {
            qr_code_url: state.qr_url(&payload),
            payload,
        }
    });

    Ok(CheckoutSummary {
        itens: carrinho.itens,
        quantidade_total: quote.quantidade_total,
        subtotal: quote.subtotal,
        frete: quote.frete,
        valor_frete: quote.valor_frete,
        opcoes_frete: quote.opcoes,
        cupom: cupom.map(|c| CupomAplicado {
            codigo: c.codigo,
            tipo_valor: c.tipo_valor,
            valor: c.valor,
        }),
        desconto,
        total,
        metodo_pagamento,
        pix,
    })
}

async fn summary(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<CheckoutSummary>, AppError> {
    let summary = build_summary(&state, &session, form, OffsetDateTime::now_utc()).await?;
    Ok(Json(summary))
}

async fn confirm(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, Json<Pedido>), AppError> {
    let now = OffsetDateTime::now_utc();
    let summary = build_summary(&state, &session, form, now).await?;

    FieldErrors::new()
        .check(
            summary.metodo_pagamento.is_some(),
            "metodo_pagamento",
            "Selecione uma forma de pagamento",
        )
        .check(summary.frete.is_some(), "frete_tipo", "Selecione uma opção de frete")
        .finish()?;

    let pedido = order_from(&summary, now);
    let criado = state.api.criar_pedido(&pedido, session.token()).await?;
    tracing::info!(
        pedido_id = criado.id,
        numero = %criado.numero_pedido,
        total = criado.valor_total,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(criado)))
}

fn order_from(summary: &CheckoutSummary, now: OffsetDateTime) -> PedidoCreate {
    let prazo = summary.frete.as_ref().map_or(0, |frete| frete.prazo_dias);
    PedidoCreate {
        data_de_pedido: rfc3339(now),
        entrega_estimada: rfc3339(now + Duration::days(i64::from(prazo))),
        valor_total: summary.total,
        desconto: summary.desconto,
        quantia_itens: summary.quantidade_total,
        metodo_pagamento: summary.metodo_pagamento.clone(),
        tipo_frete: summary.frete.as_ref().map(|frete| frete.tipo.clone()),
        cupom: summary.cupom.as_ref().map(|c| c.codigo.clone()),
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(CheckoutModule { state })
}
