use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::livro::LivroResumo;
use crate::money::{decimal, optional_decimal};

/// Order lifecycle as the backend stores it.
///
/// Older payloads carry the long Portuguese names; both decode, and the
/// three-letter code is what goes back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "PRO", alias = "pendente")]
    EmProcessamento,
    #[serde(rename = "CON", alias = "confirmado")]
    Confirmado,
    #[serde(rename = "ENV", alias = "enviado")]
    Enviado,
    #[serde(rename = "ENT", alias = "entregue")]
    Entregue,
    #[serde(rename = "CAN", alias = "cancelado")]
    Cancelado,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order status {0:?}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::EmProcessamento,
        OrderStatus::Confirmado,
        OrderStatus::Enviado,
        OrderStatus::Entregue,
        OrderStatus::Cancelado,
    ];

    pub fn code(self) -> &'static str {
        match self {
            OrderStatus::EmProcessamento => "PRO",
            OrderStatus::Confirmado => "CON",
            OrderStatus::Enviado => "ENV",
            OrderStatus::Entregue => "ENT",
            OrderStatus::Cancelado => "CAN",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::EmProcessamento => "Em processamento",
            OrderStatus::Confirmado => "Confirmado",
            OrderStatus::Enviado => "Enviado",
            OrderStatus::Entregue => "Entregue",
            OrderStatus::Cancelado => "Cancelado",
        }
    }

    /// Delivered and cancelled orders can no longer be edited or cancelled.
    pub fn is_final(self) -> bool {
        matches!(self, OrderStatus::Entregue | OrderStatus::Cancelado)
    }

    /// Statuses an admin may move the order to.
    pub fn next_statuses(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::EmProcessamento => &[OrderStatus::Confirmado, OrderStatus::Cancelado],
            OrderStatus::Confirmado => &[OrderStatus::Enviado, OrderStatus::Cancelado],
            OrderStatus::Enviado => &[OrderStatus::Entregue],
            OrderStatus::Entregue | OrderStatus::Cancelado => &[],
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| {
                status.code().eq_ignore_ascii_case(wanted)
                    || long_name(*status).eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

fn long_name(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::EmProcessamento => "pendente",
        OrderStatus::Confirmado => "confirmado",
        OrderStatus::Enviado => "enviado",
        OrderStatus::Entregue => "entregue",
        OrderStatus::Cancelado => "cancelado",
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientePedido {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnderecoEntrega {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub cep: String,
    #[serde(default, alias = "rua")]
    pub logradouro: String,
    #[serde(default)]
    pub numero: String,
    #[serde(default)]
    pub complemento: Option<String>,
    #[serde(default)]
    pub bairro: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub uf: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPedido {
    pub id: u64,
    pub livro: LivroResumo,
    pub quantidade: u32,
    #[serde(default, with = "decimal")]
    pub preco_unitario: f64,
    #[serde(default, with = "decimal")]
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CupomUsado {
    pub id: u64,
    pub codigo: String,
    #[serde(default, with = "decimal")]
    pub valor_desconto: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pedido {
    pub id: u64,
    pub numero_pedido: String,
    #[serde(default)]
    pub cliente: ClientePedido,
    #[serde(default)]
    pub endereco_entrega: Option<EnderecoEntrega>,
    pub status: OrderStatus,
    #[serde(default, with = "decimal")]
    pub valor_subtotal: f64,
    #[serde(default, with = "decimal")]
    pub valor_frete: f64,
    #[serde(default, with = "decimal")]
    pub valor_desconto: f64,
    #[serde(default, with = "decimal")]
    pub valor_total: f64,
    #[serde(default)]
    pub data_pedido: String,
    #[serde(default)]
    pub data_atualizacao: String,
    #[serde(default)]
    pub metodo_pagamento: String,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default)]
    pub cupom_usado: Option<CupomUsado>,
    #[serde(default)]
    pub itens: Vec<ItemPedido>,
}

impl Pedido {
    /// `data_pedido` as an instant; `None` when missing or malformed.
    pub fn placed_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(self.data_pedido.trim(), &Rfc3339).ok()
    }
}

/// Body of `POST /pedidos/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedidoCreate {
    pub data_de_pedido: String,
    pub entrega_estimada: String,
    #[serde(with = "decimal")]
    pub valor_total: f64,
    #[serde(with = "decimal")]
    pub desconto: f64,
    pub quantia_itens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metodo_pagamento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_frete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cupom: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedidoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancelamento {
    #[serde(default)]
    pub motivo: Option<String>,
}

/// Query for the order lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedidoFiltro {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub cliente: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
}

impl PedidoFiltro {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        super::push_query(&mut query, "search", self.search.as_deref());
        super::push_query(&mut query, "status", self.status.map(OrderStatus::code));
        super::push_query(&mut query, "cliente", self.cliente.as_deref());
        super::push_query(&mut query, "data_inicio", self.data_inicio.as_deref());
        super::push_query(&mut query, "data_fim", self.data_fim.as_deref());
        super::push_query(&mut query, "ordering", self.ordering.as_deref());
        super::push_query(&mut query, "page", self.page);
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PedidoStats {
    #[serde(default)]
    pub total_pedidos: u64,
    #[serde(default)]
    pub pedidos_pendentes: u64,
    #[serde(default)]
    pub pedidos_confirmados: u64,
    #[serde(default)]
    pub pedidos_preparando: u64,
    #[serde(default)]
    pub pedidos_enviados: u64,
    #[serde(default)]
    pub pedidos_entregues: u64,
    #[serde(default)]
    pub pedidos_cancelados: u64,
    #[serde(default, with = "optional_decimal")]
    pub valor_total_vendas: Option<f64>,
}

/// Which set of order endpoints to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `/pedidos/...`, the signed-in customer's own orders.
    Customer,
    /// `/admin/...`, every order.
    Admin,
}
