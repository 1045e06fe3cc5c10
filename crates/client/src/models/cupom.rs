use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::money::decimal;

/// How a coupon's `valor` is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoValor {
    /// `valor` percent of the subtotal.
    #[serde(rename = "1")]
    Percentual,
    /// `valor` reais off.
    #[serde(rename = "2")]
    Fixo,
}

/// Badge shown next to a coupon in the admin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CupomStatus {
    Inativo,
    Expirado,
    Ativo,
    Agendado,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cupom {
    pub id: u64,
    pub codigo: String,
    #[serde(with = "decimal")]
    pub valor: f64,
    pub tipo_valor: TipoValor,
    #[serde(default)]
    pub ativo: bool,
    pub data_inicio: String,
    pub data_fim: String,
}

impl Cupom {
    pub fn inicio(&self) -> Option<OffsetDateTime> {
        parse_instant(&self.data_inicio)
    }

    pub fn fim(&self) -> Option<OffsetDateTime> {
        parse_instant(&self.data_fim)
    }

    pub fn status_at(&self, now: OffsetDateTime) -> CupomStatus {
        if !self.ativo {
            return CupomStatus::Inativo;
        }
        if self.fim().is_some_and(|fim| now > fim) {
            return CupomStatus::Expirado;
        }
        match self.inicio() {
            Some(inicio) if now >= inicio => CupomStatus::Ativo,
            _ => CupomStatus::Agendado,
        }
    }

    /// Active and inside `[data_inicio, data_fim]`.
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.status_at(now) == CupomStatus::Ativo
    }

    /// Display estimate of the discount on `subtotal`, rounded to cents and
    /// never above the subtotal.
    pub fn discount_for(&self, subtotal: f64) -> f64 {
        let subtotal = subtotal.max(0.0);
        let raw = match self.tipo_valor {
            TipoValor::Percentual => subtotal * self.valor / 100.0,
            TipoValor::Fixo => self.valor,
        };
        let cents = (raw.clamp(0.0, subtotal) * 100.0).round();
        cents / 100.0
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
fn parse_instant(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(instant);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CupomInput {
    pub codigo: String,
    #[serde(with = "decimal")]
    pub valor: f64,
    pub tipo_valor: TipoValor,
    pub ativo: bool,
    pub data_inicio: String,
    pub data_fim: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupomFiltro {
    pub ativo: Option<bool>,
}

impl CupomFiltro {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        super::push_query(&mut query, "ativo", self.ativo);
        query
    }
}
