use serde::{Deserialize, Serialize};

use crate::money::decimal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivroCarrinho {
    pub id: u64,
    pub titulo: String,
    #[serde(with = "decimal")]
    pub preco: f64,
    #[serde(default)]
    pub capa_url: Option<String>,
    #[serde(default)]
    pub autores: Vec<String>,
    #[serde(default)]
    pub quantidade: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCarrinho {
    pub id: u64,
    pub livro: LivroCarrinho,
    pub quantidade: u32,
}

impl ItemCarrinho {
    pub fn subtotal(&self) -> f64 {
        self.livro.preco * f64::from(self.quantidade)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Carrinho {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub itens: Vec<ItemCarrinho>,
}

impl Carrinho {
    /// Σ price × quantity, rounded to cents.
    pub fn subtotal(&self) -> f64 {
        let total: f64 = self.itens.iter().map(ItemCarrinho::subtotal).sum();
        (total * 100.0).round() / 100.0
    }

    /// Units across every item, saturating at `u32::MAX`.
    pub fn quantidade_total(&self) -> u32 {
        self.itens
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.quantidade))
    }

    pub fn is_empty(&self) -> bool {
        self.itens.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovoItem {
    pub livro_id: u64,
    pub quantidade: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantidadeItem {
    pub quantidade: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subtotal_handles_comma_prices() {
        let carrinho: Carrinho = serde_json::from_value(json!({
            "itens": [
                {"id": 1, "quantidade": 2, "livro": {"id": 10, "titulo": "A", "preco": "39,90"}},
                {"id": 2, "quantidade": 1, "livro": {"id": 11, "titulo": "B", "preco": 10.1}}
            ]
        }))
        .unwrap();
        assert_eq!(carrinho.subtotal(), 89.9);
        assert_eq!(carrinho.quantidade_total(), 3);
    }

    #[test]
    fn huge_quantities_saturate() {
        let carrinho: Carrinho = serde_json::from_value(json!({
            "itens": [
                {
                    "id": 1,
                    "quantidade": u32::MAX,
                    "livro": {"id": 10, "titulo": "A", "preco": "1.00"}
                },
                {"id": 2, "quantidade": 5, "livro": {"id": 11, "titulo": "B", "preco": "1.00"}}
            ]
        }))
        .unwrap();
        assert_eq!(carrinho.quantidade_total(), u32::MAX);
    }
}
