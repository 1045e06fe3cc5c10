use serde::{Deserialize, Serialize};

use crate::cep::Cep;
use crate::money::{decimal, optional_decimal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpcaoFrete {
    pub tipo: String,
    pub nome: String,
    #[serde(with = "decimal")]
    pub preco: f64,
    #[serde(default)]
    pub preco_formatado: String,
    #[serde(default)]
    pub prazo_dias: u32,
    #[serde(default)]
    pub prazo_texto: String,
    #[serde(default)]
    pub gratis: bool,
}

impl OpcaoFrete {
    /// What the customer pays for this option.
    pub fn charge(&self) -> f64 {
        if self.gratis {
            0.0
        } else {
            self.preco
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultadoFrete {
    pub cep_destino: String,
    #[serde(default)]
    pub regiao: String,
    #[serde(default)]
    pub peso_total_kg: f64,
    #[serde(default)]
    pub quantidade_livros: u32,
    #[serde(default, with = "optional_decimal")]
    pub valor_total_livros: Option<f64>,
    #[serde(default)]
    pub opcoes: Vec<OpcaoFrete>,
}

impl ResultadoFrete {
    pub fn option(&self, tipo: &str) -> Option<&OpcaoFrete> {
        self.opcoes.iter().find(|opcao| opcao.tipo == tipo)
    }

    /// `padrao` when offered, otherwise the first option.
    pub fn default_option(&self) -> Option<&OpcaoFrete> {
        self.option("padrao").or_else(|| self.opcoes.first())
    }

    /// The requested option, falling back to [`Self::default_option`].
    pub fn select(&self, tipo: Option<&str>) -> Option<&OpcaoFrete> {
        tipo.and_then(|tipo| self.option(tipo))
            .or_else(|| self.default_option())
    }
}

/// Body of `POST /frete/calcular/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreteGenericoRequest {
    pub cep: Cep,
    pub quantidade_livros: u32,
    #[serde(with = "optional_decimal", skip_serializing_if = "Option::is_none")]
    pub valor_total: Option<f64>,
}

/// Body of `POST /frete/livro/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreteLivroRequest {
    pub cep: Cep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantidade: Option<u32>,
}

/// Body of `POST /frete/carrinho/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreteCarrinhoRequest {
    pub cep: Cep,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opcao(tipo: &str, preco: f64, gratis: bool) -> OpcaoFrete {
        OpcaoFrete {
            tipo: tipo.into(),
            nome: tipo.to_uppercase(),
            preco,
            preco_formatado: String::new(),
            prazo_dias: 5,
            prazo_texto: String::new(),
            gratis,
        }
    }

    fn resultado(opcoes: Vec<OpcaoFrete>) -> ResultadoFrete {
        ResultadoFrete {
            cep_destino: "01310100".into(),
            regiao: "Sudeste".into(),
            peso_total_kg: 0.5,
            quantidade_livros: 1,
            valor_total_livros: None,
            opcoes,
        }
    }

    #[test]
    fn padrao_is_preferred() {
        let r = resultado(vec![opcao("expressa", 30.0, false), opcao("padrao", 15.0, false)]);
        assert_eq!(r.default_option().map(|o| o.tipo.as_str()), Some("padrao"));
        assert_eq!(r.select(Some("expressa")).map(|o| o.preco), Some(30.0));
        assert_eq!(r.select(Some("drone")).map(|o| o.tipo.as_str()), Some("padrao"));
    }

    #[test]
    fn first_option_without_padrao() {
        let r = resultado(vec![opcao("expressa", 30.0, false)]);
        assert_eq!(r.default_option().map(|o| o.tipo.as_str()), Some("expressa"));
        assert!(resultado(vec![]).default_option().is_none());
    }

    #[test]
    fn free_shipping_costs_nothing() {
        assert_eq!(opcao("padrao", 15.0, true).charge(), 0.0);
        assert_eq!(opcao("padrao", 15.0, false).charge(), 15.0);
    }
}
