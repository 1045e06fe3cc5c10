use serde::{Deserialize, Serialize};

use crate::money::{decimal, optional_decimal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Livro {
    pub id: u64,
    pub titulo: String,
    #[serde(default)]
    pub subtitulo: Option<String>,
    #[serde(default)]
    pub sinopse: Option<String>,
    #[serde(default)]
    pub editora: String,
    #[serde(default, rename = "ISBN")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub data_de_publicacao: Option<String>,
    #[serde(default)]
    pub ano_de_publicacao: Option<i32>,
    #[serde(with = "decimal")]
    pub preco: f64,
    #[serde(default, with = "optional_decimal")]
    pub desconto: Option<f64>,
    /// Units in stock. `None` when the backend omits it.
    #[serde(default)]
    pub quantidade: Option<u32>,
    #[serde(default)]
    pub capa: Option<String>,
    #[serde(default)]
    pub autores: Vec<String>,
    #[serde(default)]
    pub categorias: Vec<String>,
    #[serde(default)]
    pub generos: Vec<String>,
}

/// Book fields embedded in order items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivroResumo {
    pub id: u64,
    pub titulo: String,
    #[serde(default, with = "decimal")]
    pub preco: f64,
    #[serde(default)]
    pub imagem_capa: Option<String>,
}

/// Payload for creating or replacing a book. Relations go by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivroInput {
    pub titulo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitulo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sinopse: Option<String>,
    pub editora: String,
    #[serde(default, rename = "ISBN", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_de_publicacao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ano_de_publicacao: Option<i32>,
    #[serde(with = "decimal")]
    pub preco: f64,
    #[serde(default, with = "optional_decimal", skip_serializing_if = "Option::is_none")]
    pub desconto: Option<f64>,
    pub quantidade: u32,
    #[serde(default)]
    pub autor: Vec<u64>,
    #[serde(default)]
    pub categoria: Vec<u64>,
    #[serde(default)]
    pub genero: Vec<u64>,
}

/// Catalog query forwarded to `/livros/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivroFiltro {
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
}

impl LivroFiltro {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        super::push_query(&mut query, "search", self.search.as_deref());
        super::push_query(&mut query, "ordering", self.ordering.as_deref());
        super::push_query(&mut query, "page", self.page);
        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avaliacao {
    pub id: u64,
    #[serde(default)]
    pub usuario_nome: String,
    pub texto: String,
    #[serde(default)]
    pub data_publicacao: String,
    #[serde(default)]
    pub curtidas: u32,
    #[serde(default)]
    pub usuario_curtiu: bool,
    #[serde(default)]
    pub pode_curtir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaAvaliacao {
    pub texto: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn livro_decodes_string_prices_and_missing_stock() {
        let livro: Livro = serde_json::from_value(json!({
            "id": 3,
            "titulo": "Dom Casmurro",
            "editora": "Garnier",
            "ISBN": "978-85",
            "preco": "29,90",
            "autores": ["Machado de Assis"]
        }))
        .unwrap();
        assert_eq!(livro.preco, 29.9);
        assert_eq!(livro.quantidade, None);
        assert_eq!(livro.isbn.as_deref(), Some("978-85"));
        assert!(livro.generos.is_empty());
    }

    #[test]
    fn input_omits_empty_optionals() {
        let input = LivroInput {
            titulo: "Iracema".into(),
            subtitulo: None,
            sinopse: None,
            editora: "B. L. Garnier".into(),
            isbn: None,
            data_de_publicacao: Some("1865-05-01".into()),
            ano_de_publicacao: None,
            preco: 19.5,
            desconto: None,
            quantidade: 4,
            autor: vec![1],
            categoria: vec![],
            genero: vec![2, 3],
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["preco"], json!("19.50"));
        assert!(value.get("ISBN").is_none());
        assert!(value.get("desconto").is_none());
        assert_eq!(value["genero"], json!([2, 3]));
    }
}
