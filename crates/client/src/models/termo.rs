use serde::{Deserialize, Serialize};

/// An author, category or genre. All three share `{id, nome}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termo {
    pub id: u64,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermoInput {
    pub nome: String,
}

/// Which name list a [`Termo`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomia {
    Autores,
    Categorias,
    Generos,
}

impl Taxonomia {
    pub const ALL: [Taxonomia; 3] = [Taxonomia::Autores, Taxonomia::Categorias, Taxonomia::Generos];

    /// Backend collection path.
    pub fn path(self) -> &'static str {
        match self {
            Taxonomia::Autores => "autores/",
            Taxonomia::Categorias => "categorias/",
            Taxonomia::Generos => "generos/",
        }
    }

    pub fn segment(self) -> &'static str {
        self.path().trim_end_matches('/')
    }

    /// Singular noun for messages.
    pub fn singular(self) -> &'static str {
        match self {
            Taxonomia::Autores => "autor",
            Taxonomia::Categorias => "categoria",
            Taxonomia::Generos => "gênero",
        }
    }
}
