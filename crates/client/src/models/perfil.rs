use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Masculino,
    #[serde(rename = "F")]
    Feminino,
    #[serde(rename = "NB")]
    NaoBinario,
    #[serde(rename = "PND")]
    PrefiroNaoDizer,
    #[default]
    #[serde(rename = "NI")]
    NaoInformado,
}

impl Gender {
    pub const ALL: [Gender; 5] = [
        Gender::Masculino,
        Gender::Feminino,
        Gender::NaoBinario,
        Gender::PrefiroNaoDizer,
        Gender::NaoInformado,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Gender::Masculino => "M",
            Gender::Feminino => "F",
            Gender::NaoBinario => "NB",
            Gender::PrefiroNaoDizer => "PND",
            Gender::NaoInformado => "NI",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Gender::ALL.into_iter().find(|g| g.code() == code.trim())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endereco {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub cep: String,
    pub rua: String,
    pub numero: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complemento: Option<String>,
    pub bairro: String,
    pub cidade: String,
    pub uf: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perfil {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default, rename = "CPF", alias = "cpf")]
    pub cpf: Option<String>,
    #[serde(default)]
    pub genero: Gender,
    #[serde(default)]
    pub data_nascimento: Option<String>,
    #[serde(default)]
    pub foto_de_perfil: Option<String>,
    #[serde(default)]
    pub endereco: Option<Endereco>,
}

/// Editable user fields, nested under `user` in the update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DadosUsuario {
    pub nome: String,
    pub genero: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(default, rename = "CPF", skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<String>,
}

/// Body of `PATCH /clientes/perfil/`. Absent parts are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfilUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<DadosUsuario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endereco: Option<Endereco>,
}
