use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credenciais {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecuperacaoSenha {
    pub email: String,
}

/// The signed-in user as returned at login.
///
/// The staff flags are optional: older backends omit them, and a missing
/// flag means "ask `/admin/user_info/`", not "false".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usuario {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

impl Usuario {
    /// Both flags present and false. Anything else needs the backend.
    pub fn known_non_admin(&self) -> bool {
        self.is_staff == Some(false) && self.is_superuser == Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sessao {
    #[serde(alias = "access", alias = "key")]
    pub token: String,
    #[serde(default, alias = "usuario")]
    pub user: Option<Usuario>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistroAdmin {
    pub id: u64,
    #[serde(default)]
    pub rg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserInfo {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub date_joined: Option<String>,
    #[serde(default)]
    pub admin_record: Option<RegistroAdmin>,
}

impl AdminUserInfo {
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser || self.admin_record.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub total_livros: u64,
    #[serde(default)]
    pub total_clientes: u64,
    #[serde(default)]
    pub total_pedidos: u64,
    #[serde(default)]
    pub total_generos: u64,
    #[serde(default)]
    pub total_categorias: u64,
    #[serde(default)]
    pub total_administradores: u64,
}
