//! Records mirrored from the backend's response shapes.
//!
//! Nothing here enforces business rules; the backend is the source of truth
//! and every mutation is followed by a re-fetch.

mod auth;
mod carrinho;
mod cupom;
mod frete;
mod livro;
mod pedido;
mod perfil;
mod termo;

pub use auth::{
    AdminStats, AdminUserInfo, Credenciais, RecuperacaoSenha, RegistroAdmin, Sessao, Usuario,
};
pub use carrinho::{Carrinho, ItemCarrinho, LivroCarrinho, NovoItem, QuantidadeItem};
pub use cupom::{Cupom, CupomFiltro, CupomInput, CupomStatus, TipoValor};
pub use frete::{
    FreteCarrinhoRequest, FreteGenericoRequest, FreteLivroRequest, OpcaoFrete, ResultadoFrete,
};
pub use livro::{Avaliacao, Livro, LivroFiltro, LivroInput, LivroResumo, NovaAvaliacao};
pub use pedido::{
    Cancelamento, ClientePedido, CupomUsado, EnderecoEntrega, ItemPedido, OrderStatus, Pedido,
    PedidoCreate, PedidoFiltro, PedidoStats, PedidoUpdate, Scope, UnknownStatus,
};
pub use perfil::{DadosUsuario, Endereco, Gender, Perfil, PerfilUpdate};
pub use termo::{Taxonomia, Termo, TermoInput};

/// Appends `(key, value)` to a query when `value` is present.
pub(crate) fn push_query(
    query: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<impl ToString>,
) {
    if let Some(value) = value {
        let value = value.to_string();
        if !value.trim().is_empty() {
            query.push((key, value));
        }
    }
}
