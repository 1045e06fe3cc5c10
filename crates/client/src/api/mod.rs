//! One file per backend resource. Every method is a thin, typed wrapper over
//! a single path; orchestration lives in the page modules.

mod auth;
mod carrinho;
mod catalogo;
mod cupons;
mod frete;
mod pedidos;
mod perfil;
mod termos;

/// Placeholder body type for requests sent without one.
pub(crate) const NO_BODY: Option<&()> = None;
