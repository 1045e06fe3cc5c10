//! Typed client for the eLibros backend REST API.
//!
//! The backend owns pricing, stock, payment and order state. This crate only
//! mirrors its records and paths; every mutation is followed by a re-fetch on
//! the caller's side.

pub mod api;
pub mod cep;
pub mod client;
pub mod error;
pub mod listing;
pub mod lookup;
pub mod models;
pub mod money;

pub use cep::{Cep, InvalidCep};
pub use client::{ApiClient, Auth, ClientConfig};
pub use error::{ApiError, Result};
pub use listing::Listing;
pub use lookup::{qr_code_url, CepLookup, EnderecoSugerido};
