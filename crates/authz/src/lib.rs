//! Session extraction and admin guards.
//!
//! The backend issues and validates tokens; this crate only carries the
//! bearer through and asks the backend who it belongs to.

mod admin;
mod session;

pub use admin::{is_admin, AdminSession};
pub use session::{auth_of, Session};
