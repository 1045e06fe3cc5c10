//! Core traits, settings, and the module registry.

pub mod module;
pub mod openapi;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
pub use settings::Settings;
