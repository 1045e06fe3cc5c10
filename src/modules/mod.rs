pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod profile;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

use elibros_kernel::ModuleRegistry;

use crate::state::AppState;

/// Register every page module with the registry
pub fn register_all(registry: &mut ModuleRegistry, state: &AppState) {
    registry.register_core(status::create_module(state.clone()));
    registry.register_core(auth::create_module(state.clone()));

    registry.register_custom(catalog::create_module(state.clone()));
    registry.register_custom(cart::create_module(state.clone()));
    registry.register_custom(checkout::create_module(state.clone()));
    registry.register_custom(orders::create_module(state.clone()));
    registry.register_custom(profile::create_module(state.clone()));
    registry.register_custom(admin::create_module(state.clone()));
}
