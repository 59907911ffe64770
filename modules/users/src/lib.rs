// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::Users;

// === INTERNAL MODULES ===
// Exposed for integration tests and the server binary's wiring only.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
