//! Database models for the Tienda POS backend
//!
//! Re-exports models from the shared crate; service-specific row and
//! projection types live next to the services that use them.

pub use shared::models::*;
