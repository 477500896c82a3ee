//! Shared types and models for the Tienda POS platform
//!
//! This crate contains the domain types shared between the backend and
//! integration tests: entity models, order enums, the draft-order builder,
//! order numbering, and pure validation helpers. It performs no I/O.

pub mod draft;
pub mod models;
pub mod numbering;
pub mod types;
pub mod validation;

pub use draft::*;
pub use models::*;
pub use numbering::*;
pub use types::*;
pub use validation::*;
