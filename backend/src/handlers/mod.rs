//! HTTP handlers for the Tienda POS backend

mod auth;
mod category;
mod customer;
mod health;
mod inventory;
mod product;
mod purchase;
mod reporting;
mod sale;
mod supplier;

pub use auth::*;
pub use category::*;
pub use customer::*;
pub use health::*;
pub use inventory::*;
pub use product::*;
pub use purchase::*;
pub use reporting::*;
pub use sale::*;
pub use supplier::*;
