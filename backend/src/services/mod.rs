//! Business logic services for the Tienda POS backend

pub mod auth;
pub mod category;
pub mod customer;
pub mod inventory;
pub mod product;
pub mod purchase;
pub mod reporting;
pub mod sale;
pub mod supplier;

pub use auth::AuthService;
pub use category::CategoryService;
pub use customer::CustomerService;
pub use inventory::InventoryService;
pub use product::ProductService;
pub use purchase::PurchaseService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use supplier::SupplierService;
