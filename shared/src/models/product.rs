//! Product and stock models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product in the catalog
///
/// `current_stock` is the only mutable aggregate in the system: every change
/// goes through a signed delta that is mirrored by a movement record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub current_stock: i32,
    pub minimum_stock: i32,
    pub unit: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product is at or below its reorder threshold
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }
}

/// Aggregate valuation of the active catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryValuation {
    pub total_products: i64,
    pub total_units: i64,
    pub purchase_value: Decimal,
    pub sale_value: Decimal,
    pub potential_margin: Decimal,
}
