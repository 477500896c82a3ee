//! Purchase header and line models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PurchaseStatus;

/// A purchase header
///
/// Registration leaves the purchase in `pendiente`; stock only moves when the
/// purchase is received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub number: String,
    pub supplier_id: Uuid,
    pub user_id: Uuid,
    pub purchase_date: NaiveDate,
    pub status: PurchaseStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub received_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A purchase line, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Summary returned after registering a purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseSummary {
    pub purchase_id: Uuid,
    pub number: String,
    pub supplier: String,
    pub purchase_date: NaiveDate,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub line_count: usize,
    pub status: PurchaseStatus,
}
