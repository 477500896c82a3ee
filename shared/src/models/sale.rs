//! Sale header and line models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DocumentType, PaymentMethod, SaleStatus};

/// A sale header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub number: String,
    pub customer_id: Uuid,
    pub user_id: Uuid,
    pub sale_date: NaiveDate,
    pub document_type: DocumentType,
    pub status: SaleStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A sale line, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
}

/// Summary returned after registering a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleSummary {
    pub sale_id: Uuid,
    pub number: String,
    pub customer: String,
    pub sale_date: NaiveDate,
    pub document_type: DocumentType,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub line_count: usize,
    pub status: SaleStatus,
}
