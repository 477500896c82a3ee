//! Inventory movement model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{MovementCause, MovementDirection};

/// One append-only stock-change record
///
/// Movements are never updated or deleted. The before/after snapshots are
/// written in the same transaction as the stock mutation they describe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub direction: MovementDirection,
    pub quantity: i32,
    pub cause: MovementCause,
    pub reason: Option<String>,
    pub reference_id: Option<Uuid>,
    pub stock_before: i32,
    pub stock_after: i32,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
