//! HTTP handlers for purchase endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{Purchase, PurchaseSummary};
use shared::types::PurchaseStatus;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchase::{
    PurchaseListRow, PurchasePeriodStats, PurchaseWithLines, ReceivePurchaseInput,
    RegisterPurchaseInput,
};
use crate::services::PurchaseService;
use crate::AppState;

#[derive(Deserialize)]
pub struct PurchaseStatusQuery {
    pub status: Option<PurchaseStatus>,
}

#[derive(Deserialize)]
pub struct PurchasePeriodQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Register a purchase (state `pendiente`, stock untouched)
pub async fn register_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RegisterPurchaseInput>,
) -> AppResult<Json<PurchaseSummary>> {
    let service = PurchaseService::new(state.db);
    let summary = service
        .register_purchase(current_user.0.user_id, input)
        .await?;
    Ok(Json(summary))
}

/// Receive a pending purchase, applying its stock
pub async fn receive_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
    Json(input): Json<ReceivePurchaseInput>,
) -> AppResult<Json<Purchase>> {
    let service = PurchaseService::new(state.db);
    let purchase = service
        .receive_purchase(purchase_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(purchase))
}

/// Cancel a pending purchase
pub async fn cancel_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<Purchase>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.cancel_purchase(purchase_id).await?;
    Ok(Json(purchase))
}

/// Get a purchase with its lines
pub async fn get_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.get_purchase(purchase_id).await?;
    Ok(Json(purchase))
}

/// List purchases, optionally filtered by state
pub async fn list_purchases(
    State(state): State<AppState>,
    Query(query): Query<PurchaseStatusQuery>,
) -> AppResult<Json<Vec<PurchaseListRow>>> {
    let service = PurchaseService::new(state.db);
    let purchases = service.list_purchases(query.status).await?;
    Ok(Json(purchases))
}

/// Purchase statistics over a period
pub async fn purchase_statistics(
    State(state): State<AppState>,
    Query(query): Query<PurchasePeriodQuery>,
) -> AppResult<Json<PurchasePeriodStats>> {
    let service = PurchaseService::new(state.db);
    let stats = service
        .period_statistics(query.start_date, query.end_date)
        .await?;
    Ok(Json(stats))
}
