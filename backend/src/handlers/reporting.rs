//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use shared::models::InventoryValuation;

use crate::error::AppResult;
use crate::services::reporting::{DashboardMetrics, ProductRotation};
use crate::services::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct RotationQuery {
    pub days: Option<i32>,
}

/// Dashboard metrics
pub async fn dashboard_metrics(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.db);
    let metrics = service.dashboard_metrics().await?;
    Ok(Json(metrics))
}

/// Inventory valuation at purchase and sale prices
pub async fn inventory_valuation(
    State(state): State<AppState>,
) -> AppResult<Json<InventoryValuation>> {
    let service = ReportingService::new(state.db);
    let valuation = service.inventory_valuation().await?;
    Ok(Json(valuation))
}

/// Product rotation report (default 30 days)
pub async fn product_rotation(
    State(state): State<AppState>,
    Query(query): Query<RotationQuery>,
) -> AppResult<Json<Vec<ProductRotation>>> {
    let service = ReportingService::new(state.db);
    let rotation = service.product_rotation(query.days.unwrap_or(30)).await?;
    Ok(Json(rotation))
}
