//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{Sale, SaleSummary};
use shared::types::SaleStatus;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{
    RegisterSaleInput, SaleListRow, SalesPeriodStats, SaleWithLines,
};
use crate::services::SaleService;
use crate::AppState;

#[derive(Deserialize)]
pub struct SaleStatusQuery {
    pub status: Option<SaleStatus>,
}

#[derive(Deserialize)]
pub struct DayQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct PeriodQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Register a sale
pub async fn register_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RegisterSaleInput>,
) -> AppResult<Json<SaleSummary>> {
    let service = SaleService::new(state.db);
    let summary = service.register_sale(current_user.0.user_id, input).await?;
    Ok(Json(summary))
}

/// Annul a sale, returning its stock
pub async fn annul_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    let sale = service.annul_sale(sale_id, current_user.0.user_id).await?;
    Ok(Json(sale))
}

/// Get a sale with its lines
pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleWithLines>> {
    let service = SaleService::new(state.db);
    let sale = service.get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// List sales, optionally filtered by state
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SaleStatusQuery>,
) -> AppResult<Json<Vec<SaleListRow>>> {
    let service = SaleService::new(state.db);
    let sales = service.list_sales(query.status).await?;
    Ok(Json(sales))
}

/// Completed sales of a day
pub async fn sales_of_day(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Vec<SaleListRow>>> {
    let service = SaleService::new(state.db);
    let sales = service.sales_of_day(query.date).await?;
    Ok(Json(sales))
}

/// Sales statistics over a period
pub async fn sales_statistics(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<SalesPeriodStats>> {
    let service = SaleService::new(state.db);
    let stats = service
        .period_statistics(query.start_date, query.end_date)
        .await?;
    Ok(Json(stats))
}
