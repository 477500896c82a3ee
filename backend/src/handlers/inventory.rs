//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use shared::models::Movement;
use shared::types::UserRole;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::inventory::{AdjustInventoryInput, MovementFilter, MovementWithDetails};
use crate::services::InventoryService;
use crate::AppState;

/// Manually adjust a product's stock (admin and warehouse roles only)
pub async fn adjust_inventory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustInventoryInput>,
) -> AppResult<Json<Movement>> {
    if !(current_user.0.is_admin() || current_user.0.has_role(UserRole::Almacenero)) {
        return Err(AppError::InsufficientPermissions);
    }

    let service = InventoryService::new(state.db);
    let movement = service
        .adjust_inventory(current_user.0.user_id, input)
        .await?;
    Ok(Json(movement))
}

/// Movement history, filtered by product, direction, or date range
pub async fn movement_history(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<MovementWithDetails>>> {
    let service = InventoryService::new(state.db);
    let movements = service.movement_history(filter).await?;
    Ok(Json(movements))
}
