//! HTTP handlers for customer endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared::models::Customer;

use crate::error::AppResult;
use crate::services::customer::{CreateCustomerInput, UpdateCustomerInput};
use crate::services::CustomerService;
use crate::AppState;

/// List active customers
pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    let service = CustomerService::new(state.db);
    let customers = service.list_active().await?;
    Ok(Json(customers))
}

/// Get a customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.get(customer_id).await?;
    Ok(Json(customer))
}

/// Find a customer by document number
pub async fn get_customer_by_document(
    State(state): State<AppState>,
    Path(document_number): Path<String>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.find_by_document(&document_number).await?;
    Ok(Json(customer))
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.create(input).await?;
    Ok(Json(customer))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.update(customer_id, input).await?;
    Ok(Json(customer))
}

/// Deactivate a customer
pub async fn deactivate_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CustomerService::new(state.db);
    service.deactivate(customer_id).await?;
    Ok(Json(()))
}
