use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use domain::{DomainError, EmployeeDraft, EmployeeFilters, OperationResult};
use tracing::{error, info};

use crate::routes::AppState;

/// Business failures keep `status`; only service faults become 500.
fn respond(status: StatusCode, action: &str, outcome: Result<OperationResult, DomainError>) -> Response {
    match outcome {
        Ok(result) => (status, Json(result)).into_response(),
        Err(e) => {
            error!("Failed to {} employee: {}", action, e);
            let body = OperationResult::failure(format!("Failed to {} employee; {}", action, e));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(body): Json<EmployeeDraft>,
) -> impl IntoResponse {
    info!("📥 Creating employee {:?}", body.email);
    let outcome = state.employee_app.employee_service.create_employee(body).await;
    respond(StatusCode::CREATED, "create", outcome)
}

pub async fn list_employees(
    State(state): State<AppState>,
    Query(filters): Query<EmployeeFilters>,
) -> impl IntoResponse {
    let outcome = state
        .employee_app
        .employee_service
        .get_all_employees(Some(&filters))
        .await;
    respond(StatusCode::OK, "list", outcome)
}

pub async fn get_employee(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let outcome = state.employee_app.employee_service.get_employee_by_id(&id).await;
    respond(StatusCode::OK, "get", outcome)
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<EmployeeDraft>,
) -> impl IntoResponse {
    let outcome = state
        .employee_app
        .employee_service
        .update_employee(&id, body)
        .await;
    respond(StatusCode::OK, "update", outcome)
}

pub async fn delete_employee(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let outcome = state.employee_app.employee_service.delete_employee(&id).await;
    respond(StatusCode::OK, "delete", outcome)
}

pub async fn root() -> &'static str {
    "Hello from the employee API!"
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
