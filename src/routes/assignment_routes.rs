use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::schedule_controller::ScheduleController;
use crate::dto::schedule_dto::{ApproveAssignmentRequest, ChangeEndDateRequest};
use crate::dto::ApiResponse;
use crate::models::DriverAssignment;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_assignment_router() -> Router<AppState> {
    Router::new()
        .route("/:id", delete(delete_assignment))
        .route("/:id/approve", post(approve_assignment))
        .route("/:id/extend", post(extend_assignment))
        .route("/:id/shorten", post(shorten_assignment))
}

async fn approve_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveAssignmentRequest>,
) -> Result<Json<ApiResponse<DriverAssignment>>, AppError> {
    Ok(Json(ScheduleController::new(&state).approve_assignment(id, request).await?))
}

async fn extend_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeEndDateRequest>,
) -> Result<Json<ApiResponse<DriverAssignment>>, AppError> {
    Ok(Json(ScheduleController::new(&state).extend_assignment(id, request).await?))
}

async fn shorten_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeEndDateRequest>,
) -> Result<Json<ApiResponse<DriverAssignment>>, AppError> {
    Ok(Json(ScheduleController::new(&state).shorten_assignment(id, request).await?))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(ScheduleController::new(&state).delete_assignment(id).await?))
}
