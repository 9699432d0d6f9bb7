use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::schedule_controller::ScheduleController;
use crate::dto::schedule_dto::{CreateAssignmentRequest, CreateScheduleRequest};
use crate::dto::ApiResponse;
use crate::models::{DriverAssignment, Schedule};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_schedule_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_schedule))
        .route("/:id", get(get_schedule).delete(delete_schedule))
        .route("/:id/activate", post(activate_schedule))
        .route("/:id/deactivate", post(deactivate_schedule))
        .route("/:id/assignments", post(create_assignment).get(list_assignments))
}

async fn create_schedule(
    State(state): State<AppState>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    Ok(Json(ScheduleController::new(&state).create(request).await?))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    let schedule = ScheduleController::new(&state).get(id).await?;
    Ok(Json(ApiResponse::success(schedule)))
}

async fn activate_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    Ok(Json(ScheduleController::new(&state).activate(id).await?))
}

async fn deactivate_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Schedule>>, AppError> {
    Ok(Json(ScheduleController::new(&state).deactivate(id).await?))
}

async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(ScheduleController::new(&state).delete(id).await?))
}

async fn create_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateAssignmentRequest>,
) -> Result<Json<ApiResponse<DriverAssignment>>, AppError> {
    Ok(Json(ScheduleController::new(&state).create_assignment(id, request).await?))
}

async fn list_assignments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<DriverAssignment>>>, AppError> {
    let assignments = ScheduleController::new(&state).list_assignments(id).await?;
    Ok(Json(ApiResponse::success(assignments)))
}
