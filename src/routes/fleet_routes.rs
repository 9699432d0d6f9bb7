use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::fleet_controller::FleetController;
use crate::dto::fleet_dto::{SaveAttendantRequest, SaveDriverRequest, SaveVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::{Attendant, Driver, Vehicle};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_fleet_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles/:id", get(get_vehicle).put(save_vehicle))
        .route("/drivers/:id", get(get_driver).put(save_driver))
        .route("/attendants/:id", get(get_attendant).put(save_attendant))
}

async fn save_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    Ok(Json(FleetController::new(&state).save_vehicle(id, request).await?))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let vehicle = FleetController::new(&state).get_vehicle(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

async fn save_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveDriverRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    Ok(Json(FleetController::new(&state).save_driver(id, request).await?))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let driver = FleetController::new(&state).get_driver(id).await?;
    Ok(Json(ApiResponse::success(driver)))
}

async fn save_attendant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveAttendantRequest>,
) -> Result<Json<ApiResponse<Attendant>>, AppError> {
    Ok(Json(FleetController::new(&state).save_attendant(id, request).await?))
}

async fn get_attendant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Attendant>>, AppError> {
    let attendant = FleetController::new(&state).get_attendant(id).await?;
    Ok(Json(ApiResponse::success(attendant)))
}
