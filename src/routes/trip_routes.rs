use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::trip_controller::{PassengerAction, TripController};
use crate::dto::trip_dto::{
    CancelTripRequest, GenerateTripsRequest, NoShowRequest, PassengerActionRequest, TripResponse,
    TripTransitionRequest, TripsByDateQuery,
};
use crate::dto::ApiResponse;
use crate::services::trip_generator::GenerationReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips))
        .route("/generate", post(generate_trips))
        .route("/:id", get(get_trip))
        .route("/:id/start", post(start_trip))
        .route("/:id/complete", post(complete_trip))
        .route("/:id/cancel", post(cancel_trip))
        .route("/:id/passengers/:passenger_id/board", post(board_passenger))
        .route("/:id/passengers/:passenger_id/alight", post(alight_passenger))
        .route("/:id/passengers/:passenger_id/no-show", post(mark_no_show))
        .route("/:id/passengers/:passenger_id/clear-no-show", post(clear_no_show))
}

async fn generate_trips(
    State(state): State<AppState>,
    Json(request): Json<GenerateTripsRequest>,
) -> Result<Json<ApiResponse<GenerationReport>>, AppError> {
    let response = TripController::new(&state).generate(request.date).await?;
    Ok(Json(response))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripsByDateQuery>,
) -> Result<Json<ApiResponse<Vec<TripResponse>>>, AppError> {
    let trips = TripController::new(&state).list_for_date(query.date).await?;
    Ok(Json(ApiResponse::success(trips)))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let trip = TripController::new(&state).get(id).await?;
    Ok(Json(ApiResponse::success(trip)))
}

async fn start_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TripTransitionRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    Ok(Json(TripController::new(&state).start(id, request).await?))
}

async fn complete_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TripTransitionRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    Ok(Json(TripController::new(&state).complete(id, request).await?))
}

async fn cancel_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelTripRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    Ok(Json(TripController::new(&state).cancel(id, request).await?))
}

async fn board_passenger(
    State(state): State<AppState>,
    Path((id, passenger_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<PassengerActionRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let response = TripController::new(&state)
        .passenger_action(id, passenger_id, PassengerAction::Board, request)
        .await?;
    Ok(Json(response))
}

async fn alight_passenger(
    State(state): State<AppState>,
    Path((id, passenger_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<PassengerActionRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let response = TripController::new(&state)
        .passenger_action(id, passenger_id, PassengerAction::Alight, request)
        .await?;
    Ok(Json(response))
}

async fn mark_no_show(
    State(state): State<AppState>,
    Path((id, passenger_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<NoShowRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    Ok(Json(TripController::new(&state).mark_no_show(id, passenger_id, request).await?))
}

async fn clear_no_show(
    State(state): State<AppState>,
    Path((id, passenger_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<PassengerActionRequest>,
) -> Result<Json<ApiResponse<TripResponse>>, AppError> {
    let response = TripController::new(&state)
        .passenger_action(id, passenger_id, PassengerAction::ClearNoShow, request)
        .await?;
    Ok(Json(response))
}
