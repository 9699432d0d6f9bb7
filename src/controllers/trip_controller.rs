use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::dto::trip_dto::{
    CancelTripRequest, NoShowRequest, PassengerActionRequest, TripResponse, TripTransitionRequest,
};
use crate::dto::ApiResponse;
use crate::models::CrewMember;
use crate::services::trip_generator::GenerationReport;
use crate::services::{TripGenerationService, TripService};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Acción sobre el registro de un pasajero dentro del viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerAction {
    Board,
    Alight,
    ClearNoShow,
}

pub struct TripController {
    trips: TripService,
    generation: TripGenerationService,
}

impl TripController {
    pub fn new(state: &AppState) -> Self {
        Self {
            trips: state.trip_service.clone(),
            generation: state.generation_service.clone(),
        }
    }

    pub async fn generate(&self, date: NaiveDate) -> Result<ApiResponse<GenerationReport>, AppError> {
        let report = self.generation.generate_trips_for_date(date).await?;
        let message = format!(
            "{} viajes creados, {} schedules omitidos para {}",
            report.created.len(),
            report.skipped.len(),
            date
        );
        Ok(ApiResponse::success_with_message(report, message))
    }

    pub async fn get(&self, id: Uuid) -> Result<TripResponse, AppError> {
        Ok(self.trips.get(id).await?.into())
    }

    pub async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<TripResponse>, AppError> {
        let trips = self.trips.list_for_date(date).await?;
        Ok(trips.into_iter().map(TripResponse::from).collect())
    }

    pub async fn start(&self, id: Uuid, request: TripTransitionRequest) -> Result<ApiResponse<TripResponse>, AppError> {
        request.validate()?;
        let trip = self.trips.start(id, request.actor, request.location).await?;
        Ok(ApiResponse::success_with_message(trip.into(), "Viaje iniciado".to_string()))
    }

    pub async fn complete(
        &self,
        id: Uuid,
        request: TripTransitionRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        request.validate()?;
        let trip = self.trips.complete(id, request.actor, request.location).await?;
        Ok(ApiResponse::success_with_message(trip.into(), "Viaje completado".to_string()))
    }

    pub async fn cancel(&self, id: Uuid, request: CancelTripRequest) -> Result<ApiResponse<TripResponse>, AppError> {
        request.validate()?;
        let trip = self
            .trips
            .cancel(id, request.actor, request.reason.trim().to_string())
            .await?;
        Ok(ApiResponse::success_with_message(trip.into(), "Viaje cancelado".to_string()))
    }

    pub async fn passenger_action(
        &self,
        id: Uuid,
        passenger_id: Uuid,
        action: PassengerAction,
        request: PassengerActionRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        let actor: CrewMember = request.actor;
        let (trip, message) = match action {
            PassengerAction::Board => (self.trips.board(id, actor, passenger_id).await?, "Pasajero a bordo"),
            PassengerAction::Alight => (self.trips.alight(id, actor, passenger_id).await?, "Pasajero bajado"),
            PassengerAction::ClearNoShow => (
                self.trips.clear_no_show(id, actor, passenger_id).await?,
                "No-show corregido",
            ),
        };
        Ok(ApiResponse::success_with_message(trip.into(), message.to_string()))
    }

    pub async fn mark_no_show(
        &self,
        id: Uuid,
        passenger_id: Uuid,
        request: NoShowRequest,
    ) -> Result<ApiResponse<TripResponse>, AppError> {
        request.validate()?;
        let trip = self
            .trips
            .mark_no_show(id, request.actor, passenger_id, request.reason.trim().to_string())
            .await?;
        Ok(ApiResponse::success_with_message(trip.into(), "Pasajero marcado como no-show".to_string()))
    }
}
