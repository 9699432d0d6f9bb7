use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{CrewMember, Location, PassengerSummary, Trip, TripPassenger, TripStatus};
use crate::utils::validation::validate_not_blank;

// Request para generar los viajes de un día
#[derive(Debug, Deserialize)]
pub struct GenerateTripsRequest {
    pub date: NaiveDate,
}

// Query de listado por fecha
#[derive(Debug, Deserialize)]
pub struct TripsByDateQuery {
    pub date: NaiveDate,
}

// Request para iniciar o completar un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct TripTransitionRequest {
    pub actor: CrewMember,
    #[validate]
    pub location: Option<Location>,
}

// Request para cancelar un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CancelTripRequest {
    pub actor: CrewMember,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub reason: String,
}

// Request para abordar, bajar o corregir un no-show
#[derive(Debug, Deserialize)]
pub struct PassengerActionRequest {
    pub actor: CrewMember,
}

// Request para marcar un no-show
#[derive(Debug, Deserialize, Validate)]
pub struct NoShowRequest {
    pub actor: CrewMember,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub reason: String,
}

// Response de viaje
#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub date: NaiveDate,
    pub status: TripStatus,
    pub vehicle_id: Uuid,
    pub assigned_driver_id: Uuid,
    pub assigned_attendant_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub started_by: Option<String>,
    pub actual_start_location: Option<Location>,
    pub actual_end_location: Option<Location>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub duration_minutes: Option<i64>,
    pub passengers: Vec<TripPassenger>,
    pub passenger_summary: PassengerSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        let duration_minutes = trip.duration_minutes();
        let passenger_summary = trip.passenger_summary();
        Self {
            id: trip.id,
            schedule_id: trip.schedule_id,
            date: trip.date,
            status: trip.status,
            vehicle_id: trip.vehicle_id,
            assigned_driver_id: trip.assigned_driver_id,
            assigned_attendant_id: trip.assigned_attendant_id,
            started_at: trip.started_at,
            completed_at: trip.completed_at,
            started_by: trip.started_by,
            actual_start_location: trip.actual_start_location,
            actual_end_location: trip.actual_end_location,
            cancelled_at: trip.cancelled_at,
            cancellation_reason: trip.cancellation_reason,
            duration_minutes,
            passengers: trip.passengers,
            passenger_summary,
            created_at: trip.created_at,
            updated_at: trip.updated_at,
        }
    }
}
