//! Sistema de manejo de errores
//!
//! Este módulo define los errores de dominio (transiciones inválidas, periodos
//! inválidos, abordaje) y los errores de la aplicación con su conversión a
//! respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::trip::{TripAction, TripStatus};

/// Errores de las reglas de negocio del núcleo
///
/// Son valores recuperables: ninguna operación que los devuelve modifica el estado.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cannot {action} trip: current status is {from}")]
    InvalidTransition { action: TripAction, from: TripStatus },

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("invalid weekday {0}: must be between 1 (Monday) and 7 (Sunday)")]
    InvalidWeekday(u32),

    #[error("passenger {0} has not boarded")]
    NotBoarded(Uuid),

    #[error("passenger {0} is marked as no-show")]
    PassengerNoShow(Uuid),

    #[error("passenger {0} has already boarded")]
    AlreadyBoarded(Uuid),

    #[error("passenger {0} has already alighted")]
    AlreadyAlighted(Uuid),

    #[error("passenger {passenger_id} is not on trip {trip_id}")]
    PassengerNotOnTrip { trip_id: Uuid, passenger_id: Uuid },

    #[error("trip {trip_id} is {status}; passenger records are frozen")]
    TripClosed { trip_id: Uuid, status: TripStatus },
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }
}

impl DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::InvalidPeriod(_) | DomainError::InvalidWeekday(_) => StatusCode::BAD_REQUEST,
            DomainError::PassengerNotOnTrip { .. } => StatusCode::NOT_FOUND,
            DomainError::InvalidTransition { .. }
            | DomainError::NotBoarded(_)
            | DomainError::PassengerNoShow(_)
            | DomainError::AlreadyBoarded(_)
            | DomainError::AlreadyAlighted(_)
            | DomainError::TripClosed { .. } => StatusCode::CONFLICT,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DomainError::InvalidPeriod(_) => "INVALID_PERIOD",
            DomainError::InvalidWeekday(_) => "INVALID_WEEKDAY",
            DomainError::NotBoarded(_) => "NOT_BOARDED",
            DomainError::PassengerNoShow(_) => "PASSENGER_NO_SHOW",
            DomainError::AlreadyBoarded(_) => "ALREADY_BOARDED",
            DomainError::AlreadyAlighted(_) => "ALREADY_ALIGHTED",
            DomainError::PassengerNotOnTrip { .. } => "PASSENGER_NOT_ON_TRIP",
            DomainError::TripClosed { .. } => "TRIP_CLOSED",
        }
    }
}

impl AppError {
    /// Código HTTP asociado a cada variante
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Domain(e) => e.status_code(),
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ErrorResponse {
                    error: "Database Error".to_string(),
                    message: "An error occurred while accessing the database".to_string(),
                    details: Some(json!({ "sql_error": e.to_string() })),
                    code: Some("DB_ERROR".to_string()),
                }
            }

            AppError::Validation(e) => {
                tracing::debug!("Validation error: {}", e);
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: "The provided data is invalid".to_string(),
                    details: Some(json!(e)),
                    code: Some("VALIDATION_ERROR".to_string()),
                }
            }

            AppError::Domain(e) => {
                tracing::debug!("Domain rule rejected request: {}", e);
                ErrorResponse::new("Domain Error", e.to_string(), e.code())
            }

            AppError::Forbidden(msg) => {
                tracing::warn!("Forbidden access: {}", msg);
                ErrorResponse::new("Forbidden", msg, "FORBIDDEN")
            }

            AppError::NotFound(msg) => ErrorResponse::new("Not Found", msg, "NOT_FOUND"),

            AppError::Conflict(msg) => ErrorResponse::new("Conflict", msg, "CONFLICT"),

            AppError::BadRequest(msg) => ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"),

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    details: Some(json!({ "internal_error": msg })),
                    code: Some("INTERNAL_ERROR".to_string()),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &Uuid) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_conflict_or_not_found() {
        let transition = AppError::from(DomainError::InvalidTransition {
            action: TripAction::Start,
            from: TripStatus::Completed,
        });
        assert_eq!(transition.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            transition.to_string(),
            "cannot start trip: current status is completed"
        );

        let missing = AppError::from(DomainError::PassengerNotOnTrip {
            trip_id: Uuid::nil(),
            passenger_id: Uuid::nil(),
        });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let period = AppError::from(DomainError::InvalidPeriod("end before start".into()));
        assert_eq!(period.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_helpers_build_messages() {
        let id = Uuid::nil();
        let err = not_found_error("Trip", &id);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("00000000-0000-0000-0000-000000000000"));

        let err = forbidden_error("start trip", "not assigned crew");
        assert_eq!(err.to_string(), "Forbidden: Cannot start trip: not assigned crew");
    }
}
