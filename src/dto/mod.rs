//! DTOs de la API HTTP
//!
//! Requests validados con `validator` y responses serializables. Los textos
//! dirigidos al usuario se quedan en esta capa.

pub mod api_response;
pub mod fleet_dto;
pub mod schedule_dto;
pub mod trip_dto;

pub use api_response::ApiResponse;
