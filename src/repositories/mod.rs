//! Repositorios
//!
//! Contratos de persistencia que consume el núcleo y sus dos implementaciones:
//! PostgreSQL (sqlx) y memoria (pruebas y `STORAGE_BACKEND=memory`).

pub mod driver_assignment_repository;
pub mod fleet_repository;
pub mod memory;
pub mod passenger_repository;
pub mod schedule_repository;
pub mod trip_repository;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Attendant, Driver, DriverAssignment, Passenger, Schedule, Trip, Vehicle};
use crate::utils::errors::AppResult;

pub use driver_assignment_repository::PgDriverAssignmentRepository;
pub use fleet_repository::PgFleetRepository;
pub use memory::MemoryStore;
pub use passenger_repository::PgPassengerRepository;
pub use schedule_repository::PgScheduleRepository;
pub use trip_repository::PgTripRepository;

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Schedules que podrían circular en `date`; puede devolver de más
    async fn list_candidates_for_date(&self, date: NaiveDate) -> AppResult<Vec<Schedule>>;
    async fn get(&self, id: Uuid) -> AppResult<Option<Schedule>>;
    async fn create(&self, schedule: &Schedule) -> AppResult<()>;
    async fn update(&self, schedule: &Schedule) -> AppResult<()>;
}

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Todas las sustituciones no eliminadas del schedule
    async fn list_overrides_for_schedule(&self, schedule_id: Uuid) -> AppResult<Vec<DriverAssignment>>;
    async fn get(&self, id: Uuid) -> AppResult<Option<DriverAssignment>>;
    /// `create` y `update` devuelven `Conflict` si la sustitución viva se
    /// solapa con otra del mismo schedule y rol; comprobación y escritura son
    /// atómicas
    async fn create(&self, assignment: &DriverAssignment) -> AppResult<()>;
    async fn update(&self, assignment: &DriverAssignment) -> AppResult<()>;
}

/// Resultado de insertar un viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// Ya existía un viaje vivo para (schedule, fecha)
    Duplicate,
}

#[async_trait]
pub trait TripStore: Send + Sync {
    /// Ids de schedule que ya tienen viaje vivo en `date`
    async fn existing_trip_keys_for_date(&self, date: NaiveDate) -> AppResult<HashSet<Uuid>>;
    /// Inserta el viaje con sus pasajeros; la unicidad (schedule, fecha) la garantiza el almacén
    async fn create(&self, trip: &Trip) -> AppResult<CreateOutcome>;
    async fn get(&self, id: Uuid) -> AppResult<Option<Trip>>;
    /// Guarda `trip` solo si la versión almacenada sigue siendo `expected_version`;
    /// si otro escritor se adelantó devuelve `AppError::Conflict`
    async fn update(&self, trip: &Trip, expected_version: i64) -> AppResult<()>;
    async fn list_for_date(&self, date: NaiveDate) -> AppResult<Vec<Trip>>;
}

#[async_trait]
pub trait PassengerStore: Send + Sync {
    async fn list_passengers_assigned_to_route(&self, route_id: Uuid) -> AppResult<Vec<Passenger>>;
}

/// Vehículos y personal que la generación y el ciclo de vida consultan
#[async_trait]
pub trait FleetStore: Send + Sync {
    async fn get_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    async fn get_driver(&self, id: Uuid) -> AppResult<Option<Driver>>;
    async fn get_attendant(&self, id: Uuid) -> AppResult<Option<Attendant>>;
    /// Alta o reemplazo por id
    async fn save_vehicle(&self, vehicle: &Vehicle) -> AppResult<()>;
    async fn save_driver(&self, driver: &Driver) -> AppResult<()>;
    async fn save_attendant(&self, attendant: &Attendant) -> AppResult<()>;
}
