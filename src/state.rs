//! Shared application state
//!
//! Servicios compartidos que se pasan a través del router de Axum. Los
//! almacenes pueden ser PostgreSQL o memoria; los servicios no distinguen.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    AssignmentStore, FleetStore, MemoryStore, PassengerStore, PgDriverAssignmentRepository, PgFleetRepository,
    PgPassengerRepository, PgScheduleRepository, PgTripRepository, ScheduleStore, TripStore,
};
use crate::services::{Clock, FleetService, ScheduleService, SystemClock, TripGenerationService, TripService};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub clock: Arc<dyn Clock>,
    pub trip_service: TripService,
    pub generation_service: TripGenerationService,
    pub schedule_service: ScheduleService,
    pub fleet_service: FleetService,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        schedules: Arc<dyn ScheduleStore>,
        assignments: Arc<dyn AssignmentStore>,
        trips: Arc<dyn TripStore>,
        passengers: Arc<dyn PassengerStore>,
        fleet: Arc<dyn FleetStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            trip_service: TripService::new(trips.clone(), fleet.clone(), clock.clone()),
            generation_service: TripGenerationService::new(
                schedules.clone(),
                assignments.clone(),
                trips,
                passengers,
                fleet.clone(),
                clock.clone(),
            ),
            fleet_service: FleetService::new(fleet),
            schedule_service: ScheduleService::new(schedules, assignments, clock.clone()),
            config,
            clock,
        }
    }

    /// Estado respaldado por PostgreSQL
    pub fn postgres(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self::new(
            config,
            Arc::new(PgScheduleRepository::new(pool.clone())),
            Arc::new(PgDriverAssignmentRepository::new(pool.clone())),
            Arc::new(PgTripRepository::new(pool.clone())),
            Arc::new(PgPassengerRepository::new(pool.clone())),
            Arc::new(PgFleetRepository::new(pool)),
            Arc::new(SystemClock),
        )
    }

    /// Estado en memoria sobre `store`, con el reloj indicado
    pub fn in_memory(store: MemoryStore, config: EnvironmentConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(store);
        Self::new(
            config,
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            clock,
        )
    }
}
