//! Servicio de ciclo de vida de viajes
//!
//! Aplica las transiciones del viaje y del abordaje sobre el almacén. Cada
//! operación carga, modifica y guarda el viaje con el cerrojo de ese viaje
//! tomado, así que dentro de un proceso las peticiones sobre un mismo viaje se
//! ejecutan de una en una. Entre procesos decide la versión del viaje: si otro
//! escritor guardó antes, el almacén rechaza la escritura con `Conflict` y nada
//! cambia.
//!
//! Antes de tocar nada comprueba que quien actúa es tripulación asignada; para
//! iniciar el viaje un acompañante necesita además el permiso `can_start_trip`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;
use uuid::Uuid;

use crate::models::crew::{CrewMember, CrewRole};
use crate::models::location::Location;
use crate::models::trip::Trip;
use crate::repositories::{FleetStore, TripStore};
use crate::services::clock::Clock;
use crate::utils::errors::{forbidden_error, not_found_error, AppResult, DomainError};

/// Cerrojos de aplicación indexados por id de viaje
#[derive(Clone, Default)]
pub struct TripLocks {
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl TripLocks {
    pub async fn acquire(&self, trip_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Quita cerrojos que ya nadie usa
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(trip_id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Lo que se exige a quien actúa, además de ser tripulación del viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permission {
    Crew,
    StartTrip,
}

#[derive(Clone)]
pub struct TripService {
    trips: Arc<dyn TripStore>,
    fleet: Arc<dyn FleetStore>,
    clock: Arc<dyn Clock>,
    locks: TripLocks,
}

impl TripService {
    pub fn new(trips: Arc<dyn TripStore>, fleet: Arc<dyn FleetStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            trips,
            fleet,
            clock,
            locks: TripLocks::default(),
        }
    }

    pub async fn get(&self, trip_id: Uuid) -> AppResult<Trip> {
        self.trips
            .get(trip_id)
            .await?
            .ok_or_else(|| not_found_error("Trip", &trip_id))
    }

    pub async fn list_for_date(&self, date: NaiveDate) -> AppResult<Vec<Trip>> {
        self.trips.list_for_date(date).await
    }

    async fn authorize(&self, trip: &Trip, actor: &CrewMember, operation: &str, permission: Permission) -> AppResult<()> {
        if !trip.is_crew_member(actor) {
            return Err(forbidden_error(
                operation,
                &format!("{} is not assigned to trip {}", actor, trip.id),
            ));
        }

        if permission == Permission::StartTrip && actor.role == CrewRole::Attendant {
            let allowed = self
                .fleet
                .get_attendant(actor.id)
                .await?
                .is_some_and(|a| a.can_start_trip);
            if !allowed {
                return Err(forbidden_error(
                    operation,
                    &format!("{} has no permission to start trips", actor),
                ));
            }
        }

        Ok(())
    }

    /// Carga, autoriza, aplica `change` y guarda bajo el cerrojo del viaje
    async fn apply<F>(
        &self,
        trip_id: Uuid,
        actor: &CrewMember,
        operation: &str,
        permission: Permission,
        change: F,
    ) -> AppResult<Trip>
    where
        F: FnOnce(&mut Trip, DateTime<Utc>) -> Result<(), DomainError> + Send,
    {
        let _guard = self.locks.acquire(trip_id).await;

        let mut trip = self.get(trip_id).await?;
        self.authorize(&trip, actor, operation, permission).await?;

        let read_version = trip.version;
        change(&mut trip, self.clock.now())?;
        trip.version = read_version + 1;
        self.trips.update(&trip, read_version).await?;
        Ok(trip)
    }

    pub async fn start(&self, trip_id: Uuid, actor: CrewMember, location: Option<Location>) -> AppResult<Trip> {
        let trip = self
            .apply(trip_id, &actor, "start trip", Permission::StartTrip, |trip, now| {
                trip.start(actor, location, now)
            })
            .await?;
        info!("▶️ Viaje {} iniciado por {}", trip_id, actor);
        Ok(trip)
    }

    pub async fn complete(&self, trip_id: Uuid, actor: CrewMember, location: Option<Location>) -> AppResult<Trip> {
        let trip = self
            .apply(trip_id, &actor, "complete trip", Permission::Crew, |trip, now| {
                trip.complete(location, now)
            })
            .await?;
        info!(
            "🏁 Viaje {} completado por {} ({} min)",
            trip_id,
            actor,
            trip.duration_minutes().unwrap_or_default()
        );
        Ok(trip)
    }

    pub async fn cancel(&self, trip_id: Uuid, actor: CrewMember, reason: String) -> AppResult<Trip> {
        let trip = self
            .apply(trip_id, &actor, "cancel trip", Permission::Crew, |trip, now| {
                trip.cancel(reason, now)
            })
            .await?;
        info!("🚫 Viaje {} cancelado por {}", trip_id, actor);
        Ok(trip)
    }

    pub async fn board(&self, trip_id: Uuid, actor: CrewMember, passenger_id: Uuid) -> AppResult<Trip> {
        self.apply(trip_id, &actor, "board passenger", Permission::Crew, |trip, now| {
            trip.board_passenger(passenger_id, now).map(|_| ())
        })
        .await
    }

    pub async fn alight(&self, trip_id: Uuid, actor: CrewMember, passenger_id: Uuid) -> AppResult<Trip> {
        self.apply(trip_id, &actor, "alight passenger", Permission::Crew, |trip, now| {
            trip.alight_passenger(passenger_id, now).map(|_| ())
        })
        .await
    }

    pub async fn mark_no_show(
        &self,
        trip_id: Uuid,
        actor: CrewMember,
        passenger_id: Uuid,
        reason: String,
    ) -> AppResult<Trip> {
        self.apply(trip_id, &actor, "mark passenger as no-show", Permission::Crew, |trip, now| {
            trip.mark_passenger_no_show(passenger_id, reason, now).map(|_| ())
        })
        .await
    }

    pub async fn clear_no_show(&self, trip_id: Uuid, actor: CrewMember, passenger_id: Uuid) -> AppResult<Trip> {
        self.apply(trip_id, &actor, "clear passenger no-show", Permission::Crew, |trip, now| {
            trip.clear_passenger_no_show(passenger_id, now).map(|_| ())
        })
        .await
    }
}
