//! Almacén en memoria
//!
//! Implementa todos los contratos de persistencia sobre mapas protegidos por
//! `RwLock`. La unicidad (schedule, fecha) y la exclusión de sustituciones
//! solapadas se comprueban y escriben bajo el mismo bloqueo de escritura, igual
//! que harían las restricciones de la base de datos.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AssignmentStore, CreateOutcome, FleetStore, PassengerStore, ScheduleStore, TripStore};
use crate::models::{Attendant, Driver, DriverAssignment, Passenger, Schedule, Trip, Vehicle};
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
struct Inner {
    schedules: HashMap<Uuid, Schedule>,
    assignments: HashMap<Uuid, DriverAssignment>,
    trips: HashMap<Uuid, Trip>,
    trip_keys: HashMap<(Uuid, NaiveDate), Uuid>,
    passengers: HashMap<Uuid, Passenger>,
    vehicles: HashMap<Uuid, Vehicle>,
    drivers: HashMap<Uuid, Driver>,
    attendants: HashMap<Uuid, Attendant>,
}

fn overlap_conflict(inner: &Inner, assignment: &DriverAssignment) -> AppResult<()> {
    match inner.assignments.values().find(|other| assignment.overlaps(other)) {
        Some(other) => Err(AppError::Conflict(format!(
            "{} assignment overlaps assignment {} ({} to {})",
            assignment.role, other.id, other.start_date, other.end_date
        ))),
        None => Ok(()),
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_passenger(&self, passenger: Passenger) {
        self.inner.write().await.passengers.insert(passenger.id, passenger);
    }

    pub async fn trip_count(&self) -> usize {
        self.inner.read().await.trips.len()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn list_candidates_for_date(&self, _date: NaiveDate) -> AppResult<Vec<Schedule>> {
        let inner = self.inner.read().await;
        let mut schedules: Vec<Schedule> = inner
            .schedules
            .values()
            .filter(|s| s.is_active())
            .cloned()
            .collect();
        schedules.sort_by_key(|s| (s.start_time, s.created_at, s.id));
        Ok(schedules)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Schedule>> {
        Ok(self.inner.read().await.schedules.get(&id).cloned())
    }

    async fn create(&self, schedule: &Schedule) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.schedules.contains_key(&schedule.id) {
            return Err(AppError::Conflict(format!("Schedule {} already exists", schedule.id)));
        }
        inner.schedules.insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn update(&self, schedule: &Schedule) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.schedules.get_mut(&schedule.id) {
            Some(stored) => {
                *stored = schedule.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Schedule {} not found", schedule.id))),
        }
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn list_overrides_for_schedule(&self, schedule_id: Uuid) -> AppResult<Vec<DriverAssignment>> {
        let inner = self.inner.read().await;
        let mut assignments: Vec<DriverAssignment> = inner
            .assignments
            .values()
            .filter(|a| a.schedule_id == schedule_id && !a.is_deleted())
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.start_date, a.created_at));
        Ok(assignments)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<DriverAssignment>> {
        Ok(self.inner.read().await.assignments.get(&id).cloned())
    }

    async fn create(&self, assignment: &DriverAssignment) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        overlap_conflict(&inner, assignment)?;
        inner.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn update(&self, assignment: &DriverAssignment) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        overlap_conflict(&inner, assignment)?;
        match inner.assignments.get_mut(&assignment.id) {
            Some(stored) => {
                *stored = assignment.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Assignment {} not found", assignment.id))),
        }
    }
}

#[async_trait]
impl TripStore for MemoryStore {
    async fn existing_trip_keys_for_date(&self, date: NaiveDate) -> AppResult<HashSet<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .trip_keys
            .keys()
            .filter(|(_, d)| *d == date)
            .map(|(schedule_id, _)| *schedule_id)
            .collect())
    }

    async fn create(&self, trip: &Trip) -> AppResult<CreateOutcome> {
        let mut inner = self.inner.write().await;
        let key = (trip.schedule_id, trip.date);
        if inner.trip_keys.contains_key(&key) {
            return Ok(CreateOutcome::Duplicate);
        }
        inner.trip_keys.insert(key, trip.id);
        inner.trips.insert(trip.id, trip.clone());
        Ok(CreateOutcome::Created)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Trip>> {
        Ok(self
            .inner
            .read()
            .await
            .trips
            .get(&id)
            .filter(|t| t.deleted_at.is_none())
            .cloned())
    }

    async fn update(&self, trip: &Trip, expected_version: i64) -> AppResult<()> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        match inner.trips.get_mut(&trip.id) {
            Some(stored) if stored.version != expected_version => Err(AppError::Conflict(format!(
                "Trip {} was modified concurrently (version {} != {})",
                trip.id, stored.version, expected_version
            ))),
            Some(stored) => {
                *stored = trip.clone();
                if trip.deleted_at.is_some() {
                    inner.trip_keys.remove(&(trip.schedule_id, trip.date));
                }
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Trip {} not found", trip.id))),
        }
    }

    async fn list_for_date(&self, date: NaiveDate) -> AppResult<Vec<Trip>> {
        let inner = self.inner.read().await;
        let mut trips: Vec<Trip> = inner
            .trips
            .values()
            .filter(|t| t.date == date && t.deleted_at.is_none())
            .cloned()
            .collect();
        trips.sort_by_key(|t| (t.created_at, t.id));
        Ok(trips)
    }
}

#[async_trait]
impl PassengerStore for MemoryStore {
    async fn list_passengers_assigned_to_route(&self, route_id: Uuid) -> AppResult<Vec<Passenger>> {
        let inner = self.inner.read().await;
        Ok(inner
            .passengers
            .values()
            .filter(|p| p.stop_on_route(route_id).is_some())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FleetStore for MemoryStore {
    async fn get_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.inner.read().await.vehicles.get(&id).cloned())
    }

    async fn get_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        Ok(self.inner.read().await.drivers.get(&id).cloned())
    }

    async fn get_attendant(&self, id: Uuid) -> AppResult<Option<Attendant>> {
        Ok(self.inner.read().await.attendants.get(&id).cloned())
    }

    async fn save_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        self.inner.write().await.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn save_driver(&self, driver: &Driver) -> AppResult<()> {
        self.inner.write().await.drivers.insert(driver.id, driver.clone());
        Ok(())
    }

    async fn save_attendant(&self, attendant: &Attendant) -> AppResult<()> {
        self.inner
            .write()
            .await
            .attendants
            .insert(attendant.id, attendant.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn trip_for(schedule_id: Uuid, date: NaiveDate) -> Trip {
        Trip::new(
            schedule_id,
            date,
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            Utc.with_ymd_and_hms(2025, 1, 20, 5, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_second_trip_for_same_key() {
        let store = MemoryStore::new();
        let schedule_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();

        let first = trip_for(schedule_id, date);
        assert_eq!(TripStore::create(&store, &first).await.unwrap(), CreateOutcome::Created);
        let second = trip_for(schedule_id, date);
        assert_eq!(TripStore::create(&store, &second).await.unwrap(), CreateOutcome::Duplicate);

        assert_eq!(store.trip_count().await, 1);
        let keys = store.existing_trip_keys_for_date(date).await.unwrap();
        assert_eq!(keys, [schedule_id].into_iter().collect());

        let other_day = trip_for(schedule_id, date.succ_opt().unwrap());
        assert_eq!(TripStore::create(&store, &other_day).await.unwrap(), CreateOutcome::Created);
    }

    fn assignment_for(schedule_id: Uuid, start: NaiveDate, end: NaiveDate) -> DriverAssignment {
        DriverAssignment::create(
            crate::models::NewDriverAssignment {
                schedule_id,
                role: crate::models::CrewRole::Driver,
                substitute_id: Uuid::new_v4(),
                start_date: start,
                end_date: end,
                reason: "baja".to_string(),
                created_by: Uuid::new_v4(),
            },
            Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_overlapping_assignments_store_only_one() {
        let store = MemoryStore::new();
        let schedule_id = Uuid::new_v4();
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let first = assignment_for(schedule_id, d(20), d(24));
        let second = assignment_for(schedule_id, d(22), d(28));

        let (a, b) = tokio::join!(
            AssignmentStore::create(&store, &first),
            AssignmentStore::create(&store, &second)
        );
        assert!(a.is_ok() != b.is_ok());
        assert!(matches!(a.and(b), Err(AppError::Conflict(_))));
        assert_eq!(store.list_overrides_for_schedule(schedule_id).await.unwrap().len(), 1);

        // Eliminada la viva, el rango vuelve a quedar libre
        let mut live = store.list_overrides_for_schedule(schedule_id).await.unwrap().remove(0);
        live.soft_delete(Utc.with_ymd_and_hms(2025, 1, 11, 9, 0, 0).unwrap());
        AssignmentStore::update(&store, &live).await.unwrap();
        let replacement = assignment_for(schedule_id, d(21), d(23));
        AssignmentStore::create(&store, &replacement).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_unknown_trip_is_not_found() {
        let store = MemoryStore::new();
        let trip = trip_for(Uuid::new_v4(), NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
        assert!(matches!(TripStore::update(&store, &trip, 0).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_from_stale_read_is_conflict() {
        let store = MemoryStore::new();
        let trip = trip_for(Uuid::new_v4(), NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
        TripStore::create(&store, &trip).await.unwrap();

        let mut first = TripStore::get(&store, trip.id).await.unwrap().unwrap();
        let mut second = first.clone();

        first.notes = Some("primera".to_string());
        first.version += 1;
        TripStore::update(&store, &first, 0).await.unwrap();

        second.notes = Some("segunda".to_string());
        second.version += 1;
        assert!(matches!(TripStore::update(&store, &second, 0).await, Err(AppError::Conflict(_))));

        let stored = TripStore::get(&store, trip.id).await.unwrap().unwrap();
        assert_eq!(stored.notes.as_deref(), Some("primera"));
        assert_eq!(stored.version, 1);
    }
}
