//! Servicio de generación de viajes
//!
//! Ejecuta el generador contra los almacenes. Se puede llamar varias veces, o en
//! paralelo, para la misma fecha: la comprobación previa evita trabajo y el
//! almacén de viajes resuelve las carreras devolviendo `CreateOutcome::Duplicate`,
//! que se registra como "ya generado". Los fallos de un schedule (incluido un
//! vehículo o tripulante no disponible) quedan en el informe y no detienen el
//! lote; lo ya creado no se deshace.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::models::schedule::Schedule;
use crate::models::trip::Trip;
use crate::repositories::{AssignmentStore, CreateOutcome, FleetStore, PassengerStore, ScheduleStore, TripStore};
use crate::services::clock::Clock;
use crate::services::trip_generator::{self, GenerationReport, SkippedSchedule, TripResources};
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct TripGenerationService {
    schedules: Arc<dyn ScheduleStore>,
    assignments: Arc<dyn AssignmentStore>,
    trips: Arc<dyn TripStore>,
    passengers: Arc<dyn PassengerStore>,
    fleet: Arc<dyn FleetStore>,
    clock: Arc<dyn Clock>,
}

impl TripGenerationService {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        assignments: Arc<dyn AssignmentStore>,
        trips: Arc<dyn TripStore>,
        passengers: Arc<dyn PassengerStore>,
        fleet: Arc<dyn FleetStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schedules,
            assignments,
            trips,
            passengers,
            fleet,
            clock,
        }
    }

    /// Genera los viajes de `date`
    ///
    /// Solo devuelve `Err` si no se pueden leer los candidatos o las claves
    /// existentes, es decir, antes de haber creado nada.
    pub async fn generate_trips_for_date(&self, date: NaiveDate) -> AppResult<GenerationReport> {
        info!("🚌 Generando viajes para {}", date);

        let candidates = self.schedules.list_candidates_for_date(date).await?;
        let mut existing = self.trips.existing_trip_keys_for_date(date).await?;
        let mut report = GenerationReport::new(date);

        for schedule in &candidates {
            if let Err(skip) = trip_generator::screen(schedule, date, &existing) {
                report.skipped.push(skip);
                continue;
            }

            match self.generate_one(schedule, date, &mut report).await {
                Ok(()) => {
                    existing.insert(schedule.id);
                }
                Err(skip) => {
                    if let Some(detail) = &skip.detail {
                        warn!("❌ Schedule {} no generado para {}: {}", schedule.id, date, detail);
                    }
                    report.skipped.push(skip);
                }
            }
        }

        report.log_summary();
        Ok(report)
    }

    async fn generate_one(
        &self,
        schedule: &Schedule,
        date: NaiveDate,
        report: &mut GenerationReport,
    ) -> Result<(), SkippedSchedule> {
        let overrides = self
            .assignments
            .list_overrides_for_schedule(schedule.id)
            .await
            .map_err(|e| SkippedSchedule::failed(schedule.id, format!("loading overrides: {}", e)))?;

        let passengers = self
            .passengers
            .list_passengers_assigned_to_route(schedule.route_id)
            .await
            .map_err(|e| SkippedSchedule::failed(schedule.id, format!("loading passengers: {}", e)))?;

        let planned = trip_generator::plan_trip(schedule, date, &overrides, &passengers, self.clock.now())?;

        let resources = self
            .load_resources(&planned.trip)
            .await
            .map_err(|e| SkippedSchedule::failed(schedule.id, format!("loading fleet: {}", e)))?;
        trip_generator::check_resources(&planned.trip, &resources)?;

        let outcome = self
            .trips
            .create(&planned.trip)
            .await
            .map_err(|e| SkippedSchedule::failed(schedule.id, format!("creating trip: {}", e)))?;

        match outcome {
            CreateOutcome::Created => {
                info!(
                    "✅ Viaje {} creado para schedule {} el {} (conductor {}, {} pasajeros)",
                    planned.trip.id,
                    schedule.id,
                    date,
                    planned.trip.assigned_driver_id,
                    planned.trip.passengers.len()
                );
                report.warnings.extend(planned.warnings);
                report.created.push(planned.trip);
                Ok(())
            }
            CreateOutcome::Duplicate => Err(SkippedSchedule::already_generated(schedule.id)),
        }
    }

    async fn load_resources(&self, trip: &Trip) -> AppResult<TripResources> {
        let attendant = match trip.assigned_attendant_id {
            Some(id) => self.fleet.get_attendant(id).await?,
            None => None,
        };

        Ok(TripResources {
            vehicle: self.fleet.get_vehicle(trip.vehicle_id).await?,
            driver: self.fleet.get_driver(trip.assigned_driver_id).await?,
            attendant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fleet::{Driver, Vehicle, VehicleStatus};
    use crate::models::schedule::tests::{new_schedule, ts};
    use crate::repositories::MemoryStore;
    use crate::services::clock::FixedClock;
    use crate::services::trip_generator::SkipReason;

    fn service(store: &MemoryStore) -> TripGenerationService {
        let store = Arc::new(store.clone());
        TripGenerationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            Arc::new(FixedClock::new(ts())),
        )
    }

    async fn add_with_fleet(store: &MemoryStore, schedule: &Schedule) {
        ScheduleStore::create(store, schedule).await.unwrap();
        if let Some(vehicle_id) = schedule.vehicle_id {
            let vehicle = Vehicle::new(vehicle_id, "4321-XYZ", 20);
            FleetStore::save_vehicle(store, &vehicle).await.unwrap();
        }
        let license_expiry = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let driver = Driver::new(schedule.default_driver_id, "Luis", license_expiry);
        FleetStore::save_driver(store, &driver).await.unwrap();
    }

    #[tokio::test]
    async fn test_second_run_creates_nothing() {
        let store = MemoryStore::new();
        let schedule = Schedule::create(new_schedule(&[1, 2, 3, 4, 5]), ts()).unwrap();
        add_with_fleet(&store, &schedule).await;
        let monday = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();

        let first = service(&store).generate_trips_for_date(monday).await.unwrap();
        assert_eq!(first.created.len(), 1);

        let second = service(&store).generate_trips_for_date(monday).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped.len(), 1);
        assert_eq!(second.skipped[0].reason, SkipReason::AlreadyGenerated);
        assert_eq!(store.trip_count().await, 1);
    }

    #[tokio::test]
    async fn test_vehicle_in_maintenance_is_failed_and_retried_later() {
        let store = MemoryStore::new();
        let schedule = Schedule::create(new_schedule(&[1, 2, 3, 4, 5]), ts()).unwrap();
        add_with_fleet(&store, &schedule).await;
        let vehicle_id = schedule.vehicle_id.unwrap();
        let mut vehicle = Vehicle::new(vehicle_id, "4321-XYZ", 20);
        vehicle.status = VehicleStatus::Maintenance;
        FleetStore::save_vehicle(&store, &vehicle).await.unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();

        let report = service(&store).generate_trips_for_date(monday).await.unwrap();
        assert!(report.created.is_empty());
        assert!(report.has_failures());
        assert_eq!(
            report.skipped[0].detail,
            Some(format!("vehicle {} is unavailable: vehicle status is maintenance", vehicle_id))
        );
        assert_eq!(store.trip_count().await, 0);

        let repaired = Vehicle::new(vehicle_id, "4321-XYZ", 20);
        FleetStore::save_vehicle(&store, &repaired).await.unwrap();
        let retry = service(&store).generate_trips_for_date(monday).await.unwrap();
        assert_eq!(retry.created.len(), 1);
    }
}
