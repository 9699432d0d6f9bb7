//! Generador de viajes
//!
//! Convierte los schedules vigentes en una fecha en viajes concretos, como
//! máximo uno por (schedule, fecha). Aquí solo vive la parte pura: filtrar,
//! resolver la tripulación, comprobar que vehículo y tripulación están
//! disponibles y sembrar los pasajeros. La persistencia y la tolerancia a
//! duplicados concurrentes están en `trip_generation_service`.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::driver_assignment::DriverAssignment;
use crate::models::fleet::{Attendant, Driver, Vehicle};
use crate::models::passenger::Passenger;
use crate::models::schedule::Schedule;
use crate::models::trip::Trip;
use crate::services::assignment_resolver::{resolve_crew, OverlapWarning};
use crate::services::calendar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyGenerated,
    NotScheduled,
    Failed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::AlreadyGenerated => "already generated",
            SkipReason::NotScheduled => "not scheduled",
            SkipReason::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSchedule {
    pub schedule_id: Uuid,
    pub reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SkippedSchedule {
    pub fn already_generated(schedule_id: Uuid) -> Self {
        Self {
            schedule_id,
            reason: SkipReason::AlreadyGenerated,
            detail: None,
        }
    }

    pub fn not_scheduled(schedule_id: Uuid) -> Self {
        Self {
            schedule_id,
            reason: SkipReason::NotScheduled,
            detail: None,
        }
    }

    pub fn failed(schedule_id: Uuid, detail: impl Into<String>) -> Self {
        Self {
            schedule_id,
            reason: SkipReason::Failed,
            detail: Some(detail.into()),
        }
    }
}

/// Resultado de una ejecución de generación para una fecha
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub date: NaiveDate,
    pub created: Vec<Trip>,
    pub skipped: Vec<SkippedSchedule>,
    pub warnings: Vec<OverlapWarning>,
}

impl GenerationReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            created: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Algún schedule falló (fallo parcial del lote)
    pub fn has_failures(&self) -> bool {
        self.skipped.iter().any(|s| s.reason == SkipReason::Failed)
    }

    pub fn skipped_with(&self, reason: SkipReason) -> impl Iterator<Item = &SkippedSchedule> {
        self.skipped.iter().filter(move |s| s.reason == reason)
    }

    pub fn log_summary(&self) {
        info!(
            "🗓️ Generación {}: {} creados, {} ya generados, {} sin servicio, {} fallidos, {} avisos",
            self.date,
            self.created.len(),
            self.skipped_with(SkipReason::AlreadyGenerated).count(),
            self.skipped_with(SkipReason::NotScheduled).count(),
            self.skipped_with(SkipReason::Failed).count(),
            self.warnings.len()
        );
    }
}

/// Viaje listo para persistir junto con los avisos de su resolución
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTrip {
    pub trip: Trip,
    pub warnings: Vec<OverlapWarning>,
}

/// Primer filtro: ya generado o sin servicio ese día
pub fn screen(schedule: &Schedule, date: NaiveDate, existing_trip_keys: &HashSet<Uuid>) -> Result<(), SkippedSchedule> {
    if existing_trip_keys.contains(&schedule.id) {
        debug!("⏭️ Schedule {} ya tiene viaje el {}", schedule.id, date);
        return Err(SkippedSchedule::already_generated(schedule.id));
    }

    if !calendar::is_active_on(schedule, date) {
        debug!("⏭️ Schedule {} no circula el {}", schedule.id, date);
        return Err(SkippedSchedule::not_scheduled(schedule.id));
    }

    Ok(())
}

/// Construye el viaje `pending` de un schedule ya filtrado
pub fn plan_trip(
    schedule: &Schedule,
    date: NaiveDate,
    overrides: &[DriverAssignment],
    route_passengers: &[Passenger],
    now: DateTime<Utc>,
) -> Result<PlannedTrip, SkippedSchedule> {
    let vehicle_id = schedule
        .vehicle_id
        .ok_or_else(|| SkippedSchedule::failed(schedule.id, "schedule has no vehicle assigned"))?;

    let crew = resolve_crew(schedule, date, overrides);
    let mut trip = Trip::new(
        schedule.id,
        date,
        vehicle_id,
        crew.driver.id,
        crew.attendant.map(|a| a.id),
        now,
    );

    let mut riders: Vec<(&Passenger, Uuid)> = route_passengers
        .iter()
        .filter_map(|p| p.stop_on_route(schedule.route_id).map(|stop| (p, stop)))
        .collect();
    riders.sort_by(|(a, _), (b, _)| a.stop_order.cmp(&b.stop_order).then_with(|| a.name.cmp(&b.name)));

    let mut seen = HashSet::new();
    for (passenger, stop_id) in riders {
        if seen.insert(passenger.id) {
            trip.add_passenger(passenger.id, stop_id, now);
        }
    }

    Ok(PlannedTrip {
        trip,
        warnings: crew.warnings,
    })
}

/// Vehículo y tripulación de un viaje planificado, si la flota los conoce
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripResources {
    pub vehicle: Option<Vehicle>,
    pub driver: Option<Driver>,
    pub attendant: Option<Attendant>,
}

/// El vehículo y la tripulación resuelta existen y pueden servir el viaje en su fecha
pub fn check_resources(trip: &Trip, resources: &TripResources) -> Result<(), SkippedSchedule> {
    let failed = |kind: &str, id: Uuid, why: String| {
        SkippedSchedule::failed(trip.schedule_id, format!("{} {} {}", kind, id, why))
    };
    let unregistered = |kind: &str, id: Uuid| failed(kind, id, "is not registered".to_string());

    let vehicle = resources
        .vehicle
        .as_ref()
        .ok_or_else(|| unregistered("vehicle", trip.vehicle_id))?;
    vehicle
        .check_available_on(trip.date)
        .map_err(|e| failed("vehicle", vehicle.id, format!("is unavailable: {}", e)))?;

    let driver = resources
        .driver
        .as_ref()
        .ok_or_else(|| unregistered("driver", trip.assigned_driver_id))?;
    driver
        .check_available_on(trip.date)
        .map_err(|e| failed("driver", driver.id, format!("is unavailable: {}", e)))?;

    if let Some(attendant_id) = trip.assigned_attendant_id {
        let attendant = resources
            .attendant
            .as_ref()
            .ok_or_else(|| unregistered("attendant", attendant_id))?;
        attendant
            .check_available()
            .map_err(|e| failed("attendant", attendant.id, format!("is unavailable: {}", e)))?;
    }

    Ok(())
}

/// Datos de entrada consistentes para una ejecución
#[derive(Debug, Clone, Default)]
pub struct GenerationSnapshot {
    pub schedules: Vec<Schedule>,
    pub overrides_by_schedule: HashMap<Uuid, Vec<DriverAssignment>>,
    pub existing_trip_keys: HashSet<Uuid>,
    pub passengers_by_route: HashMap<Uuid, Vec<Passenger>>,
    pub vehicles: HashMap<Uuid, Vehicle>,
    pub drivers: HashMap<Uuid, Driver>,
    pub attendants: HashMap<Uuid, Attendant>,
}

impl GenerationSnapshot {
    pub fn resources_for(&self, trip: &Trip) -> TripResources {
        TripResources {
            vehicle: self.vehicles.get(&trip.vehicle_id).cloned(),
            driver: self.drivers.get(&trip.assigned_driver_id).cloned(),
            attendant: trip
                .assigned_attendant_id
                .and_then(|id| self.attendants.get(&id).cloned()),
        }
    }
}

/// Genera en memoria los viajes de `date` a partir de una instantánea
///
/// Los schedules repetidos en la instantánea solo producen un viaje.
pub fn generate_trips_for_date(date: NaiveDate, snapshot: &GenerationSnapshot, now: DateTime<Utc>) -> GenerationReport {
    let mut report = GenerationReport::new(date);
    let mut keys = snapshot.existing_trip_keys.clone();

    for schedule in &snapshot.schedules {
        if let Err(skip) = screen(schedule, date, &keys) {
            report.skipped.push(skip);
            continue;
        }

        let overrides = snapshot
            .overrides_by_schedule
            .get(&schedule.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let passengers = snapshot
            .passengers_by_route
            .get(&schedule.route_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let planned = plan_trip(schedule, date, overrides, passengers, now).and_then(|planned| {
            check_resources(&planned.trip, &snapshot.resources_for(&planned.trip))?;
            Ok(planned)
        });

        match planned {
            Ok(planned) => {
                keys.insert(schedule.id);
                report.warnings.extend(planned.warnings);
                report.created.push(planned.trip);
            }
            Err(skip) => report.skipped.push(skip),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::crew::CrewRole;
    use crate::models::driver_assignment::NewDriverAssignment;
    use crate::models::fleet::{StaffStatus, VehicleStatus};
    use crate::models::passenger::PassengerStatus;
    use crate::models::schedule::tests::{new_schedule, ts};
    use crate::models::trip::TripStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn passenger(route_id: Uuid, name: &str, stop_order: i32) -> Passenger {
        Passenger {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: PassengerStatus::Active,
            assigned_route_id: Some(route_id),
            assigned_stop_id: Some(Uuid::new_v4()),
            stop_order,
            deleted_at: None,
        }
    }

    fn weekday_schedule() -> Schedule {
        Schedule::create(new_schedule(&[1, 2, 3, 4, 5]), ts()).unwrap()
    }

    fn register_driver(snapshot: &mut GenerationSnapshot, id: Uuid) {
        snapshot
            .drivers
            .insert(id, Driver::new(id, "Conductor", d(2030, 1, 1)));
    }

    /// Instantánea con los schedules y la flota por defecto de cada uno
    fn snapshot_with_fleet(schedules: &[&Schedule]) -> GenerationSnapshot {
        let mut snapshot = GenerationSnapshot {
            schedules: schedules.iter().map(|s| (*s).clone()).collect(),
            ..Default::default()
        };
        for s in schedules {
            if let Some(vehicle_id) = s.vehicle_id {
                snapshot.vehicles.insert(vehicle_id, Vehicle::new(vehicle_id, "0000-AAA", 20));
            }
            register_driver(&mut snapshot, s.default_driver_id);
        }
        snapshot
    }

    #[test]
    fn test_screen_order() {
        let s = weekday_schedule();
        let saturday = d(2025, 1, 18);
        let keys: HashSet<Uuid> = [s.id].into_iter().collect();

        // La clave existente se comprueba antes que el calendario
        assert_eq!(screen(&s, saturday, &keys).unwrap_err().reason, SkipReason::AlreadyGenerated);
        assert_eq!(screen(&s, saturday, &HashSet::new()).unwrap_err().reason, SkipReason::NotScheduled);
        assert!(screen(&s, d(2025, 1, 20), &HashSet::new()).is_ok());
    }

    #[test]
    fn test_plan_seeds_route_passengers_in_stop_order() {
        let s = weekday_schedule();
        let other_route = Uuid::new_v4();
        let mut inactive = passenger(s.route_id, "Inés", 1);
        inactive.status = PassengerStatus::Inactive;
        let passengers = vec![
            passenger(s.route_id, "Zoe", 2),
            passenger(s.route_id, "Ana", 2),
            passenger(s.route_id, "Bruno", 1),
            passenger(other_route, "Carla", 1),
            inactive,
        ];

        let planned = plan_trip(&s, d(2025, 1, 20), &[], &passengers, ts()).unwrap();
        let trip = planned.trip;

        assert_eq!(trip.status, TripStatus::Pending);
        assert_eq!(trip.schedule_id, s.id);
        assert_eq!(trip.vehicle_id, s.vehicle_id.unwrap());
        let seeded: Vec<Uuid> = trip.passengers.iter().map(|p| p.passenger_id).collect();
        assert_eq!(seeded, vec![passengers[2].id, passengers[1].id, passengers[0].id]);
        assert!(trip.passengers.iter().all(|p| p.trip_id == trip.id && p.is_waiting()));
    }

    #[test]
    fn test_plan_fails_without_vehicle() {
        let mut s = weekday_schedule();
        s.vehicle_id = None;

        let skip = plan_trip(&s, d(2025, 1, 20), &[], &[], ts()).unwrap_err();
        assert_eq!(skip.reason, SkipReason::Failed);
        assert!(skip.detail.unwrap().contains("vehicle"));
    }

    #[test]
    fn test_snapshot_generation_isolates_failures() {
        let ok = weekday_schedule();
        let mut broken = weekday_schedule();
        broken.vehicle_id = None;
        let weekend = Schedule::create(new_schedule(&[6, 7]), ts()).unwrap();

        let snapshot = snapshot_with_fleet(&[&broken, &ok, &weekend]);
        let report = generate_trips_for_date(d(2025, 1, 20), &snapshot, ts());

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].schedule_id, ok.id);
        assert!(report.has_failures());
        assert_eq!(
            report.skipped,
            vec![
                SkippedSchedule::failed(broken.id, "schedule has no vehicle assigned"),
                SkippedSchedule::not_scheduled(weekend.id),
            ]
        );
    }

    #[test]
    fn test_snapshot_generation_is_idempotent() {
        let s = weekday_schedule();
        let monday = d(2025, 1, 20);
        let mut snapshot = snapshot_with_fleet(&[&s]);

        let first = generate_trips_for_date(monday, &snapshot, ts());
        assert_eq!(first.created.len(), 1);

        snapshot
            .existing_trip_keys
            .extend(first.created.iter().map(|t| t.schedule_id));
        let second = generate_trips_for_date(monday, &snapshot, ts());
        assert!(second.created.is_empty());
        assert_eq!(second.skipped, vec![SkippedSchedule::already_generated(s.id)]);
    }

    #[test]
    fn test_duplicate_schedule_in_snapshot_yields_one_trip() {
        let s = weekday_schedule();
        let snapshot = snapshot_with_fleet(&[&s, &s]);

        let report = generate_trips_for_date(d(2025, 1, 21), &snapshot, ts());
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.skipped, vec![SkippedSchedule::already_generated(s.id)]);
    }

    #[test]
    fn test_override_driver_and_warnings_flow_into_report() {
        let s = weekday_schedule();
        let monday = d(2025, 1, 20);
        let make = |start: NaiveDate| {
            DriverAssignment::create(
                NewDriverAssignment {
                    schedule_id: s.id,
                    role: CrewRole::Driver,
                    substitute_id: Uuid::new_v4(),
                    start_date: start,
                    end_date: d(2025, 1, 25),
                    reason: "baja".to_string(),
                    created_by: Uuid::new_v4(),
                },
                ts(),
            )
            .unwrap()
        };
        let older = make(d(2025, 1, 13));
        let newer = make(monday);

        let mut snapshot = snapshot_with_fleet(&[&s]);
        snapshot
            .overrides_by_schedule
            .insert(s.id, vec![older, newer.clone()]);
        register_driver(&mut snapshot, newer.substitute_id);
        let report = generate_trips_for_date(monday, &snapshot, ts());

        assert_eq!(report.created[0].assigned_driver_id, newer.substitute_id);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].chosen, newer.id);
    }

    #[test]
    fn test_unavailable_resources_fail_the_schedule() {
        let monday = d(2025, 1, 20);
        let in_shop = weekday_schedule();
        let unknown_vehicle = weekday_schedule();
        let expired_license = weekday_schedule();
        let healthy = weekday_schedule();

        let mut snapshot = snapshot_with_fleet(&[&in_shop, &unknown_vehicle, &expired_license, &healthy]);
        if let Some(v) = snapshot.vehicles.get_mut(&in_shop.vehicle_id.unwrap()) {
            v.status = VehicleStatus::Maintenance;
        }
        snapshot.vehicles.remove(&unknown_vehicle.vehicle_id.unwrap());
        if let Some(driver) = snapshot.drivers.get_mut(&expired_license.default_driver_id) {
            driver.license_expiry = d(2025, 1, 19);
        }

        let report = generate_trips_for_date(monday, &snapshot, ts());

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].schedule_id, healthy.id);
        let details: Vec<(Uuid, String)> = report
            .skipped_with(SkipReason::Failed)
            .map(|s| (s.schedule_id, s.detail.clone().unwrap_or_default()))
            .collect();
        assert_eq!(details.len(), 3);
        assert!(details[0].0 == in_shop.id && details[0].1.ends_with("is unavailable: vehicle status is maintenance"));
        assert!(details[1].0 == unknown_vehicle.id && details[1].1.ends_with("is not registered"));
        assert!(details[2].0 == expired_license.id && details[2].1.contains("license expired on 2025-01-19"));
    }

    #[test]
    fn test_resolved_attendant_must_be_available() {
        let mut s = weekday_schedule();
        let attendant_id = Uuid::new_v4();
        s.default_attendant_id = Some(attendant_id);
        let planned = plan_trip(&s, d(2025, 1, 20), &[], &[], ts()).unwrap();
        let mut snapshot = snapshot_with_fleet(&[&s]);

        let skip = check_resources(&planned.trip, &snapshot.resources_for(&planned.trip)).unwrap_err();
        assert_eq!(skip.detail, Some(format!("attendant {} is not registered", attendant_id)));

        let mut on_leave = Attendant::new(attendant_id, "Pilar");
        on_leave.status = StaffStatus::OnLeave;
        snapshot.attendants.insert(attendant_id, on_leave);
        let skip = check_resources(&planned.trip, &snapshot.resources_for(&planned.trip)).unwrap_err();
        assert!(skip.detail.unwrap().ends_with("staff status is on_leave"));

        snapshot.attendants.insert(attendant_id, Attendant::new(attendant_id, "Pilar"));
        assert!(check_resources(&planned.trip, &snapshot.resources_for(&planned.trip)).is_ok());
    }
}
