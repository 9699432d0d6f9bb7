//! Modelo de Trip
//!
//! Un Trip es la ejecución concreta de un schedule en una fecha. Solo lo crea el
//! generador de viajes y solo cambia a través de las transiciones de su ciclo de
//! vida:
//!
//! ```text
//! pending ──start──▶ in_progress ──complete──▶ completed
//!    │                    │
//!    └──────cancel────────┴──────────────────▶ cancelled
//! ```
//!
//! La máquina de estados no bloquea: quien la llama debe serializar las
//! operaciones sobre un mismo viaje. `version` crece en cada escritura y el
//! almacén la usa para rechazar escrituras basadas en una lectura antigua.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

use crate::models::crew::{CrewMember, CrewRole};
use crate::models::location::Location;
use crate::models::trip_passenger::TripPassenger;
use crate::utils::errors::DomainError;

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "trip_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::InProgress => "in_progress",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operaciones del ciclo de vida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripAction {
    Start,
    Complete,
    Cancel,
}

impl fmt::Display for TripAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TripAction::Start => "start",
            TripAction::Complete => "complete",
            TripAction::Cancel => "cancel",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
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
    pub notes: Option<String>,

    pub passengers: Vec<TripPassenger>,

    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Conteo de pasajeros por estado de abordaje
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassengerSummary {
    pub total: usize,
    pub boarded: usize,
    pub alighted: usize,
    pub no_show: usize,
    pub waiting: usize,
}

impl Trip {
    /// Viaje nuevo en estado `pending` y sin pasajeros
    pub fn new(
        schedule_id: Uuid,
        date: NaiveDate,
        vehicle_id: Uuid,
        driver_id: Uuid,
        attendant_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            schedule_id,
            date,
            status: TripStatus::Pending,
            vehicle_id,
            assigned_driver_id: driver_id,
            assigned_attendant_id: attendant_id,
            started_at: None,
            completed_at: None,
            started_by: None,
            actual_start_location: None,
            actual_end_location: None,
            cancelled_at: None,
            cancellation_reason: None,
            notes: None,
            passengers: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn add_passenger(&mut self, passenger_id: Uuid, stop_id: Uuid, now: DateTime<Utc>) {
        self.passengers
            .push(TripPassenger::new(self.id, passenger_id, stop_id, now));
    }

    pub fn is_pending(&self) -> bool {
        self.status == TripStatus::Pending
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == TripStatus::InProgress
    }

    pub fn is_completed(&self) -> bool {
        self.status == TripStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == TripStatus::Cancelled
    }

    pub fn can_start(&self) -> bool {
        self.is_pending()
    }

    pub fn can_complete(&self) -> bool {
        self.is_in_progress()
    }

    pub fn can_cancel(&self) -> bool {
        !self.status.is_terminal()
    }

    /// El miembro es el conductor o el acompañante asignado a este viaje
    pub fn is_crew_member(&self, member: &CrewMember) -> bool {
        match member.role {
            CrewRole::Driver => self.assigned_driver_id == member.id,
            CrewRole::Attendant => self.assigned_attendant_id == Some(member.id),
        }
    }

    pub fn start(
        &mut self,
        started_by: CrewMember,
        location: Option<Location>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure(self.can_start(), TripAction::Start)?;

        self.status = TripStatus::InProgress;
        self.started_at = Some(now);
        self.started_by = Some(started_by.to_string());
        self.actual_start_location = location;
        self.updated_at = now;
        Ok(())
    }

    pub fn complete(&mut self, location: Option<Location>, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure(self.can_complete(), TripAction::Complete)?;

        self.status = TripStatus::Completed;
        self.completed_at = Some(now);
        self.actual_end_location = location;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, reason: String, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure(self.can_cancel(), TripAction::Cancel)?;

        self.status = TripStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancellation_reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }

    fn ensure(&self, allowed: bool, action: TripAction) -> Result<(), DomainError> {
        if allowed {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                action,
                from: self.status,
            })
        }
    }

    /// Minutos entre inicio y fin; `None` mientras falte alguno
    pub fn duration_minutes(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => Some((completed - started).num_minutes()),
            _ => None,
        }
    }

    pub fn passenger(&self, passenger_id: Uuid) -> Option<&TripPassenger> {
        self.passengers.iter().find(|p| p.passenger_id == passenger_id)
    }

    /// Registro modificable del pasajero; falla si el viaje ya terminó
    fn open_passenger_mut(&mut self, passenger_id: Uuid) -> Result<&mut TripPassenger, DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::TripClosed {
                trip_id: self.id,
                status: self.status,
            });
        }

        let trip_id = self.id;
        self.passengers
            .iter_mut()
            .find(|p| p.passenger_id == passenger_id)
            .ok_or(DomainError::PassengerNotOnTrip { trip_id, passenger_id })
    }

    pub fn board_passenger(&mut self, passenger_id: Uuid, now: DateTime<Utc>) -> Result<&TripPassenger, DomainError> {
        let record = self.open_passenger_mut(passenger_id)?;
        record.board(now)?;
        Ok(record)
    }

    pub fn alight_passenger(&mut self, passenger_id: Uuid, now: DateTime<Utc>) -> Result<&TripPassenger, DomainError> {
        let record = self.open_passenger_mut(passenger_id)?;
        record.alight(now)?;
        Ok(record)
    }

    pub fn mark_passenger_no_show(
        &mut self,
        passenger_id: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<&TripPassenger, DomainError> {
        let record = self.open_passenger_mut(passenger_id)?;
        record.mark_no_show(reason, now)?;
        Ok(record)
    }

    pub fn clear_passenger_no_show(&mut self, passenger_id: Uuid, now: DateTime<Utc>) -> Result<&TripPassenger, DomainError> {
        let record = self.open_passenger_mut(passenger_id)?;
        record.clear_no_show(now);
        Ok(record)
    }

    pub fn passenger_summary(&self) -> PassengerSummary {
        self.passengers.iter().fold(
            PassengerSummary {
                total: self.passengers.len(),
                ..Default::default()
            },
            |mut acc, p| {
                if p.is_boarded {
                    acc.boarded += 1;
                }
                if p.is_alighted {
                    acc.alighted += 1;
                }
                if p.is_no_show() {
                    acc.no_show += 1;
                }
                if p.is_waiting() {
                    acc.waiting += 1;
                }
                acc
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, hour, minute, 0).unwrap()
    }

    fn trip() -> Trip {
        Trip::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            at(6, 0),
        )
    }

    fn driver_of(trip: &Trip) -> CrewMember {
        CrewMember::driver(trip.assigned_driver_id)
    }

    #[test]
    fn test_start_from_pending() {
        let mut t = trip();
        let location = Location::new(37.56, 126.97, at(8, 0));
        let driver = driver_of(&t);

        t.start(driver, Some(location), at(8, 0)).unwrap();

        assert_eq!(t.status, TripStatus::InProgress);
        assert_eq!(t.started_at, Some(at(8, 0)));
        assert_eq!(t.started_by, Some(format!("driver:{}", driver.id)));
        assert_eq!(t.actual_start_location, Some(location));
    }

    #[test]
    fn test_second_start_is_invalid() {
        let mut t = trip();
        let driver = driver_of(&t);
        t.start(driver, None, at(8, 0)).unwrap();

        let err = t.start(driver, None, at(8, 5)).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidTransition {
                action: TripAction::Start,
                from: TripStatus::InProgress
            }
        );
        assert_eq!(t.started_at, Some(at(8, 0)));
    }

    #[test]
    fn test_complete_requires_in_progress() {
        let mut t = trip();
        assert!(matches!(
            t.complete(None, at(9, 0)),
            Err(DomainError::InvalidTransition { action: TripAction::Complete, from: TripStatus::Pending })
        ));

        t.start(driver_of(&t), None, at(8, 0)).unwrap();
        t.complete(None, at(8, 45)).unwrap();
        assert!(t.is_completed());
        assert_eq!(t.duration_minutes(), Some(45));
    }

    #[test]
    fn test_cancel_from_pending_and_in_progress() {
        let mut pending = trip();
        pending.cancel("vehículo averiado".to_string(), at(7, 0)).unwrap();
        assert!(pending.is_cancelled());
        assert_eq!(pending.cancelled_at, Some(at(7, 0)));
        assert_eq!(pending.cancellation_reason.as_deref(), Some("vehículo averiado"));

        let mut running = trip();
        running.start(driver_of(&running), None, at(8, 0)).unwrap();
        running.cancel("accidente".to_string(), at(8, 10)).unwrap();
        assert!(running.is_cancelled());
    }

    #[test]
    fn test_terminal_states_are_irreversible() {
        let mut done = trip();
        done.start(driver_of(&done), None, at(8, 0)).unwrap();
        done.complete(None, at(9, 0)).unwrap();
        assert!(matches!(
            done.cancel("tarde".to_string(), at(9, 5)),
            Err(DomainError::InvalidTransition { action: TripAction::Cancel, from: TripStatus::Completed })
        ));
        assert!(done.is_completed());
        assert_eq!(done.cancellation_reason, None);

        let mut cancelled = trip();
        cancelled.cancel("lluvia".to_string(), at(7, 0)).unwrap();
        assert!(cancelled.cancel("otra".to_string(), at(7, 5)).is_err());
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("lluvia"));
        assert!(cancelled.start(driver_of(&cancelled), None, at(8, 0)).is_err());
    }

    #[test]
    fn test_duration_undefined_until_completed() {
        let mut t = trip();
        assert_eq!(t.duration_minutes(), None);
        t.start(driver_of(&t), None, at(8, 0)).unwrap();
        assert_eq!(t.duration_minutes(), None);
    }

    #[test]
    fn test_crew_membership() {
        let t = trip();
        assert!(t.is_crew_member(&CrewMember::driver(t.assigned_driver_id)));
        assert!(t.is_crew_member(&CrewMember::attendant(t.assigned_attendant_id.unwrap())));
        assert!(!t.is_crew_member(&CrewMember::attendant(t.assigned_driver_id)));
        assert!(!t.is_crew_member(&CrewMember::driver(Uuid::new_v4())));

        let mut no_attendant = trip();
        no_attendant.assigned_attendant_id = None;
        assert!(!no_attendant.is_crew_member(&CrewMember::attendant(Uuid::new_v4())));
    }

    #[test]
    fn test_boarding_is_independent_per_passenger() {
        let mut t = trip();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        t.add_passenger(a, Uuid::new_v4(), at(6, 0));
        t.add_passenger(b, Uuid::new_v4(), at(6, 0));
        let b_before = t.passenger(b).cloned();

        t.board_passenger(a, at(8, 2)).unwrap();

        assert!(t.passenger(a).unwrap().is_boarded);
        assert_eq!(t.passenger(b).cloned(), b_before);
        assert_eq!(
            t.passenger_summary(),
            PassengerSummary { total: 2, boarded: 1, alighted: 0, no_show: 0, waiting: 1 }
        );
    }

    #[test]
    fn test_passenger_records_frozen_after_completion() {
        let mut t = trip();
        let p = Uuid::new_v4();
        t.add_passenger(p, Uuid::new_v4(), at(6, 0));
        t.start(driver_of(&t), None, at(8, 0)).unwrap();
        t.complete(None, at(9, 0)).unwrap();

        assert_eq!(
            t.board_passenger(p, at(9, 1)).unwrap_err(),
            DomainError::TripClosed { trip_id: t.id, status: TripStatus::Completed }
        );
    }

    #[test]
    fn test_unknown_passenger() {
        let mut t = trip();
        let stranger = Uuid::new_v4();
        assert_eq!(
            t.mark_passenger_no_show(stranger, "n/a".to_string(), at(8, 0)).unwrap_err(),
            DomainError::PassengerNotOnTrip { trip_id: t.id, passenger_id: stranger }
        );
    }
}
