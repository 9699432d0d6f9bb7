//! Registro de abordaje de un pasajero dentro de un viaje
//!
//! Cada pasajero evoluciona de forma independiente: subir, bajar o no presentarse.
//! Reglas: abordado y no-show se excluyen, bajado implica abordado.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPassenger {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub passenger_id: Uuid,
    pub stop_id: Uuid,
    pub is_boarded: bool,
    pub boarded_at: Option<DateTime<Utc>>,
    pub is_alighted: bool,
    pub alighted_at: Option<DateTime<Utc>>,
    pub no_show_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripPassenger {
    pub fn new(trip_id: Uuid, passenger_id: Uuid, stop_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            passenger_id,
            stop_id,
            is_boarded: false,
            boarded_at: None,
            is_alighted: false,
            alighted_at: None,
            no_show_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_no_show(&self) -> bool {
        self.no_show_reason.is_some()
    }

    /// Ni abordado ni marcado como ausente
    pub fn is_waiting(&self) -> bool {
        !self.is_boarded && !self.is_no_show()
    }

    /// Registra la subida; un no-show debe corregirse antes con `clear_no_show`
    ///
    /// Cada pasajero sube una sola vez por viaje.
    pub fn board(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_no_show() {
            return Err(DomainError::PassengerNoShow(self.passenger_id));
        }
        if self.is_alighted {
            return Err(DomainError::AlreadyAlighted(self.passenger_id));
        }
        if self.is_boarded {
            return Err(DomainError::AlreadyBoarded(self.passenger_id));
        }

        self.is_boarded = true;
        self.boarded_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn alight(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_boarded {
            return Err(DomainError::NotBoarded(self.passenger_id));
        }
        if self.is_alighted {
            return Err(DomainError::AlreadyAlighted(self.passenger_id));
        }

        self.is_alighted = true;
        self.alighted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_no_show(&mut self, reason: String, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_alighted {
            return Err(DomainError::AlreadyAlighted(self.passenger_id));
        }

        self.is_boarded = false;
        self.boarded_at = None;
        self.no_show_reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }

    pub fn clear_no_show(&mut self, now: DateTime<Utc>) {
        if self.no_show_reason.take().is_some() {
            self.updated_at = now;
        }
    }

    /// Minutos a bordo, solo si constan subida y bajada
    pub fn boarding_duration_minutes(&self) -> Option<i64> {
        match (self.boarded_at, self.alighted_at) {
            (Some(boarded), Some(alighted)) => Some((alighted - boarded).num_minutes()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, 8, minute, 0).unwrap()
    }

    fn record() -> TripPassenger {
        TripPassenger::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), at(0))
    }

    #[test]
    fn test_board_then_alight() {
        let mut p = record();
        assert!(p.is_waiting());

        p.board(at(5)).unwrap();
        assert!(p.is_boarded);
        assert_eq!(p.boarded_at, Some(at(5)));
        assert_eq!(p.boarding_duration_minutes(), None);

        p.alight(at(35)).unwrap();
        assert!(p.is_alighted);
        assert_eq!(p.boarding_duration_minutes(), Some(30));
    }

    #[test]
    fn test_alight_requires_boarding() {
        let mut p = record();
        assert_eq!(p.alight(at(10)), Err(DomainError::NotBoarded(p.passenger_id)));
        assert!(!p.is_alighted);
        assert_eq!(p.alighted_at, None);
    }

    #[test]
    fn test_no_show_blocks_boarding_until_cleared() {
        let mut p = record();
        p.mark_no_show("enfermo".to_string(), at(3)).unwrap();
        assert!(!p.is_boarded);
        assert!(p.is_no_show());
        assert!(!p.is_waiting());

        assert_eq!(p.board(at(4)), Err(DomainError::PassengerNoShow(p.passenger_id)));

        p.clear_no_show(at(6));
        p.board(at(7)).unwrap();
        assert!(p.is_boarded);
        assert_eq!(p.no_show_reason, None);
    }

    #[test]
    fn test_no_show_after_boarding_resets_boarding() {
        let mut p = record();
        p.board(at(5)).unwrap();
        p.mark_no_show("bajó antes de salir".to_string(), at(6)).unwrap();
        assert!(!p.is_boarded);
        assert_eq!(p.boarded_at, None);
    }

    #[test]
    fn test_no_show_rejected_after_alighting() {
        let mut p = record();
        p.board(at(5)).unwrap();
        p.alight(at(20)).unwrap();
        let before = p.clone();

        assert_eq!(
            p.mark_no_show("error".to_string(), at(21)),
            Err(DomainError::AlreadyAlighted(p.passenger_id))
        );
        assert_eq!(p, before);
    }

    #[test]
    fn test_boarding_and_alighting_happen_once() {
        let mut p = record();
        p.board(at(5)).unwrap();
        assert_eq!(p.board(at(6)), Err(DomainError::AlreadyBoarded(p.passenger_id)));
        assert_eq!(p.boarded_at, Some(at(5)));

        p.alight(at(30)).unwrap();
        let before = p.clone();

        assert_eq!(p.board(at(40)), Err(DomainError::AlreadyAlighted(p.passenger_id)));
        assert_eq!(p.alight(at(45)), Err(DomainError::AlreadyAlighted(p.passenger_id)));
        assert_eq!(p, before);
        assert_eq!(p.boarding_duration_minutes(), Some(25));
    }

    #[test]
    fn test_duration_truncates_to_whole_minutes() {
        let mut p = record();
        p.board(at(0)).unwrap();
        p.alight(at(0) + Duration::seconds(150)).unwrap();
        assert_eq!(p.boarding_duration_minutes(), Some(2));
    }
}
