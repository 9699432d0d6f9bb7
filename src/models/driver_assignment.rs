//! Modelo de DriverAssignment
//!
//! Sustitución temporal del conductor (o del acompañante) de un schedule, por
//! ejemplo durante unas vacaciones. No modifica el schedule: el resolvedor de
//! asignaciones la consulta al generar cada viaje.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::crew::CrewRole;
use crate::utils::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAssignment {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub role: CrewRole,
    pub substitute_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Datos para crear una sustitución
#[derive(Debug, Clone)]
pub struct NewDriverAssignment {
    pub schedule_id: Uuid,
    pub role: CrewRole,
    pub substitute_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub created_by: Uuid,
}

impl DriverAssignment {
    pub fn create(new: NewDriverAssignment, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if new.end_date < new.start_date {
            return Err(DomainError::InvalidPeriod(format!(
                "end date {} is before start date {}",
                new.end_date, new.start_date
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            schedule_id: new.schedule_id,
            role: new.role,
            substitute_id: new.substitute_id,
            start_date: new.start_date,
            end_date: new.end_date,
            reason: new.reason,
            approved_by: None,
            approved_at: None,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Vigente en `date`: no eliminada y `start_date <= date <= end_date`
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        !self.is_deleted() && self.start_date <= date && date <= self.end_date
    }

    /// Dos sustituciones vivas del mismo schedule y rol cuyos rangos se cruzan
    pub fn overlaps(&self, other: &DriverAssignment) -> bool {
        self.id != other.id
            && self.schedule_id == other.schedule_id
            && self.role == other.role
            && !self.is_deleted()
            && !other.is_deleted()
            && self.start_date <= other.end_date
            && other.start_date <= self.end_date
    }

    pub fn approve(&mut self, approver_id: Uuid, now: DateTime<Utc>) {
        self.approved_by = Some(approver_id);
        self.approved_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }

    /// Amplía el periodo; la nueva fecha no puede quedar antes del fin actual
    pub fn extend(&mut self, new_end_date: NaiveDate, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.check_not_before_start(new_end_date)?;
        if new_end_date < self.end_date {
            return Err(DomainError::InvalidPeriod(format!(
                "new end date {} must not be before current end date {}",
                new_end_date, self.end_date
            )));
        }

        self.end_date = new_end_date;
        self.updated_at = now;
        Ok(())
    }

    /// Acorta el periodo; la nueva fecha no puede quedar después del fin actual
    pub fn shorten(&mut self, new_end_date: NaiveDate, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.check_not_before_start(new_end_date)?;
        if new_end_date > self.end_date {
            return Err(DomainError::InvalidPeriod(format!(
                "new end date {} must not be after current end date {}",
                new_end_date, self.end_date
            )));
        }

        self.end_date = new_end_date;
        self.updated_at = now;
        Ok(())
    }

    fn check_not_before_start(&self, new_end_date: NaiveDate) -> Result<(), DomainError> {
        if new_end_date < self.start_date {
            return Err(DomainError::InvalidPeriod(format!(
                "end date {} cannot be before start date {}",
                new_end_date, self.start_date
            )));
        }
        Ok(())
    }

    pub fn update_reason(&mut self, reason: String, now: DateTime<Utc>) {
        self.reason = reason;
        self.updated_at = now;
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Número de días cubiertos, ambos extremos incluidos
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.start_date > today
    }

    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.is_active_on(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap()
    }

    fn assignment(start: NaiveDate, end: NaiveDate) -> DriverAssignment {
        DriverAssignment::create(
            NewDriverAssignment {
                schedule_id: Uuid::new_v4(),
                role: CrewRole::Driver,
                substitute_id: Uuid::new_v4(),
                start_date: start,
                end_date: end,
                reason: "vacaciones del titular".to_string(),
                created_by: Uuid::new_v4(),
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_rejects_end_before_start() {
        let result = DriverAssignment::create(
            NewDriverAssignment {
                schedule_id: Uuid::new_v4(),
                role: CrewRole::Driver,
                substitute_id: Uuid::new_v4(),
                start_date: d(2025, 1, 20),
                end_date: d(2025, 1, 19),
                reason: String::new(),
                created_by: Uuid::new_v4(),
            },
            now(),
        );
        assert!(matches!(result, Err(DomainError::InvalidPeriod(_))));
    }

    #[test]
    fn test_active_range_is_inclusive() {
        let a = assignment(d(2025, 1, 20), d(2025, 1, 24));
        assert!(!a.is_active_on(d(2025, 1, 19)));
        assert!(a.is_active_on(d(2025, 1, 20)));
        assert!(a.is_active_on(d(2025, 1, 22)));
        assert!(a.is_active_on(d(2025, 1, 24)));
        assert!(!a.is_active_on(d(2025, 1, 25)));
    }

    #[test]
    fn test_soft_deleted_is_never_active() {
        let mut a = assignment(d(2025, 1, 20), d(2025, 1, 24));
        a.soft_delete(now());
        assert!(!a.is_active_on(d(2025, 1, 21)));
    }

    #[test]
    fn test_extend_rules() {
        let mut a = assignment(d(2025, 1, 20), d(2025, 1, 24));
        assert!(a.extend(d(2025, 1, 23), now()).is_err());
        assert!(a.extend(d(2025, 1, 19), now()).is_err());
        assert_eq!(a.end_date, d(2025, 1, 24));

        a.extend(d(2025, 1, 31), now()).unwrap();
        assert_eq!(a.end_date, d(2025, 1, 31));
        assert_eq!(a.duration_days(), 12);
    }

    #[test]
    fn test_shorten_rules() {
        let mut a = assignment(d(2025, 1, 20), d(2025, 1, 24));
        assert!(a.shorten(d(2025, 1, 25), now()).is_err());
        assert!(a.shorten(d(2025, 1, 19), now()).is_err());

        a.shorten(d(2025, 1, 20), now()).unwrap();
        assert_eq!(a.end_date, d(2025, 1, 20));
        assert_eq!(a.duration_days(), 1);
    }

    #[test]
    fn test_approval() {
        let mut a = assignment(d(2025, 1, 20), d(2025, 1, 24));
        assert!(!a.is_approved());
        let approver = Uuid::new_v4();
        a.approve(approver, now());
        assert!(a.is_approved());
        assert_eq!(a.approved_by, Some(approver));
    }

    #[test]
    fn test_relative_to_today() {
        let a = assignment(d(2025, 1, 20), d(2025, 1, 24));
        assert!(a.is_upcoming(d(2025, 1, 10)));
        assert!(a.is_current(d(2025, 1, 21)));
        assert!(a.is_expired(d(2025, 1, 25)));
        assert!(!a.is_expired(d(2025, 1, 24)));
    }

    #[test]
    fn test_overlap_requires_same_schedule_and_role() {
        let a = assignment(d(2025, 1, 20), d(2025, 1, 24));
        let mut b = assignment(d(2025, 1, 24), d(2025, 1, 30));
        assert!(!a.overlaps(&b));

        b.schedule_id = a.schedule_id;
        assert!(a.overlaps(&b));

        b.role = CrewRole::Attendant;
        assert!(!a.overlaps(&b));

        b.role = CrewRole::Driver;
        b.start_date = d(2025, 1, 25);
        assert!(!a.overlaps(&b));
    }
}
