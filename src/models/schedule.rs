//! Modelo de Schedule
//!
//! Un Schedule es la plantilla de un recorrido recurrente ("todos los días hábiles
//! a las 08:00, ruta A"). Los viajes concretos (Trip) se generan a partir de él.
//! Nunca se elimina físicamente: se desactiva o se marca con `deleted_at`.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;

use crate::utils::errors::DomainError;

/// Estado del schedule - mapea al ENUM schedule_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "schedule_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Active,
    Inactive,
}

/// Franja horaria - mapea al ENUM time_slot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "time_slot", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

/// Días de la semana en numeración ISO (1 = lunes ... 7 = domingo)
pub type DaysOfWeek = BTreeSet<u32>;

/// Valida que todos los días estén en el rango 1..=7
pub fn validate_days_of_week(days: &DaysOfWeek) -> Result<(), DomainError> {
    match days.iter().find(|d| !(1..=7).contains(*d)) {
        Some(&day) => Err(DomainError::InvalidWeekday(day)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ScheduleStatus,
    pub start_time: NaiveTime,
    pub time_slot: TimeSlot,
    pub days_of_week: DaysOfWeek,
    pub route_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    pub default_driver_id: Uuid,
    pub default_attendant_id: Option<Uuid>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Datos necesarios para crear un schedule
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub name: String,
    pub description: Option<String>,
    pub start_time: NaiveTime,
    pub time_slot: TimeSlot,
    pub days_of_week: DaysOfWeek,
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
    pub default_driver_id: Uuid,
    pub default_attendant_id: Option<Uuid>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl Schedule {
    /// Crea un schedule activo a partir de los datos validados
    pub fn create(new: NewSchedule, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_days_of_week(&new.days_of_week)?;
        validate_window(new.valid_from, new.valid_to)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            status: ScheduleStatus::Active,
            start_time: new.start_time,
            time_slot: new.time_slot,
            days_of_week: new.days_of_week,
            route_id: new.route_id,
            vehicle_id: Some(new.vehicle_id),
            default_driver_id: new.default_driver_id,
            default_attendant_id: new.default_attendant_id,
            valid_from: new.valid_from,
            valid_to: new.valid_to,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Activo y no eliminado
    pub fn is_active(&self) -> bool {
        self.status == ScheduleStatus::Active && !self.is_deleted()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.status = ScheduleStatus::Active;
        self.updated_at = now;
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.status = ScheduleStatus::Inactive;
        self.updated_at = now;
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn change_start_time(&mut self, start_time: NaiveTime, now: DateTime<Utc>) {
        self.start_time = start_time;
        self.updated_at = now;
    }

    pub fn change_days_of_week(&mut self, days: DaysOfWeek, now: DateTime<Utc>) -> Result<(), DomainError> {
        validate_days_of_week(&days)?;
        self.days_of_week = days;
        self.updated_at = now;
        Ok(())
    }

    pub fn assign_vehicle(&mut self, vehicle_id: Uuid, now: DateTime<Utc>) {
        self.vehicle_id = Some(vehicle_id);
        self.updated_at = now;
    }

    pub fn assign_driver(&mut self, driver_id: Uuid, now: DateTime<Utc>) {
        self.default_driver_id = driver_id;
        self.updated_at = now;
    }

    pub fn assign_attendant(&mut self, attendant_id: Uuid, now: DateTime<Utc>) {
        self.default_attendant_id = Some(attendant_id);
        self.updated_at = now;
    }

    pub fn unassign_attendant(&mut self, now: DateTime<Utc>) {
        self.default_attendant_id = None;
        self.updated_at = now;
    }

    pub fn has_attendant(&self) -> bool {
        self.default_attendant_id.is_some()
    }

    /// Fija la ventana de validez; ambos extremos son inclusivos
    pub fn set_valid_period(&mut self, from: NaiveDate, to: NaiveDate, now: DateTime<Utc>) -> Result<(), DomainError> {
        validate_window(Some(from), Some(to))?;
        self.valid_from = Some(from);
        self.valid_to = Some(to);
        self.updated_at = now;
        Ok(())
    }

    pub fn clear_valid_period(&mut self, now: DateTime<Utc>) {
        self.valid_from = None;
        self.valid_to = None;
        self.updated_at = now;
    }

    /// Solo circula de lunes a viernes
    pub fn runs_weekdays_only(&self) -> bool {
        !self.days_of_week.is_empty() && self.days_of_week.iter().all(|d| (1..=5).contains(d))
    }

    /// Circula al menos un día del fin de semana
    pub fn runs_on_weekend(&self) -> bool {
        self.days_of_week.iter().any(|d| *d >= 6)
    }
}

fn validate_window(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), DomainError> {
    match (from, to) {
        (Some(from), Some(to)) if to < from => Err(DomainError::InvalidPeriod(format!(
            "valid_to {} is before valid_from {}",
            to, from
        ))),
        _ => Ok(()),
    }
}
