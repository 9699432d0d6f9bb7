//! Flota y personal: vehículos, conductores y acompañantes
//!
//! La generación de viajes solo asigna recursos disponibles en la fecha del
//! viaje. Las caducidades (seguro, inspección, licencia) son fechas y siguen
//! siendo válidas durante el propio día de caducidad.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Maintenance,
    Inactive,
}

/// Estado de conductores y acompañantes - mapea al ENUM staff_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "staff_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    Active,
    OnLeave,
    Inactive,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VehicleStatus::Active => "active",
            VehicleStatus::Maintenance => "maintenance",
            VehicleStatus::Inactive => "inactive",
        })
    }
}

impl fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StaffStatus::Active => "active",
            StaffStatus::OnLeave => "on_leave",
            StaffStatus::Inactive => "inactive",
        })
    }
}

/// Motivo por el que un recurso no puede usarse en un viaje
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum Unavailable {
    #[error("deleted")]
    Deleted,

    #[error("vehicle status is {0}")]
    VehicleStatus(VehicleStatus),

    #[error("staff status is {0}")]
    StaffStatus(StaffStatus),

    #[error("insurance expired on {0}")]
    InsuranceExpired(NaiveDate),

    #[error("inspection expired on {0}")]
    InspectionExpired(NaiveDate),

    #[error("license expired on {0}")]
    LicenseExpired(NaiveDate),
}

fn expired(expiry: Option<NaiveDate>, date: NaiveDate) -> Option<NaiveDate> {
    expiry.filter(|e| *e < date)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate_number: String,
    pub capacity: i32,
    pub status: VehicleStatus,
    pub insurance_expiry: Option<NaiveDate>,
    pub inspection_expiry: Option<NaiveDate>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Vehicle {
    pub fn new(id: Uuid, plate_number: impl Into<String>, capacity: i32) -> Self {
        Self {
            id,
            plate_number: plate_number.into(),
            capacity,
            status: VehicleStatus::Active,
            insurance_expiry: None,
            inspection_expiry: None,
            deleted_at: None,
        }
    }

    /// En servicio, con seguro e inspección vigentes en `date`
    pub fn check_available_on(&self, date: NaiveDate) -> Result<(), Unavailable> {
        if self.deleted_at.is_some() {
            return Err(Unavailable::Deleted);
        }
        if self.status != VehicleStatus::Active {
            return Err(Unavailable::VehicleStatus(self.status));
        }
        if let Some(expiry) = expired(self.insurance_expiry, date) {
            return Err(Unavailable::InsuranceExpired(expiry));
        }
        if let Some(expiry) = expired(self.inspection_expiry, date) {
            return Err(Unavailable::InspectionExpired(expiry));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub status: StaffStatus,
    pub license_expiry: NaiveDate,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Driver {
    pub fn new(id: Uuid, name: impl Into<String>, license_expiry: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            status: StaffStatus::Active,
            license_expiry,
            deleted_at: None,
        }
    }

    /// Activo y con licencia vigente en `date`
    pub fn check_available_on(&self, date: NaiveDate) -> Result<(), Unavailable> {
        if self.deleted_at.is_some() {
            return Err(Unavailable::Deleted);
        }
        if self.status != StaffStatus::Active {
            return Err(Unavailable::StaffStatus(self.status));
        }
        if let Some(expiry) = expired(Some(self.license_expiry), date) {
            return Err(Unavailable::LicenseExpired(expiry));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Attendant {
    pub id: Uuid,
    pub name: String,
    pub status: StaffStatus,
    /// Permiso para iniciar viajes; los conductores lo tienen siempre
    pub can_start_trip: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Attendant {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: StaffStatus::Active,
            can_start_trip: false,
            deleted_at: None,
        }
    }

    pub fn with_start_permission(mut self) -> Self {
        self.can_start_trip = true;
        self
    }

    pub fn check_available(&self) -> Result<(), Unavailable> {
        if self.deleted_at.is_some() {
            return Err(Unavailable::Deleted);
        }
        if self.status != StaffStatus::Active {
            return Err(Unavailable::StaffStatus(self.status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_vehicle_availability() {
        let date = d(2025, 1, 20);
        let mut v = Vehicle::new(Uuid::new_v4(), "1234-BCD", 15);
        assert_eq!(v.check_available_on(date), Ok(()));

        v.insurance_expiry = Some(date);
        assert_eq!(v.check_available_on(date), Ok(()));
        assert_eq!(
            v.check_available_on(d(2025, 1, 21)),
            Err(Unavailable::InsuranceExpired(date))
        );

        v.insurance_expiry = None;
        v.inspection_expiry = Some(d(2024, 12, 31));
        assert_eq!(
            v.check_available_on(date),
            Err(Unavailable::InspectionExpired(d(2024, 12, 31)))
        );

        v.inspection_expiry = None;
        v.status = VehicleStatus::Maintenance;
        let err = v.check_available_on(date).unwrap_err();
        assert_eq!(err.to_string(), "vehicle status is maintenance");
    }

    #[test]
    fn test_driver_license_expiry() {
        let mut driver = Driver::new(Uuid::new_v4(), "Marta", d(2025, 1, 19));
        assert_eq!(
            driver.check_available_on(d(2025, 1, 20)),
            Err(Unavailable::LicenseExpired(d(2025, 1, 19)))
        );
        assert_eq!(driver.check_available_on(d(2025, 1, 19)), Ok(()));

        driver.status = StaffStatus::OnLeave;
        assert_eq!(
            driver.check_available_on(d(2025, 1, 1)),
            Err(Unavailable::StaffStatus(StaffStatus::OnLeave))
        );
    }

    #[test]
    fn test_attendant_defaults_without_start_permission() {
        let attendant = Attendant::new(Uuid::new_v4(), "Pilar");
        assert!(!attendant.can_start_trip);
        assert!(attendant.clone().with_start_permission().can_start_trip);

        let mut deleted = attendant;
        deleted.deleted_at = Some(Utc::now());
        assert_eq!(deleted.check_available(), Err(Unavailable::Deleted));
    }
}
