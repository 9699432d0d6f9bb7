use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Attendant, Driver, StaffStatus, Vehicle, VehicleStatus};
use crate::utils::validation::validate_not_blank;

// Request para registrar o reemplazar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct SaveVehicleRequest {
    #[validate(length(min = 1, max = 20), custom = "validate_not_blank")]
    pub plate_number: String,
    #[validate(range(min = 1, max = 100))]
    pub capacity: i32,
    pub status: Option<VehicleStatus>,
    pub insurance_expiry: Option<NaiveDate>,
    pub inspection_expiry: Option<NaiveDate>,
}

impl SaveVehicleRequest {
    pub fn into_vehicle(self, id: Uuid) -> Vehicle {
        Vehicle {
            status: self.status.unwrap_or(VehicleStatus::Active),
            insurance_expiry: self.insurance_expiry,
            inspection_expiry: self.inspection_expiry,
            ..Vehicle::new(id, self.plate_number.trim(), self.capacity)
        }
    }
}

// Request para registrar o reemplazar un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct SaveDriverRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    pub status: Option<StaffStatus>,
    pub license_expiry: NaiveDate,
}

impl SaveDriverRequest {
    pub fn into_driver(self, id: Uuid) -> Driver {
        Driver {
            status: self.status.unwrap_or(StaffStatus::Active),
            ..Driver::new(id, self.name.trim(), self.license_expiry)
        }
    }
}

// Request para registrar o reemplazar un acompañante
#[derive(Debug, Deserialize, Validate)]
pub struct SaveAttendantRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub name: String,
    pub status: Option<StaffStatus>,
    #[serde(default)]
    pub can_start_trip: bool,
}

impl SaveAttendantRequest {
    pub fn into_attendant(self, id: Uuid) -> Attendant {
        Attendant {
            status: self.status.unwrap_or(StaffStatus::Active),
            can_start_trip: self.can_start_trip,
            ..Attendant::new(id, self.name.trim())
        }
    }
}
