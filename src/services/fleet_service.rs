//! Servicio de flota
//!
//! Alta y consulta de vehículos, conductores y acompañantes. La generación de
//! viajes solo asigna los que están registrados y disponibles.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::models::fleet::{Attendant, Driver, Vehicle};
use crate::repositories::FleetStore;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct FleetService {
    fleet: Arc<dyn FleetStore>,
}

impl FleetService {
    pub fn new(fleet: Arc<dyn FleetStore>) -> Self {
        Self { fleet }
    }

    pub async fn save_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        self.fleet.save_vehicle(&vehicle).await?;
        info!("🚐 Vehículo {} ({}) guardado: {}", vehicle.id, vehicle.plate_number, vehicle.status);
        Ok(vehicle)
    }

    pub async fn get_vehicle(&self, id: Uuid) -> AppResult<Vehicle> {
        self.fleet
            .get_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id))
    }

    pub async fn save_driver(&self, driver: Driver) -> AppResult<Driver> {
        self.fleet.save_driver(&driver).await?;
        info!("🧑‍✈️ Conductor {} guardado: {}", driver.id, driver.status);
        Ok(driver)
    }

    pub async fn get_driver(&self, id: Uuid) -> AppResult<Driver> {
        self.fleet
            .get_driver(id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &id))
    }

    pub async fn save_attendant(&self, attendant: Attendant) -> AppResult<Attendant> {
        self.fleet.save_attendant(&attendant).await?;
        info!(
            "🧑‍🏫 Acompañante {} guardado: {} (puede iniciar viajes: {})",
            attendant.id, attendant.status, attendant.can_start_trip
        );
        Ok(attendant)
    }

    pub async fn get_attendant(&self, id: Uuid) -> AppResult<Attendant> {
        self.fleet
            .get_attendant(id)
            .await?
            .ok_or_else(|| not_found_error("Attendant", &id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use crate::utils::errors::AppError;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_save_replaces_by_id() {
        let service = FleetService::new(Arc::new(MemoryStore::new()));
        let id = Uuid::new_v4();
        let expiry = NaiveDate::from_ymd_opt(2027, 6, 30).unwrap();

        service.save_driver(Driver::new(id, "Luis", expiry)).await.unwrap();
        let mut renamed = Driver::new(id, "Luis Gómez", expiry);
        renamed.license_expiry = NaiveDate::from_ymd_opt(2032, 6, 30).unwrap();
        service.save_driver(renamed.clone()).await.unwrap();

        assert_eq!(service.get_driver(id).await.unwrap(), renamed);
        assert!(matches!(service.get_vehicle(id).await, Err(AppError::NotFound(_))));
    }
}
