use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::FleetStore;
use crate::models::fleet::{Attendant, Driver, Vehicle};
use crate::utils::errors::AppResult;

pub struct PgFleetRepository {
    pool: PgPool,
}

impl PgFleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FleetStore for PgFleetRepository {
    async fn get_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, plate_number, capacity, status, insurance_expiry, inspection_expiry, deleted_at
            FROM vehicles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn get_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(
            "SELECT id, name, status, license_expiry, deleted_at FROM drivers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn get_attendant(&self, id: Uuid) -> AppResult<Option<Attendant>> {
        let attendant = sqlx::query_as::<_, Attendant>(
            "SELECT id, name, status, can_start_trip, deleted_at FROM attendants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendant)
    }

    async fn save_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, plate_number, capacity, status, insurance_expiry, inspection_expiry, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET plate_number = EXCLUDED.plate_number, capacity = EXCLUDED.capacity,
                status = EXCLUDED.status, insurance_expiry = EXCLUDED.insurance_expiry,
                inspection_expiry = EXCLUDED.inspection_expiry, deleted_at = EXCLUDED.deleted_at,
                updated_at = NOW()
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.plate_number)
        .bind(vehicle.capacity)
        .bind(vehicle.status)
        .bind(vehicle.insurance_expiry)
        .bind(vehicle.inspection_expiry)
        .bind(vehicle.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_driver(&self, driver: &Driver) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO drivers (id, name, status, license_expiry, deleted_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, status = EXCLUDED.status,
                license_expiry = EXCLUDED.license_expiry, deleted_at = EXCLUDED.deleted_at,
                updated_at = NOW()
            "#,
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(driver.status)
        .bind(driver.license_expiry)
        .bind(driver.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_attendant(&self, attendant: &Attendant) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attendants (id, name, status, can_start_trip, deleted_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, status = EXCLUDED.status,
                can_start_trip = EXCLUDED.can_start_trip, deleted_at = EXCLUDED.deleted_at,
                updated_at = NOW()
            "#,
        )
        .bind(attendant.id)
        .bind(&attendant.name)
        .bind(attendant.status)
        .bind(attendant.can_start_trip)
        .bind(attendant.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
