use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::PassengerStore;
use crate::models::passenger::Passenger;
use crate::utils::errors::AppResult;

pub struct PgPassengerRepository {
    pool: PgPool,
}

impl PgPassengerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PassengerStore for PgPassengerRepository {
    async fn list_passengers_assigned_to_route(&self, route_id: Uuid) -> AppResult<Vec<Passenger>> {
        let passengers = sqlx::query_as::<_, Passenger>(
            r#"
            SELECT id, name, status, assigned_route_id, assigned_stop_id, stop_order, deleted_at
            FROM passengers
            WHERE assigned_route_id = $1
              AND assigned_stop_id IS NOT NULL
              AND status = 'active'
              AND deleted_at IS NULL
            ORDER BY stop_order, name
            "#,
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(passengers)
    }
}
