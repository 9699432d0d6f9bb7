use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{CreateOutcome, TripStore};
use crate::models::location::Location;
use crate::models::trip::{Trip, TripStatus};
use crate::models::trip_passenger::TripPassenger;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    schedule_id: Uuid,
    trip_date: NaiveDate,
    status: TripStatus,
    vehicle_id: Uuid,
    assigned_driver_id: Uuid,
    assigned_attendant_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    started_by: Option<String>,
    actual_start_location: Option<Json<Location>>,
    actual_end_location: Option<Json<Location>>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
    notes: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct TripPassengerRow {
    id: Uuid,
    trip_id: Uuid,
    passenger_id: Uuid,
    stop_id: Uuid,
    is_boarded: bool,
    boarded_at: Option<DateTime<Utc>>,
    is_alighted: bool,
    alighted_at: Option<DateTime<Utc>>,
    no_show_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TripPassengerRow> for TripPassenger {
    fn from(row: TripPassengerRow) -> Self {
        Self {
            id: row.id,
            trip_id: row.trip_id,
            passenger_id: row.passenger_id,
            stop_id: row.stop_id,
            is_boarded: row.is_boarded,
            boarded_at: row.boarded_at,
            is_alighted: row.is_alighted,
            alighted_at: row.alighted_at,
            no_show_reason: row.no_show_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TripRow {
    fn into_trip(self, passengers: Vec<TripPassenger>) -> Trip {
        Trip {
            id: self.id,
            schedule_id: self.schedule_id,
            date: self.trip_date,
            status: self.status,
            vehicle_id: self.vehicle_id,
            assigned_driver_id: self.assigned_driver_id,
            assigned_attendant_id: self.assigned_attendant_id,
            started_at: self.started_at,
            completed_at: self.completed_at,
            started_by: self.started_by,
            actual_start_location: self.actual_start_location.map(|l| l.0),
            actual_end_location: self.actual_end_location.map(|l| l.0),
            cancelled_at: self.cancelled_at,
            cancellation_reason: self.cancellation_reason,
            notes: self.notes,
            passengers,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn passengers_for(&self, trip_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<TripPassenger>>> {
        let rows = sqlx::query_as::<_, TripPassengerRow>(
            r#"
            SELECT id, trip_id, passenger_id, stop_id, is_boarded, boarded_at,
                   is_alighted, alighted_at, no_show_reason, created_at, updated_at
            FROM trip_passengers
            WHERE trip_id = ANY($1)
            ORDER BY trip_id, position
            "#,
        )
        .bind(trip_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<TripPassenger>> = HashMap::new();
        for row in rows {
            grouped.entry(row.trip_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn insert_passengers(tx: &mut Transaction<'_, Postgres>, trip: &Trip) -> Result<(), sqlx::Error> {
        for (position, p) in trip.passengers.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO trip_passengers (
                    id, trip_id, passenger_id, stop_id, position, is_boarded, boarded_at,
                    is_alighted, alighted_at, no_show_reason, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(p.id)
            .bind(p.trip_id)
            .bind(p.passenger_id)
            .bind(p.stop_id)
            .bind(position as i32)
            .bind(p.is_boarded)
            .bind(p.boarded_at)
            .bind(p.is_alighted)
            .bind(p.alighted_at)
            .bind(&p.no_show_reason)
            .bind(p.created_at)
            .bind(p.updated_at)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TripStore for PgTripRepository {
    async fn existing_trip_keys_for_date(&self, date: NaiveDate) -> AppResult<HashSet<Uuid>> {
        let keys: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT schedule_id FROM trips WHERE trip_date = $1 AND deleted_at IS NULL",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys.into_iter().map(|(id,)| id).collect())
    }

    async fn create(&self, trip: &Trip) -> AppResult<CreateOutcome> {
        let mut tx = self.pool.begin().await?;

        // El índice único parcial (schedule_id, trip_date) decide quién gana la carrera
        let inserted = sqlx::query(
            r#"
            INSERT INTO trips (
                id, schedule_id, trip_date, status, vehicle_id, assigned_driver_id,
                assigned_attendant_id, notes, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (schedule_id, trip_date) WHERE deleted_at IS NULL DO NOTHING
            "#,
        )
        .bind(trip.id)
        .bind(trip.schedule_id)
        .bind(trip.date)
        .bind(trip.status)
        .bind(trip.vehicle_id)
        .bind(trip.assigned_driver_id)
        .bind(trip.assigned_attendant_id)
        .bind(&trip.notes)
        .bind(trip.version)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&mut *tx)
        .await;

        let rows = match inserted {
            Ok(result) => result.rows_affected(),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => 0,
            Err(e) => return Err(e.into()),
        };

        if rows == 0 {
            debug!("🔁 Viaje duplicado para schedule {} el {}", trip.schedule_id, trip.date);
            tx.rollback().await?;
            return Ok(CreateOutcome::Duplicate);
        }

        Self::insert_passengers(&mut tx, trip).await?;
        tx.commit().await?;

        Ok(CreateOutcome::Created)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>("SELECT * FROM trips WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let passengers = self.passengers_for(&[row.id]).await?.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_trip(passengers)))
    }

    async fn update(&self, trip: &Trip, expected_version: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        // Solo escribe si nadie ha guardado el viaje desde que se leyó
        let result = sqlx::query(
            r#"
            UPDATE trips
            SET status = $2, started_at = $3, completed_at = $4, started_by = $5,
                actual_start_location = $6, actual_end_location = $7, cancelled_at = $8,
                cancellation_reason = $9, notes = $10, updated_at = $11, deleted_at = $12,
                version = $13
            WHERE id = $1 AND version = $14
            "#,
        )
        .bind(trip.id)
        .bind(trip.status)
        .bind(trip.started_at)
        .bind(trip.completed_at)
        .bind(&trip.started_by)
        .bind(trip.actual_start_location.map(Json))
        .bind(trip.actual_end_location.map(Json))
        .bind(trip.cancelled_at)
        .bind(&trip.cancellation_reason)
        .bind(&trip.notes)
        .bind(trip.updated_at)
        .bind(trip.deleted_at)
        .bind(trip.version)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT version FROM trips WHERE id = $1")
                .bind(trip.id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return Err(match exists {
                Some((current,)) => {
                    debug!(
                        "🔒 Viaje {} modificado por otro escritor (versión {} != {})",
                        trip.id, current, expected_version
                    );
                    AppError::Conflict(format!(
                        "Trip {} was modified concurrently (version {} != {})",
                        trip.id, current, expected_version
                    ))
                }
                None => AppError::NotFound(format!("Trip {} not found", trip.id)),
            });
        }

        for p in &trip.passengers {
            sqlx::query(
                r#"
                UPDATE trip_passengers
                SET is_boarded = $2, boarded_at = $3, is_alighted = $4, alighted_at = $5,
                    no_show_reason = $6, updated_at = $7
                WHERE id = $1
                "#,
            )
            .bind(p.id)
            .bind(p.is_boarded)
            .bind(p.boarded_at)
            .bind(p.is_alighted)
            .bind(p.alighted_at)
            .bind(&p.no_show_reason)
            .bind(p.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_for_date(&self, date: NaiveDate) -> AppResult<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(
            "SELECT * FROM trips WHERE trip_date = $1 AND deleted_at IS NULL ORDER BY created_at, id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut passengers = self.passengers_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let list = passengers.remove(&row.id).unwrap_or_default();
                row.into_trip(list)
            })
            .collect())
    }
}
