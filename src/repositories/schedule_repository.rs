use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ScheduleStore;
use crate::models::schedule::{Schedule, ScheduleStatus, TimeSlot};
use crate::utils::errors::{AppError, AppResult};

// Fila tal cual está en la tabla schedules
#[derive(Debug, sqlx::FromRow)]
struct ScheduleRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    status: ScheduleStatus,
    start_time: NaiveTime,
    time_slot: TimeSlot,
    days_of_week: Vec<i32>,
    route_id: Uuid,
    vehicle_id: Option<Uuid>,
    default_driver_id: Uuid,
    default_attendant_id: Option<Uuid>,
    valid_from: Option<NaiveDate>,
    valid_to: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            status: row.status,
            start_time: row.start_time,
            time_slot: row.time_slot,
            days_of_week: row
                .days_of_week
                .into_iter()
                .filter_map(|d| u32::try_from(d).ok())
                .collect(),
            route_id: row.route_id,
            vehicle_id: row.vehicle_id,
            default_driver_id: row.default_driver_id,
            default_attendant_id: row.default_attendant_id,
            valid_from: row.valid_from,
            valid_to: row.valid_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

fn days_column(schedule: &Schedule) -> Vec<i32> {
    schedule.days_of_week.iter().map(|d| *d as i32).collect()
}

pub struct PgScheduleRepository {
    pool: PgPool,
}

impl PgScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleRepository {
    async fn list_candidates_for_date(&self, date: NaiveDate) -> AppResult<Vec<Schedule>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT * FROM schedules
            WHERE deleted_at IS NULL
              AND status = 'active'
              AND (valid_from IS NULL OR valid_from <= $1)
              AND (valid_to IS NULL OR valid_to >= $1)
            ORDER BY start_time, created_at, id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Schedule>> {
        let row = sqlx::query_as::<_, ScheduleRow>("SELECT * FROM schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Schedule::from))
    }

    async fn create(&self, schedule: &Schedule) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO schedules (
                id, name, description, status, start_time, time_slot, days_of_week,
                route_id, vehicle_id, default_driver_id, default_attendant_id,
                valid_from, valid_to, created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(schedule.id)
        .bind(&schedule.name)
        .bind(&schedule.description)
        .bind(schedule.status)
        .bind(schedule.start_time)
        .bind(schedule.time_slot)
        .bind(days_column(schedule))
        .bind(schedule.route_id)
        .bind(schedule.vehicle_id)
        .bind(schedule.default_driver_id)
        .bind(schedule.default_attendant_id)
        .bind(schedule.valid_from)
        .bind(schedule.valid_to)
        .bind(schedule.created_at)
        .bind(schedule.updated_at)
        .bind(schedule.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, schedule: &Schedule) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE schedules
            SET name = $2, description = $3, status = $4, start_time = $5, time_slot = $6,
                days_of_week = $7, route_id = $8, vehicle_id = $9, default_driver_id = $10,
                default_attendant_id = $11, valid_from = $12, valid_to = $13,
                updated_at = $14, deleted_at = $15
            WHERE id = $1
            "#,
        )
        .bind(schedule.id)
        .bind(&schedule.name)
        .bind(&schedule.description)
        .bind(schedule.status)
        .bind(schedule.start_time)
        .bind(schedule.time_slot)
        .bind(days_column(schedule))
        .bind(schedule.route_id)
        .bind(schedule.vehicle_id)
        .bind(schedule.default_driver_id)
        .bind(schedule.default_attendant_id)
        .bind(schedule.valid_from)
        .bind(schedule.valid_to)
        .bind(schedule.updated_at)
        .bind(schedule.deleted_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule {} not found", schedule.id)));
        }
        Ok(())
    }
}
