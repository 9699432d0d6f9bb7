use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::AssignmentStore;
use crate::models::driver_assignment::DriverAssignment;
use crate::models::crew::CrewRole;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct DriverAssignmentRow {
    id: Uuid,
    schedule_id: Uuid,
    role: CrewRole,
    substitute_id: Uuid,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
    reason: String,
    approved_by: Option<Uuid>,
    approved_at: Option<chrono::DateTime<chrono::Utc>>,
    created_by: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<DriverAssignmentRow> for DriverAssignment {
    fn from(row: DriverAssignmentRow) -> Self {
        Self {
            id: row.id,
            schedule_id: row.schedule_id,
            role: row.role,
            substitute_id: row.substitute_id,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            approved_by: row.approved_by,
            approved_at: row.approved_at,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

pub struct PgDriverAssignmentRepository {
    pool: PgPool,
}

impl PgDriverAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bloquea la fila del schedule y rechaza solapes con sustituciones vivas.
    /// El bloqueo serializa las escrituras del mismo schedule entre instancias
    /// hasta el commit.
    async fn check_overlap(tx: &mut Transaction<'_, Postgres>, assignment: &DriverAssignment) -> AppResult<()> {
        sqlx::query("SELECT id FROM schedules WHERE id = $1 FOR UPDATE")
            .bind(assignment.schedule_id)
            .execute(&mut **tx)
            .await?;

        if assignment.is_deleted() {
            return Ok(());
        }

        let overlapping = sqlx::query_as::<_, DriverAssignmentRow>(
            r#"
            SELECT * FROM driver_assignments
            WHERE schedule_id = $1 AND role = $2 AND id <> $3 AND deleted_at IS NULL
              AND start_date <= $5 AND end_date >= $4
            ORDER BY start_date
            LIMIT 1
            "#,
        )
        .bind(assignment.schedule_id)
        .bind(assignment.role)
        .bind(assignment.id)
        .bind(assignment.start_date)
        .bind(assignment.end_date)
        .fetch_optional(&mut **tx)
        .await?;

        match overlapping {
            Some(other) => {
                debug!("🔒 Sustitución {} rechazada: solapa con {}", assignment.id, other.id);
                Err(AppError::Conflict(format!(
                    "{} assignment overlaps assignment {} ({} to {})",
                    assignment.role, other.id, other.start_date, other.end_date
                )))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AssignmentStore for PgDriverAssignmentRepository {
    async fn list_overrides_for_schedule(&self, schedule_id: Uuid) -> AppResult<Vec<DriverAssignment>> {
        let rows = sqlx::query_as::<_, DriverAssignmentRow>(
            r#"
            SELECT * FROM driver_assignments
            WHERE schedule_id = $1 AND deleted_at IS NULL
            ORDER BY start_date, created_at
            "#,
        )
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DriverAssignment::from).collect())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<DriverAssignment>> {
        let row = sqlx::query_as::<_, DriverAssignmentRow>("SELECT * FROM driver_assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(DriverAssignment::from))
    }

    async fn create(&self, assignment: &DriverAssignment) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::check_overlap(&mut tx, assignment).await?;

        sqlx::query(
            r#"
            INSERT INTO driver_assignments (
                id, schedule_id, role, substitute_id, start_date, end_date, reason,
                approved_by, approved_at, created_by, created_at, updated_at, deleted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.schedule_id)
        .bind(assignment.role)
        .bind(assignment.substitute_id)
        .bind(assignment.start_date)
        .bind(assignment.end_date)
        .bind(&assignment.reason)
        .bind(assignment.approved_by)
        .bind(assignment.approved_at)
        .bind(assignment.created_by)
        .bind(assignment.created_at)
        .bind(assignment.updated_at)
        .bind(assignment.deleted_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, assignment: &DriverAssignment) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::check_overlap(&mut tx, assignment).await?;

        let result = sqlx::query(
            r#"
            UPDATE driver_assignments
            SET substitute_id = $2, start_date = $3, end_date = $4, reason = $5,
                approved_by = $6, approved_at = $7, updated_at = $8, deleted_at = $9
            WHERE id = $1
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.substitute_id)
        .bind(assignment.start_date)
        .bind(assignment.end_date)
        .bind(&assignment.reason)
        .bind(assignment.approved_by)
        .bind(assignment.approved_at)
        .bind(assignment.updated_at)
        .bind(assignment.deleted_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Assignment {} not found", assignment.id)));
        }
        tx.commit().await?;
        Ok(())
    }
}
