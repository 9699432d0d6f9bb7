//! Servicio de administración de schedules y sustituciones
//!
//! Al crear o ampliar una sustitución el almacén rechaza cualquier solape con
//! otra sustitución viva del mismo schedule y rol, comprobando y escribiendo
//! de forma atómica. El desempate del resolvedor solo actúa ante datos
//! heredados de antes de esa restricción.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::models::driver_assignment::{DriverAssignment, NewDriverAssignment};
use crate::models::schedule::{NewSchedule, Schedule};
use crate::repositories::{AssignmentStore, ScheduleStore};
use crate::services::clock::Clock;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct ScheduleService {
    schedules: Arc<dyn ScheduleStore>,
    assignments: Arc<dyn AssignmentStore>,
    clock: Arc<dyn Clock>,
}

impl ScheduleService {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        assignments: Arc<dyn AssignmentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schedules,
            assignments,
            clock,
        }
    }

    pub async fn create_schedule(&self, new: NewSchedule) -> AppResult<Schedule> {
        let schedule = Schedule::create(new, self.clock.now())?;
        self.schedules.create(&schedule).await?;
        info!("🗓️ Schedule {} creado ({})", schedule.id, schedule.name);
        Ok(schedule)
    }

    pub async fn get_schedule(&self, id: Uuid) -> AppResult<Schedule> {
        self.schedules
            .get(id)
            .await?
            .filter(|s| !s.is_deleted())
            .ok_or_else(|| not_found_error("Schedule", &id))
    }

    async fn modify_schedule<F>(&self, id: Uuid, change: F) -> AppResult<Schedule>
    where
        F: FnOnce(&mut Schedule, DateTime<Utc>) + Send,
    {
        let mut schedule = self.get_schedule(id).await?;
        change(&mut schedule, self.clock.now());
        self.schedules.update(&schedule).await?;
        Ok(schedule)
    }

    pub async fn activate_schedule(&self, id: Uuid) -> AppResult<Schedule> {
        self.modify_schedule(id, |s, now| s.activate(now)).await
    }

    pub async fn deactivate_schedule(&self, id: Uuid) -> AppResult<Schedule> {
        self.modify_schedule(id, |s, now| s.deactivate(now)).await
    }

    pub async fn delete_schedule(&self, id: Uuid) -> AppResult<()> {
        self.modify_schedule(id, |s, now| s.soft_delete(now)).await?;
        info!("🗑️ Schedule {} eliminado", id);
        Ok(())
    }

    pub async fn create_assignment(&self, new: NewDriverAssignment) -> AppResult<DriverAssignment> {
        self.get_schedule(new.schedule_id).await?;

        let assignment = DriverAssignment::create(new, self.clock.now())?;
        self.assignments.create(&assignment).await?;

        info!(
            "🔄 Sustitución {} de {} para schedule {} ({} a {})",
            assignment.id, assignment.role, assignment.schedule_id, assignment.start_date, assignment.end_date
        );
        Ok(assignment)
    }

    pub async fn list_assignments(&self, schedule_id: Uuid) -> AppResult<Vec<DriverAssignment>> {
        self.get_schedule(schedule_id).await?;
        self.assignments.list_overrides_for_schedule(schedule_id).await
    }

    pub async fn get_assignment(&self, id: Uuid) -> AppResult<DriverAssignment> {
        self.assignments
            .get(id)
            .await?
            .filter(|a| !a.is_deleted())
            .ok_or_else(|| not_found_error("Assignment", &id))
    }

    pub async fn approve_assignment(&self, id: Uuid, approver_id: Uuid) -> AppResult<DriverAssignment> {
        let mut assignment = self.get_assignment(id).await?;
        assignment.approve(approver_id, self.clock.now());
        self.assignments.update(&assignment).await?;
        Ok(assignment)
    }

    pub async fn extend_assignment(&self, id: Uuid, new_end_date: NaiveDate) -> AppResult<DriverAssignment> {
        let mut assignment = self.get_assignment(id).await?;
        assignment.extend(new_end_date, self.clock.now())?;
        self.assignments.update(&assignment).await?;
        Ok(assignment)
    }

    pub async fn shorten_assignment(&self, id: Uuid, new_end_date: NaiveDate) -> AppResult<DriverAssignment> {
        let mut assignment = self.get_assignment(id).await?;
        assignment.shorten(new_end_date, self.clock.now())?;
        self.assignments.update(&assignment).await?;
        Ok(assignment)
    }

    pub async fn delete_assignment(&self, id: Uuid) -> AppResult<()> {
        let mut assignment = self.get_assignment(id).await?;
        assignment.soft_delete(self.clock.now());
        self.assignments.update(&assignment).await
    }
}
