use uuid::Uuid;
use validator::Validate;

use crate::dto::schedule_dto::{
    ApproveAssignmentRequest, ChangeEndDateRequest, CreateAssignmentRequest, CreateScheduleRequest,
};
use crate::dto::ApiResponse;
use crate::models::{DriverAssignment, Schedule};
use crate::services::ScheduleService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct ScheduleController {
    service: ScheduleService,
}

impl ScheduleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: state.schedule_service.clone(),
        }
    }

    pub async fn create(&self, request: CreateScheduleRequest) -> Result<ApiResponse<Schedule>, AppError> {
        request.validate()?;
        let schedule = self.service.create_schedule(request.into()).await?;
        Ok(ApiResponse::success_with_message(schedule, "Schedule creado exitosamente".to_string()))
    }

    pub async fn get(&self, id: Uuid) -> Result<Schedule, AppError> {
        self.service.get_schedule(id).await
    }

    pub async fn activate(&self, id: Uuid) -> Result<ApiResponse<Schedule>, AppError> {
        let schedule = self.service.activate_schedule(id).await?;
        Ok(ApiResponse::success_with_message(schedule, "Schedule activado".to_string()))
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<ApiResponse<Schedule>, AppError> {
        let schedule = self.service.deactivate_schedule(id).await?;
        Ok(ApiResponse::success_with_message(schedule, "Schedule desactivado".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.service.delete_schedule(id).await?;
        Ok(ApiResponse::message("Schedule eliminado exitosamente".to_string()))
    }

    pub async fn create_assignment(
        &self,
        schedule_id: Uuid,
        request: CreateAssignmentRequest,
    ) -> Result<ApiResponse<DriverAssignment>, AppError> {
        request.validate()?;
        let assignment = self.service.create_assignment(request.into_new(schedule_id)).await?;
        Ok(ApiResponse::success_with_message(
            assignment,
            "Sustitución creada exitosamente".to_string(),
        ))
    }

    pub async fn list_assignments(&self, schedule_id: Uuid) -> Result<Vec<DriverAssignment>, AppError> {
        self.service.list_assignments(schedule_id).await
    }

    pub async fn approve_assignment(
        &self,
        id: Uuid,
        request: ApproveAssignmentRequest,
    ) -> Result<ApiResponse<DriverAssignment>, AppError> {
        let assignment = self.service.approve_assignment(id, request.approved_by).await?;
        Ok(ApiResponse::success_with_message(assignment, "Sustitución aprobada".to_string()))
    }

    pub async fn extend_assignment(
        &self,
        id: Uuid,
        request: ChangeEndDateRequest,
    ) -> Result<ApiResponse<DriverAssignment>, AppError> {
        let assignment = self.service.extend_assignment(id, request.end_date).await?;
        Ok(ApiResponse::success_with_message(assignment, "Sustitución ampliada".to_string()))
    }

    pub async fn shorten_assignment(
        &self,
        id: Uuid,
        request: ChangeEndDateRequest,
    ) -> Result<ApiResponse<DriverAssignment>, AppError> {
        let assignment = self.service.shorten_assignment(id, request.end_date).await?;
        Ok(ApiResponse::success_with_message(assignment, "Sustitución acortada".to_string()))
    }

    pub async fn delete_assignment(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.service.delete_assignment(id).await?;
        Ok(ApiResponse::message("Sustitución eliminada".to_string()))
    }
}
