use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{CrewRole, NewDriverAssignment, NewSchedule, TimeSlot};
use crate::utils::validation::validate_not_blank;

// Request para crear un schedule
#[derive(Debug, Deserialize, Validate)]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub start_time: NaiveTime,
    pub time_slot: TimeSlot,
    pub days_of_week: Vec<u32>,
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
    pub default_driver_id: Uuid,
    pub default_attendant_id: Option<Uuid>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl From<CreateScheduleRequest> for NewSchedule {
    fn from(request: CreateScheduleRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            description: request.description,
            start_time: request.start_time,
            time_slot: request.time_slot,
            days_of_week: request.days_of_week.into_iter().collect(),
            route_id: request.route_id,
            vehicle_id: request.vehicle_id,
            default_driver_id: request.default_driver_id,
            default_attendant_id: request.default_attendant_id,
            valid_from: request.valid_from,
            valid_to: request.valid_to,
        }
    }
}

// Request para crear una sustitución; sin `role` se entiende conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssignmentRequest {
    #[serde(default)]
    pub role: CrewRole,
    pub substitute_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, max = 500), custom = "validate_not_blank")]
    pub reason: String,
    pub created_by: Uuid,
}

impl CreateAssignmentRequest {
    pub fn into_new(self, schedule_id: Uuid) -> NewDriverAssignment {
        NewDriverAssignment {
            schedule_id,
            role: self.role,
            substitute_id: self.substitute_id,
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApproveAssignmentRequest {
    pub approved_by: Uuid,
}

// Request para ampliar o acortar una sustitución
#[derive(Debug, Deserialize)]
pub struct ChangeEndDateRequest {
    pub end_date: NaiveDate,
}
