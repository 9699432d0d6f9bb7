use uuid::Uuid;
use validator::Validate;

use crate::dto::fleet_dto::{SaveAttendantRequest, SaveDriverRequest, SaveVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::{Attendant, Driver, Vehicle};
use crate::services::FleetService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct FleetController {
    service: FleetService,
}

impl FleetController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: state.fleet_service.clone(),
        }
    }

    pub async fn save_vehicle(&self, id: Uuid, request: SaveVehicleRequest) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;
        let vehicle = self.service.save_vehicle(request.into_vehicle(id)).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehículo guardado".to_string()))
    }

    pub async fn get_vehicle(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.service.get_vehicle(id).await
    }

    pub async fn save_driver(&self, id: Uuid, request: SaveDriverRequest) -> Result<ApiResponse<Driver>, AppError> {
        request.validate()?;
        let driver = self.service.save_driver(request.into_driver(id)).await?;
        Ok(ApiResponse::success_with_message(driver, "Conductor guardado".to_string()))
    }

    pub async fn get_driver(&self, id: Uuid) -> Result<Driver, AppError> {
        self.service.get_driver(id).await
    }

    pub async fn save_attendant(
        &self,
        id: Uuid,
        request: SaveAttendantRequest,
    ) -> Result<ApiResponse<Attendant>, AppError> {
        request.validate()?;
        let attendant = self.service.save_attendant(request.into_attendant(id)).await?;
        Ok(ApiResponse::success_with_message(attendant, "Acompañante guardado".to_string()))
    }

    pub async fn get_attendant(&self, id: Uuid) -> Result<Attendant, AppError> {
        self.service.get_attendant(id).await
    }
}
