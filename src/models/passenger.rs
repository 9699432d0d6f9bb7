//! Modelo de Passenger
//!
//! Solo lo que la generación de viajes necesita: a qué ruta y parada está
//! asignado el pasajero y si sigue activo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del pasajero - mapea al ENUM passenger_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "passenger_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PassengerStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Passenger {
    pub id: Uuid,
    pub name: String,
    pub status: PassengerStatus,
    pub assigned_route_id: Option<Uuid>,
    pub assigned_stop_id: Option<Uuid>,
    pub stop_order: i32,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Passenger {
    pub fn is_active(&self) -> bool {
        self.status == PassengerStatus::Active && self.deleted_at.is_none()
    }

    /// Parada asignada dentro de `route_id`, si el pasajero debe viajar en ella
    pub fn stop_on_route(&self, route_id: Uuid) -> Option<Uuid> {
        if !self.is_active() || self.assigned_route_id != Some(route_id) {
            return None;
        }
        self.assigned_stop_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passenger(route: Option<Uuid>, stop: Option<Uuid>) -> Passenger {
        Passenger {
            id: Uuid::new_v4(),
            name: "Lucía".to_string(),
            status: PassengerStatus::Active,
            assigned_route_id: route,
            assigned_stop_id: stop,
            stop_order: 1,
            deleted_at: None,
        }
    }

    #[test]
    fn test_stop_on_route() {
        let route = Uuid::new_v4();
        let stop = Uuid::new_v4();

        assert_eq!(passenger(Some(route), Some(stop)).stop_on_route(route), Some(stop));
        assert_eq!(passenger(Some(route), None).stop_on_route(route), None);
        assert_eq!(passenger(Some(Uuid::new_v4()), Some(stop)).stop_on_route(route), None);

        let mut inactive = passenger(Some(route), Some(stop));
        inactive.status = PassengerStatus::Inactive;
        assert_eq!(inactive.stop_on_route(route), None);

        let mut deleted = passenger(Some(route), Some(stop));
        deleted.deleted_at = Some(Utc::now());
        assert_eq!(deleted.stop_on_route(route), None);
    }
}
