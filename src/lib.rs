//! Backend de planificación de viajes de transporte escolar
//!
//! Genera cada día los viajes concretos a partir de los schedules
//! recurrentes, resuelve el conductor (titular o sustituto) de cada fecha y
//! lleva el ciclo de vida del viaje y el abordaje de sus pasajeros.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;
