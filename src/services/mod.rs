//! Services module
//!
//! Lógica de negocio de la aplicación. `calendar`, `assignment_resolver` y
//! `trip_generator` son funciones puras sobre los modelos; los `*_service`
//! las combinan con los almacenes y el reloj.

pub mod assignment_resolver;
pub mod calendar;
pub mod clock;
pub mod fleet_service;
pub mod schedule_service;
pub mod trip_generation_service;
pub mod trip_generator;
pub mod trip_service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use fleet_service::FleetService;
pub use schedule_service::ScheduleService;
pub use trip_generation_service::TripGenerationService;
pub use trip_service::TripService;
