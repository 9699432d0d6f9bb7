//! Modelos del sistema
//!
//! Entidades de dominio: plantillas de recorrido (Schedule), sustituciones de
//! tripulación (DriverAssignment), viajes concretos (Trip), el registro de
//! abordaje de cada pasajero (TripPassenger) y la flota que los sirve.

pub mod crew;
pub mod driver_assignment;
pub mod fleet;
pub mod location;
pub mod passenger;
pub mod schedule;
pub mod trip;
pub mod trip_passenger;

pub use crew::{CrewMember, CrewRole};
pub use driver_assignment::{DriverAssignment, NewDriverAssignment};
pub use fleet::{Attendant, Driver, StaffStatus, Unavailable, Vehicle, VehicleStatus};
pub use location::Location;
pub use passenger::{Passenger, PassengerStatus};
pub use schedule::{DaysOfWeek, NewSchedule, Schedule, ScheduleStatus, TimeSlot};
pub use trip::{PassengerSummary, Trip, TripAction, TripStatus};
pub use trip_passenger::TripPassenger;
