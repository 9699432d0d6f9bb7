pub mod fleet_controller;
pub mod schedule_controller;
pub mod trip_controller;
