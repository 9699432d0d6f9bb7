//! Utilidades del sistema
//!
//! Manejo de errores de dominio y de aplicación, y validadores de entrada.

pub mod errors;
pub mod validation;
