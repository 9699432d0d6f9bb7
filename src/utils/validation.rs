//! Validadores personalizados para los DTOs

use validator::ValidationError;

/// Rechaza textos vacíos o formados solo por espacios
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}
