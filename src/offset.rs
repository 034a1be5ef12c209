//! Tree-offset calculation.

use crate::constants::TREE_ABSORPTION_PER_YEAR;

/// Offset duration was zero, negative, or not a number. User-visible,
/// blocks the calculation.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("offset duration must be a positive number of years, got {years}")]
pub struct InvalidDurationError {
    pub years: f64,
}

/// Number of trees whose annual absorption matches `co2_kg` over `years`.
pub fn trees_needed(co2_kg: f64, years: f64) -> Result<f64, InvalidDurationError> {
    if !(years > 0.0) {
        return Err(InvalidDurationError { years });
    }
    Ok(co2_kg / (TREE_ABSORPTION_PER_YEAR * years))
}
