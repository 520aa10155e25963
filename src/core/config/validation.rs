//! Validation helper functions for configuration types.

use crate::core::errors::{JtbdError, Result};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(JtbdError::validation_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that a usize value is within a bounded range (inclusive).
pub fn validate_bounded_usize(value: usize, min: usize, max: usize, field: &str) -> Result<()> {
    if value < min || value > max {
        return Err(JtbdError::validation_field(
            format!("{} must be between {} and {}", field, min, max),
            field,
        ));
    }
    Ok(())
}

/// Validate that `low <= high` for an inclusive range.
pub fn validate_ordered_range(low: usize, high: usize, field: &str) -> Result<()> {
    if low > high {
        return Err(JtbdError::validation_field(
            format!("{} lower bound {} exceeds upper bound {}", field, low, high),
            field,
        ));
    }
    Ok(())
}
