//! # Error Types
//!
//! Domain-specific error types for waymark-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  waymark-core errors (this file)                                       │
//! │  └── ValidationError  - Geographic / identifier validation failures    │
//! │                                                                         │
//! │  waymark-tracker errors (separate crate)                               │
//! │  └── TrackerError     - Pipeline, store and config failures            │
//! │                                                                         │
//! │  Flow: ValidationError → TrackerError → embedding application          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, offending value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a value does not meet geographic or identifier
/// requirements. Used for early validation before pipeline logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// A coordinate is outside its valid range.
    ///
    /// ## When This Occurs
    /// - Latitude outside [-90, 90]
    /// - Longitude outside [-180, 180]
    /// - NaN or infinite values from a corrupted fix
    #[error("{field} {value} is outside the valid range [{min}, {max}]")]
    CoordinateOutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: String, value: f64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::CoordinateOutOfRange {
            field: "latitude".to_string(),
            value: 91.5,
            min: -90.0,
            max: 90.0,
        };
        assert_eq!(
            err.to_string(),
            "latitude 91.5 is outside the valid range [-90, 90]"
        );

        let err = ValidationError::MustBePositive {
            field: "radius".to_string(),
            value: 0.0,
        };
        assert_eq!(err.to_string(), "radius must be positive, got 0");
    }
}
