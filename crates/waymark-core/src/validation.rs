//! # Validation Module
//!
//! Input validation utilities for Waymark.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Positioning subsystem                                        │
//! │  ├── Delivers fixes and transition events as-is                        │
//! │  └── May hand over degenerate coordinates on provider glitches         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Coordinate range checks (lat/lon/radius)                          │
//! │  └── Tracker identifier checks (config validation)                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Waypoint store (external)                                    │
//! │  └── Owns persistence-level constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use waymark_core::validation::{validate_latitude, validate_radius};
//!
//! // Validate coordinates before building a geofence registration
//! validate_latitude(48.137).unwrap();
//! validate_radius(100.0).unwrap();
//! ```

use crate::error::{ValidationError, ValidationResult};

/// Maximum length of a tracker identifier.
///
/// Tracker ids are short tags shown on the receiving side next to each
/// report; two characters is the conventional size.
pub const MAX_TRACKER_ID_LEN: usize = 2;

// =============================================================================
// Coordinate Validators
// =============================================================================

/// Validates a latitude in decimal degrees.
///
/// ## Rules
/// - Must be finite (NaN/infinity rejected)
/// - Must be within [-90, 90]
pub fn validate_latitude(lat: f64) -> ValidationResult<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::CoordinateOutOfRange {
            field: "latitude".to_string(),
            value: lat,
            min: -90.0,
            max: 90.0,
        });
    }
    Ok(())
}

/// Validates a longitude in decimal degrees.
///
/// ## Rules
/// - Must be finite (NaN/infinity rejected)
/// - Must be within [-180, 180]
pub fn validate_longitude(lon: f64) -> ValidationResult<()> {
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(ValidationError::CoordinateOutOfRange {
            field: "longitude".to_string(),
            value: lon,
            min: -180.0,
            max: 180.0,
        });
    }
    Ok(())
}

/// Validates a geofence radius.
///
/// The radius shares its linear unit with fix accuracy; a zero or negative
/// radius describes a degenerate region that can never be entered.
pub fn validate_radius(radius: f64) -> ValidationResult<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "radius".to_string(),
            value: radius,
        });
    }
    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a tracker identifier.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most [`MAX_TRACKER_ID_LEN`] characters
pub fn validate_tracker_id(tid: &str) -> ValidationResult<()> {
    let tid = tid.trim();

    if tid.is_empty() {
        return Err(ValidationError::Required {
            field: "tracker_id".to_string(),
        });
    }

    if tid.chars().count() > MAX_TRACKER_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "tracker_id".to_string(),
            max: MAX_TRACKER_ID_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
