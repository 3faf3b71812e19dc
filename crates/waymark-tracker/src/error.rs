//! # Tracker Error Types
//!
//! Error types for the event pipeline.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Tracker Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Waypoint Store │  │     Internal            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  StoreQuery     │  │  ShuttingDown           │ │
//! │  │  ConfigLoad     │  │  StoreUpdate    │  │                         │ │
//! │  │  ConfigSave     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Most pipeline failures are local and non-propagating: handlers log them
//! and continue, preserving liveness for future events. Store update
//! failures are the exception - they surface to the step performing the
//! sync or transition so it can abort that single registration or report.

use thiserror::Error;

use waymark_core::ValidationError;

/// Result type alias for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Tracker error type covering all possible pipeline failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum TrackerError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid tracker configuration.
    #[error("Invalid tracker configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// A configured value failed domain validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Waypoint Store Errors
    // =========================================================================
    /// A waypoint store query failed.
    #[error("Waypoint store query failed: {0}")]
    StoreQueryFailed(String),

    /// Persisting a waypoint field update failed.
    ///
    /// Surfaced synchronously to the sync/transition step so it can skip
    /// the affected registration or report rather than corrupt shared state.
    #[error("Failed to update waypoint {waypoint_id}: {reason}")]
    StoreUpdateFailed { waypoint_id: String, reason: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// The dispatcher is shutting down; its occurrence channel is closed.
    #[error("Event dispatcher is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for TrackerError {
    fn from(err: toml::de::Error) -> Self {
        TrackerError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for TrackerError {
    fn from(err: toml::ser::Error) -> Self {
        TrackerError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl TrackerError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidConfig(_)
                | TrackerError::ConfigLoadFailed(_)
                | TrackerError::ConfigSaveFailed(_)
                | TrackerError::Validation(_)
        )
    }

    /// Returns true if this error came from the waypoint store.
    ///
    /// Store errors abort only the single registration or report being
    /// processed; the surrounding batch continues.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            TrackerError::StoreQueryFailed(_) | TrackerError::StoreUpdateFailed { .. }
        )
    }
}
