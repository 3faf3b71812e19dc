//! # waymark-core: Pure Domain Logic for Waymark
//!
//! This crate is the **heart** of Waymark. It contains the parts of the
//! location/geofence pipeline that are pure functions with zero I/O
//! dependencies: domain types, outbound message construction, and the
//! location request policy.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Waymark Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Embedding Application (external)                  │   │
//! │  │   Positioning subsystem • Waypoint store • Outbound transport  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ trait seams                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              waymark-tracker (Event Pipeline)                   │   │
//! │  │    EventDispatcher, handlers, geofence sync, config             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ waymark-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  message  │  │  policy   │  │ validation│  │   │
//! │  │   │ Waypoint  │  │ Location  │  │ Polling   │  │  coords   │  │   │
//! │  │   │ Fix/Event │  │ Transition│  │ Request   │  │  tid      │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO PROVIDERS • NO NETWORK • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Waypoint, LocationFix, transition events, ...)
//! - [`message`] - Outbound message construction (location/transition reports)
//! - [`policy`] - Location request policy (interval, displacement, priority)
//! - [`error`] - Validation error types
//! - [`validation`] - Coordinate and identifier validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Provider, store and network access is FORBIDDEN here
//! 3. **Explicit Time**: Constructors take the report time as an argument,
//!    they never read the clock
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use waymark_core::message::{LocationReport, OutboundMessage};
//! use waymark_core::types::{LocationFix, TriggerReason};
//!
//! let fix = LocationFix::new(48.137, 11.575, 12.0, Utc::now());
//! let report = LocationReport::new(&fix, TriggerReason::Ping, Utc::now(), "aa", false, None);
//!
//! let json = OutboundMessage::Location(report).to_json().unwrap();
//! assert!(json.contains("\"_type\":\"location\""));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod message;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use waymark_core::Waypoint` instead of
// `use waymark_core::types::Waypoint`

pub use error::{ValidationError, ValidationResult};
pub use message::{DeviceStatus, LocationReport, OutboundMessage, TransitionReport};
pub use policy::{LocatorProfile, PollingRequest, RequestPriority};
pub use types::*;
