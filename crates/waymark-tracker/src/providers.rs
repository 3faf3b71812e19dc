//! # Provider Trait Seams
//!
//! Traits abstracting the external collaborators of the pipeline. The
//! embedding application supplies the implementations; the pipeline never
//! talks to the positioning subsystem, waypoint store or outbound transport
//! directly.
//!
//! ## Collaborator Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      External Collaborators                             │
//! │                                                                         │
//! │  CONSUMED                                                              │
//! │  ────────                                                              │
//! │  LocationProvider    request/remove polling registrations             │
//! │  GeofencingProvider  batch region registration, remove-all            │
//! │  WaypointStore       waypoint queries + field updates                 │
//! │  StatusProbe         battery/connectivity snapshot                    │
//! │                                                                         │
//! │  PRODUCED                                                              │
//! │  ────────                                                              │
//! │  OutboundPublisher   outbound messages (fire-and-forget)              │
//! │  TrackerEventEmitter state-change notifications to the application    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Semantics
//! Publishing and registration calls are hand-offs: the pipeline does not
//! await their completion and never blocks on network I/O. Retry policy
//! belongs to the publisher. The one synchronous contract is the waypoint
//! store: field updates return a result so the caller can abort a single
//! registration or report on failure.

use chrono::{DateTime, Utc};

use waymark_core::{
    DeviceStatus, GeofenceRegistration, LocationFix, ModeId, OutboundMessage, PollingRequest,
    TransitionKind, Waypoint,
};

use crate::error::TrackerResult;

// =============================================================================
// Location Provider
// =============================================================================

/// The positioning subsystem's fix-acquisition surface.
///
/// Fixes themselves arrive through the dispatcher as occurrences; this
/// trait only carries the polling registration the pipeline maintains.
pub trait LocationProvider: Send + Sync {
    /// Replaces the current polling registration with the given parameters.
    fn request_updates(&self, request: PollingRequest);

    /// Removes the current polling registration.
    fn remove_updates(&self);
}

// =============================================================================
// Geofencing Provider
// =============================================================================

/// The positioning subsystem's region-monitoring surface.
pub trait GeofencingProvider: Send + Sync {
    /// Registers the full batch of regions in one request.
    fn register(&self, registrations: Vec<GeofenceRegistration>);

    /// Removes all regions previously registered by this pipeline.
    fn remove_all(&self);
}

// =============================================================================
// Waypoint Store
// =============================================================================

/// The external waypoint store.
///
/// The pipeline only reads waypoints and requests updates to the
/// `geofence_id` and `last_triggered` fields; everything else is owned by
/// the store.
pub trait WaypointStore: Send + Sync {
    /// Returns the waypoints in the given mode that have valid geofence
    /// bounds, i.e. the set eligible for registration.
    fn waypoints_for_mode(&self, mode: ModeId) -> TrackerResult<Vec<Waypoint>>;

    /// Looks up a waypoint by its geofence registration identifier.
    ///
    /// Returns `Ok(None)` for stale identifiers with no matching waypoint.
    fn waypoint_by_geofence_id(&self, geofence_id: &str) -> TrackerResult<Option<Waypoint>>;

    /// Persists a lazily-assigned geofence identifier on a waypoint.
    fn set_geofence_id(&self, waypoint_id: &str, geofence_id: &str) -> TrackerResult<()>;

    /// Persists a waypoint's last transition time.
    fn set_last_triggered(&self, waypoint_id: &str, at: DateTime<Utc>) -> TrackerResult<()>;
}

// =============================================================================
// Outbound Publisher
// =============================================================================

/// Sink for outbound telemetry messages.
///
/// `publish` is an ownership hand-off with at-most-once attempt semantics
/// from the pipeline's perspective; queuing and retries are the publisher's
/// concern.
pub trait OutboundPublisher: Send + Sync {
    /// Hands a message to the outbound transport.
    fn publish(&self, message: OutboundMessage);
}

// =============================================================================
// Status Probe
// =============================================================================

/// Snapshot source for the extended-data fields of location reports.
pub trait StatusProbe: Send + Sync {
    /// Captures the current battery/connectivity snapshot.
    fn device_status(&self) -> DeviceStatus;
}

/// Probe that reports nothing; extended fields stay absent.
pub struct NoStatusProbe;

impl StatusProbe for NoStatusProbe {
    fn device_status(&self) -> DeviceStatus {
        DeviceStatus::default()
    }
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Trait for notifying the embedding application of pipeline state changes.
pub trait TrackerEventEmitter: Send + Sync {
    /// The last-known location was replaced by a new fix.
    fn current_location_updated(&self, fix: &LocationFix);

    /// A waypoint's region was entered or left.
    fn waypoint_transitioned(&self, waypoint: &Waypoint, kind: TransitionKind);
}

/// No-op event emitter for testing and headless embeddings.
pub struct NoOpEmitter;

impl TrackerEventEmitter for NoOpEmitter {
    fn current_location_updated(&self, _fix: &LocationFix) {}
    fn waypoint_transitioned(&self, _waypoint: &Waypoint, _kind: TransitionKind) {}
}
