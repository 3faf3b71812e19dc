//! # Domain Types
//!
//! Core domain types used throughout Waymark.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Waypoint     │   │  LocationFix    │   │ TransitionEvent │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  latitude       │   │  error_code     │       │
//! │  │  geofence_id    │   │  longitude      │   │  kind           │       │
//! │  │  lat/lon/radius │   │  accuracy       │   │  geofence ids   │       │
//! │  │  last_triggered │   │  reported_at    │   │  trigger fix    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ TransitionKind  │   │ TriggerReason   │   │ Connectivity    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Enter          │   │  Default ("")   │   │  Offline ("o")  │       │
//! │  │  Exit           │   │  Ping    ("p")  │   │  Wifi    ("w")  │       │
//! │  └─────────────────┘   │  User    ("u")  │   │  Mobile  ("m")  │       │
//! │                        │  Circular("c")  │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A waypoint has:
//! - `id`: UUID v4 - immutable, used by the waypoint store
//! - `geofence_id`: lazily assigned, stable once set - used by the
//!   positioning subsystem to correlate transition events back to waypoints

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{validate_latitude, validate_longitude, validate_radius};

// =============================================================================
// Mode Identifier
// =============================================================================

/// Identifier of the mode a waypoint belongs to.
///
/// Only waypoints tagged with the currently active mode are registered as
/// geofences; switching modes triggers a full re-registration.
pub type ModeId = i32;

// =============================================================================
// Trigger Reason
// =============================================================================

/// The cause code attached to an outbound location message.
///
/// Serialized with the single-character wire tokens used by the outbound
/// protocol; `Default` serializes as the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerReason {
    /// Passive report caused by a periodic fix.
    #[default]
    #[serde(rename = "")]
    Default,

    /// Scheduled ping requested by the embedding application.
    #[serde(rename = "p")]
    Ping,

    /// Explicit user-initiated report.
    #[serde(rename = "u")]
    User,

    /// Report correlated with a circular-region transition.
    #[serde(rename = "c")]
    Circular,
}

impl TriggerReason {
    /// Returns the wire token for this trigger.
    pub const fn code(&self) -> &'static str {
        match self {
            TriggerReason::Default => "",
            TriggerReason::Ping => "p",
            TriggerReason::User => "u",
            TriggerReason::Circular => "c",
        }
    }

    /// Returns true if this trigger is subject to the foreground throttle.
    ///
    /// Only the passive default trigger is throttled; on-demand and
    /// transition-correlated reports always go through (modulo the
    /// accuracy filter).
    pub const fn is_throttled(&self) -> bool {
        matches!(self, TriggerReason::Default)
    }
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerReason::Default => write!(f, "default"),
            TriggerReason::Ping => write!(f, "ping"),
            TriggerReason::User => write!(f, "user"),
            TriggerReason::Circular => write!(f, "circular"),
        }
    }
}

// =============================================================================
// Transition Kind
// =============================================================================

/// Entry into or exit from a registered region. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// The device crossed into the region.
    Enter,

    /// The device crossed out of the region.
    Exit,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::Enter => write!(f, "enter"),
            TransitionKind::Exit => write!(f, "exit"),
        }
    }
}

// =============================================================================
// Connectivity Class
// =============================================================================

/// Coarse connectivity classification attached to extended location reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectivityClass {
    /// No active network connection.
    #[serde(rename = "o")]
    Offline,

    /// Connected via WiFi.
    #[serde(rename = "w")]
    Wifi,

    /// Connected via a mobile/cellular network.
    #[serde(rename = "m")]
    Mobile,
}

// =============================================================================
// Location Fix
// =============================================================================

/// A single reported position with accuracy and timestamp.
///
/// Fixes are ephemeral: the pipeline keeps only the most recent one in a
/// single last-write-wins slot and never queues or batches them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,

    /// Estimated accuracy in the positioning subsystem's native linear unit
    /// (same unit as waypoint radii).
    pub accuracy: f64,

    /// Wall-clock time the fix was produced by the positioning subsystem.
    pub reported_at: DateTime<Utc>,
}

impl LocationFix {
    /// Creates a new fix.
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, reported_at: DateTime<Utc>) -> Self {
        LocationFix {
            latitude,
            longitude,
            accuracy,
            reported_at,
        }
    }
}

// =============================================================================
// Waypoint
// =============================================================================

/// A stored named circular geographic region of interest.
///
/// Waypoints are owned by the external waypoint store; the pipeline only
/// reads them and requests updates to `geofence_id` and `last_triggered`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Unique identifier (UUID v4), assigned by the waypoint store.
    pub id: String,

    /// Human-readable description. Exposed in outbound transition messages
    /// only when `shared` is set.
    pub description: String,

    /// Latitude of the region center in decimal degrees.
    pub latitude: f64,

    /// Longitude of the region center in decimal degrees.
    pub longitude: f64,

    /// Region radius (same linear unit as fix accuracy).
    pub radius: f64,

    /// Geofence registration identifier.
    ///
    /// Assigned lazily on first resync and stable once set. Every waypoint
    /// in the current mode with valid bounds ends up with one before being
    /// registered with the positioning subsystem.
    pub geofence_id: Option<String>,

    /// When a transition last fired for this waypoint.
    pub last_triggered: Option<DateTime<Utc>>,

    /// Whether the description is exposed in outbound transition messages.
    pub shared: bool,

    /// Mode this waypoint belongs to.
    pub mode: ModeId,

    /// When the waypoint was created.
    pub created_at: DateTime<Utc>,
}

impl Waypoint {
    /// Returns true if this waypoint has non-degenerate geographic bounds
    /// and can be registered as a geofence.
    pub fn has_valid_geofence(&self) -> bool {
        validate_latitude(self.latitude).is_ok()
            && validate_longitude(self.longitude).is_ok()
            && validate_radius(self.radius).is_ok()
    }
}

// =============================================================================
// Geofence Transition Event
// =============================================================================

/// A geofence transition notification from the positioning subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceTransitionEvent {
    /// Error code reported by the positioning subsystem.
    ///
    /// Terminal if set: the event is dropped without processing.
    pub error_code: Option<i32>,

    /// Whether the device entered or left the region.
    pub kind: TransitionKind,

    /// Registration identifiers that triggered, in delivery order.
    pub triggering_geofence_ids: Vec<String>,

    /// The location that triggered the transition.
    ///
    /// May be lower quality than normal fixes; the accuracy filter is
    /// applied against this fix, not the last-known location.
    pub triggering_location: LocationFix,
}

impl GeofenceTransitionEvent {
    /// Returns true if the positioning subsystem flagged this event as
    /// erroneous.
    pub fn has_error(&self) -> bool {
        self.error_code.is_some()
    }
}

// =============================================================================
// Geofence Registration
// =============================================================================

/// Notification responsiveness window for registered regions.
///
/// The positioning subsystem may delay transition delivery by up to this
/// long to save power.
pub const GEOFENCE_RESPONSIVENESS: Duration = Duration::from_secs(2 * 60);

/// A circular-region registration handed to the geofencing provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceRegistration {
    /// Stable registration identifier (the waypoint's `geofence_id`).
    pub geofence_id: String,

    /// Latitude of the region center in decimal degrees.
    pub latitude: f64,

    /// Longitude of the region center in decimal degrees.
    pub longitude: f64,

    /// Region radius (same linear unit as fix accuracy).
    pub radius: f64,

    /// Deliver notifications when the device enters the region.
    pub notify_on_enter: bool,

    /// Deliver notifications when the device exits the region.
    pub notify_on_exit: bool,

    /// Notification responsiveness window.
    pub responsiveness: Duration,

    /// Registration lifetime. `None` means the registration never expires.
    pub expiration: Option<Duration>,
}

impl GeofenceRegistration {
    /// Builds the registration for a waypoint.
    ///
    /// Registrations monitor both transitions, use the fixed responsiveness
    /// window and never expire. The caller supplies the geofence id because
    /// lazily-assigned ids are persisted through the store before the
    /// registration is built.
    pub fn for_waypoint(waypoint: &Waypoint, geofence_id: &str) -> Self {
        GeofenceRegistration {
            geofence_id: geofence_id.to_string(),
            latitude: waypoint.latitude,
            longitude: waypoint.longitude,
            radius: waypoint.radius,
            notify_on_enter: true,
            notify_on_exit: true,
            responsiveness: GEOFENCE_RESPONSIVENESS,
            expiration: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn waypoint(lat: f64, lon: f64, radius: f64) -> Waypoint {
        Waypoint {
            id: "wp-1".to_string(),
            description: "Home".to_string(),
            latitude: lat,
            longitude: lon,
            radius,
            geofence_id: None,
            last_triggered: None,
            shared: true,
            mode: 0,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_trigger_codes() {
        assert_eq!(TriggerReason::Default.code(), "");
        assert_eq!(TriggerReason::Ping.code(), "p");
        assert_eq!(TriggerReason::User.code(), "u");
        assert_eq!(TriggerReason::Circular.code(), "c");
    }

    #[test]
    fn test_only_default_trigger_is_throttled() {
        assert!(TriggerReason::Default.is_throttled());
        assert!(!TriggerReason::Ping.is_throttled());
        assert!(!TriggerReason::User.is_throttled());
        assert!(!TriggerReason::Circular.is_throttled());
    }

    #[test]
    fn test_valid_geofence_bounds() {
        assert!(waypoint(48.137, 11.575, 100.0).has_valid_geofence());
        assert!(!waypoint(91.0, 11.575, 100.0).has_valid_geofence());
        assert!(!waypoint(48.137, -181.0, 100.0).has_valid_geofence());
        assert!(!waypoint(48.137, 11.575, 0.0).has_valid_geofence());
        assert!(!waypoint(f64::NAN, 11.575, 100.0).has_valid_geofence());
    }

    #[test]
    fn test_registration_for_waypoint() {
        let w = waypoint(48.137, 11.575, 100.0);
        let reg = GeofenceRegistration::for_waypoint(&w, "fence-1");

        assert_eq!(reg.geofence_id, "fence-1");
        assert_eq!(reg.latitude, 48.137);
        assert_eq!(reg.longitude, 11.575);
        assert_eq!(reg.radius, 100.0);
        assert!(reg.notify_on_enter);
        assert!(reg.notify_on_exit);
        assert_eq!(reg.responsiveness, Duration::from_secs(120));
        assert!(reg.expiration.is_none());
    }

    #[test]
    fn test_transition_event_error_flag() {
        let fix = LocationFix::new(48.0, 11.0, 10.0, Utc::now());
        let mut event = GeofenceTransitionEvent {
            error_code: None,
            kind: TransitionKind::Enter,
            triggering_geofence_ids: vec!["fence-1".to_string()],
            triggering_location: fix,
        };
        assert!(!event.has_error());

        event.error_code = Some(1000);
        assert!(event.has_error());
    }
}
