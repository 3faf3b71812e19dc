//! # Outbound Message Construction
//!
//! Pure constructors for the outbound telemetry messages.
//!
//! ## Message Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Outbound Messages                                 │
//! │                                                                         │
//! │  LocationReport (_type: "location")                                    │
//! │  ──────────────────────────────────                                    │
//! │  lat, lon     position in decimal degrees                              │
//! │  acc          accuracy, rounded to whole units                         │
//! │  t            trigger code: "" | "p" | "u" | "c"                       │
//! │  tst          report time, whole seconds since epoch                   │
//! │  tid          tracker identifier                                       │
//! │  cp           course-point flag, always present                        │
//! │  batt, conn   extended data (battery %, connectivity class)            │
//! │                                                                         │
//! │  TransitionReport (_type: "transition")                                │
//! │  ──────────────────────────────────────                                │
//! │  transition   "enter" | "exit"                                         │
//! │  trigger      always "c" (circular region)                             │
//! │  tid          tracker identifier                                       │
//! │  lat, lon     triggering location                                      │
//! │  acc          triggering accuracy, raw value                           │
//! │  tst          report time, whole seconds since epoch                   │
//! │  wtst         waypoint creation time, whole seconds since epoch        │
//! │  desc         description, only when the waypoint is shared            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are immutable once built; ownership passes to the outbound
//! publisher. Construction is pure: the caller supplies the report time, so
//! the same inputs always produce the same message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConnectivityClass, LocationFix, TransitionKind, TriggerReason, Waypoint};

// =============================================================================
// Device Status Snapshot
// =============================================================================

/// Battery and connectivity snapshot attached to extended location reports.
///
/// Captured by the embedding application at build time; both fields are
/// optional because a probe may be unable to answer (e.g. no battery on a
/// plugged-in device, connectivity state unknown).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStatus {
    /// Battery level in percent (0-100).
    pub battery: Option<u8>,

    /// Active network classification.
    pub connectivity: Option<ConnectivityClass>,
}

// =============================================================================
// Location Report
// =============================================================================

/// Outbound report of the device's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    /// Latitude in decimal degrees.
    pub lat: f64,

    /// Longitude in decimal degrees.
    pub lon: f64,

    /// Accuracy, rounded to whole units.
    pub acc: i64,

    /// Trigger code.
    pub t: TriggerReason,

    /// Report time in whole seconds since epoch.
    pub tst: i64,

    /// Tracker identifier.
    pub tid: String,

    /// Course-point flag. Always on the wire, unlike the extended fields.
    pub cp: bool,

    /// Battery level in percent. Extended data only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batt: Option<u8>,

    /// Connectivity class. Extended data only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conn: Option<ConnectivityClass>,
}

impl LocationReport {
    /// Builds a location report from a fix.
    ///
    /// `status` carries the extended-data snapshot; pass `None` when
    /// extended data is disabled and the `batt`/`conn` fields are omitted
    /// entirely.
    pub fn new(
        fix: &LocationFix,
        trigger: TriggerReason,
        reported_at: DateTime<Utc>,
        tracker_id: &str,
        cp: bool,
        status: Option<DeviceStatus>,
    ) -> Self {
        let status = status.unwrap_or_default();
        LocationReport {
            lat: fix.latitude,
            lon: fix.longitude,
            acc: fix.accuracy.round() as i64,
            t: trigger,
            tst: reported_at.timestamp(),
            tid: tracker_id.to_string(),
            cp,
            batt: status.battery,
            conn: status.connectivity,
        }
    }
}

// =============================================================================
// Transition Report
// =============================================================================

/// Outbound report of a circular-region transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionReport {
    /// Whether the region was entered or left.
    pub transition: TransitionKind,

    /// Trigger source; always circular for region transitions.
    pub trigger: TriggerReason,

    /// Tracker identifier.
    pub tid: String,

    /// Latitude of the triggering location in decimal degrees.
    pub lat: f64,

    /// Longitude of the triggering location in decimal degrees.
    pub lon: f64,

    /// Accuracy of the triggering location, raw value.
    pub acc: f64,

    /// Report time in whole seconds since epoch.
    pub tst: i64,

    /// Waypoint creation time in whole seconds since epoch.
    pub wtst: i64,

    /// Waypoint description; present only when the waypoint is shared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl TransitionReport {
    /// Builds a transition report for a waypoint.
    ///
    /// The triggering location comes from the transition event itself, not
    /// from the last-known slot. The description is exposed only when the
    /// waypoint's shared flag is set.
    pub fn new(
        waypoint: &Waypoint,
        triggering_location: &LocationFix,
        kind: TransitionKind,
        reported_at: DateTime<Utc>,
        tracker_id: &str,
    ) -> Self {
        TransitionReport {
            transition: kind,
            trigger: TriggerReason::Circular,
            tid: tracker_id.to_string(),
            lat: triggering_location.latitude,
            lon: triggering_location.longitude,
            acc: triggering_location.accuracy,
            tst: reported_at.timestamp(),
            wtst: waypoint.created_at.timestamp(),
            desc: waypoint.shared.then(|| waypoint.description.clone()),
        }
    }
}

// =============================================================================
// Outbound Message (Tagged Union)
// =============================================================================

/// All outbound telemetry messages.
///
/// Uses serde's internally tagged representation for clean JSON:
/// `{ "_type": "location", "lat": ..., ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "lowercase")]
pub enum OutboundMessage {
    /// A position report.
    Location(LocationReport),

    /// A region transition report.
    Transition(TransitionReport),
}

impl OutboundMessage {
    /// Serializes the message to its JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
