//! Shared in-memory provider implementations for tests.
//!
//! These stand in for the positioning subsystem, waypoint store and
//! outbound transport, recording every call so tests can assert on the
//! exact sequence of registrations and published messages.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use waymark_core::{
    DeviceStatus, GeofenceRegistration, LocationFix, ModeId, OutboundMessage, PollingRequest,
    TransitionKind, Waypoint,
};

use crate::error::{TrackerError, TrackerResult};
use crate::providers::{
    GeofencingProvider, LocationProvider, OutboundPublisher, StatusProbe, TrackerEventEmitter,
    WaypointStore,
};

/// Base timestamp all test fixes are anchored to.
pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Builds a fix reported `offset_secs` after the base time.
pub(crate) fn fix_at(lat: f64, lon: f64, accuracy: f64, offset_secs: i64) -> LocationFix {
    LocationFix::new(
        lat,
        lon,
        accuracy,
        base_time() + chrono::Duration::seconds(offset_secs),
    )
}

/// Builds a waypoint with valid geofence bounds.
pub(crate) fn waypoint(id: &str, mode: ModeId, shared: bool, geofence_id: Option<&str>) -> Waypoint {
    Waypoint {
        id: id.to_string(),
        description: format!("waypoint {}", id),
        latitude: 48.137,
        longitude: 11.575,
        radius: 100.0,
        geofence_id: geofence_id.map(str::to_string),
        last_triggered: None,
        shared,
        mode,
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap(),
    }
}

// =============================================================================
// Mock Publisher
// =============================================================================

/// Publisher that records every handed-off message.
#[derive(Default)]
pub(crate) struct MockPublisher {
    messages: Mutex<Vec<OutboundMessage>>,
}

impl MockPublisher {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl OutboundPublisher for MockPublisher {
    fn publish(&self, message: OutboundMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

// =============================================================================
// Mock Waypoint Store
// =============================================================================

/// In-memory waypoint store.
pub(crate) struct MockStore {
    waypoints: Mutex<Vec<Waypoint>>,
    /// When set, every field update fails with a store error.
    pub(crate) fail_updates: AtomicBool,
}

impl MockStore {
    pub(crate) fn new(waypoints: Vec<Waypoint>) -> Arc<Self> {
        Arc::new(MockStore {
            waypoints: Mutex::new(waypoints),
            fail_updates: AtomicBool::new(false),
        })
    }

    pub(crate) fn waypoints(&self) -> Vec<Waypoint> {
        self.waypoints.lock().unwrap().clone()
    }

    fn check_updates_allowed(&self, waypoint_id: &str) -> TrackerResult<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(TrackerError::StoreUpdateFailed {
                waypoint_id: waypoint_id.to_string(),
                reason: "simulated store failure".to_string(),
            });
        }
        Ok(())
    }
}

impl WaypointStore for MockStore {
    fn waypoints_for_mode(&self, mode: ModeId) -> TrackerResult<Vec<Waypoint>> {
        Ok(self
            .waypoints
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.mode == mode && w.has_valid_geofence())
            .cloned()
            .collect())
    }

    fn waypoint_by_geofence_id(&self, geofence_id: &str) -> TrackerResult<Option<Waypoint>> {
        Ok(self
            .waypoints
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.geofence_id.as_deref() == Some(geofence_id))
            .cloned())
    }

    fn set_geofence_id(&self, waypoint_id: &str, geofence_id: &str) -> TrackerResult<()> {
        self.check_updates_allowed(waypoint_id)?;
        let mut waypoints = self.waypoints.lock().unwrap();
        if let Some(w) = waypoints.iter_mut().find(|w| w.id == waypoint_id) {
            w.geofence_id = Some(geofence_id.to_string());
        }
        Ok(())
    }

    fn set_last_triggered(&self, waypoint_id: &str, at: DateTime<Utc>) -> TrackerResult<()> {
        self.check_updates_allowed(waypoint_id)?;
        let mut waypoints = self.waypoints.lock().unwrap();
        if let Some(w) = waypoints.iter_mut().find(|w| w.id == waypoint_id) {
            w.last_triggered = Some(at);
        }
        Ok(())
    }
}

// =============================================================================
// Mock Geofencing Provider
// =============================================================================

/// Geofencing provider that records registration batches and removals.
#[derive(Default)]
pub(crate) struct MockGeofencing {
    batches: Mutex<Vec<Vec<GeofenceRegistration>>>,
    removals: AtomicUsize,
}

impl MockGeofencing {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn batches(&self) -> Vec<Vec<GeofenceRegistration>> {
        self.batches.lock().unwrap().clone()
    }

    pub(crate) fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

impl GeofencingProvider for MockGeofencing {
    fn register(&self, registrations: Vec<GeofenceRegistration>) {
        self.batches.lock().unwrap().push(registrations);
    }

    fn remove_all(&self) {
        self.removals.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Mock Location Provider
// =============================================================================

/// Location provider that records polling requests and removals.
#[derive(Default)]
pub(crate) struct MockLocator {
    requests: Mutex<Vec<PollingRequest>>,
    removals: AtomicUsize,
}

impl MockLocator {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn requests(&self) -> Vec<PollingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

impl LocationProvider for MockLocator {
    fn request_updates(&self, request: PollingRequest) {
        self.requests.lock().unwrap().push(request);
    }

    fn remove_updates(&self) {
        self.removals.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Capturing Emitter / Fixed Probe
// =============================================================================

/// Emitter that counts notifications.
#[derive(Default)]
pub(crate) struct CapturingEmitter {
    locations: Mutex<Vec<LocationFix>>,
    transitions: Mutex<Vec<(String, TransitionKind)>>,
}

impl CapturingEmitter {
    pub(crate) fn location_updates(&self) -> usize {
        self.locations.lock().unwrap().len()
    }

    pub(crate) fn transitions(&self) -> Vec<(String, TransitionKind)> {
        self.transitions.lock().unwrap().clone()
    }
}

impl TrackerEventEmitter for CapturingEmitter {
    fn current_location_updated(&self, fix: &LocationFix) {
        self.locations.lock().unwrap().push(*fix);
    }

    fn waypoint_transitioned(&self, waypoint: &Waypoint, kind: TransitionKind) {
        self.transitions
            .lock()
            .unwrap()
            .push((waypoint.id.clone(), kind));
    }
}

/// Probe returning a fixed status snapshot.
pub(crate) struct FixedProbe(pub(crate) DeviceStatus);

impl StatusProbe for FixedProbe {
    fn device_status(&self) -> DeviceStatus {
        self.0
    }
}
