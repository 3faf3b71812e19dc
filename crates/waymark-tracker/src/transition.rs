//! # Geofence Transition Handler
//!
//! Processes transition batches delivered by the positioning subsystem.
//!
//! ## Transition Processing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Transition Processing Flow                             │
//! │                                                                         │
//! │  on_transition(event)                                                  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  event has error? ──yes──► log, drop whole event                       │
//! │      │ no                                                               │
//! │      ▼                                                                  │
//! │  for each triggering geofence id (delivery order preserved):           │
//! │      │                                                                  │
//! │      ├─ lookup waypoint by geofence id                                 │
//! │      │      └─ none (stale registration) ──► skip entry silently       │
//! │      │                                                                  │
//! │      ├─ persist last_triggered ── fails ──► skip reports, continue     │
//! │      ├─ notify "waypoint transitioned"                                 │
//! │      ├─ publish LocationReport  (trigger "c", last-known location)     │
//! │      └─ publish TransitionReport (desc only when waypoint is shared)   │
//! │                                                                         │
//! │  Both reports are subject to the accuracy filter, evaluated against    │
//! │  the event's own triggering location (often lower quality than         │
//! │  normal fixes). The correlated location report carries the last-known  │
//! │  position and is silently dropped before the first fix; the            │
//! │  transition report carries the triggering location itself.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use waymark_core::{GeofenceTransitionEvent, OutboundMessage, TransitionReport, Waypoint};

use crate::config::TrackerConfig;
use crate::location::{is_low_accuracy, LocationUpdateHandler};
use crate::providers::{OutboundPublisher, TrackerEventEmitter, WaypointStore};

// =============================================================================
// Geofence Transition Handler
// =============================================================================

/// Handles transition batches and emits the correlated reports.
pub struct GeofenceTransitionHandler {
    /// Tracker configuration.
    config: Arc<TrackerConfig>,

    /// Waypoint store for geofence-id lookups and trigger timestamps.
    store: Arc<dyn WaypointStore>,

    /// Location handler, used for the correlated circular-trigger
    /// location report.
    location: Arc<LocationUpdateHandler>,

    /// Outbound message sink.
    publisher: Arc<dyn OutboundPublisher>,

    /// State-change notifications to the embedding application.
    emitter: Arc<dyn TrackerEventEmitter>,
}

impl GeofenceTransitionHandler {
    /// Creates a new handler.
    pub fn new(
        config: Arc<TrackerConfig>,
        store: Arc<dyn WaypointStore>,
        location: Arc<LocationUpdateHandler>,
        publisher: Arc<dyn OutboundPublisher>,
        emitter: Arc<dyn TrackerEventEmitter>,
    ) -> Self {
        GeofenceTransitionHandler {
            config,
            store,
            location,
            publisher,
            emitter,
        }
    }

    /// Processes a transition event.
    ///
    /// Erroneous events are dropped whole; within a healthy event every
    /// triggering entry is processed in delivery order, and a skipped entry
    /// (stale registration, store failure) never aborts the batch.
    pub async fn on_transition(&self, event: GeofenceTransitionEvent) {
        if event.has_error() {
            error!(code = ?event.error_code, "Transition event has error, dropping");
            return;
        }

        for geofence_id in &event.triggering_geofence_ids {
            match self.store.waypoint_by_geofence_id(geofence_id) {
                Ok(Some(waypoint)) => self.process_entry(waypoint, &event).await,
                Ok(None) => {
                    // Stale registration: the waypoint was removed or is
                    // mid-reassignment during a resync.
                    debug!(geofence_id = %geofence_id, "No waypoint for geofence id, skipping");
                }
                Err(e) => {
                    warn!(geofence_id = %geofence_id, error = %e, "Waypoint lookup failed, skipping");
                }
            }
        }
    }

    /// Processes one matched waypoint of the batch.
    async fn process_entry(&self, waypoint: Waypoint, event: &GeofenceTransitionEvent) {
        debug!(
            waypoint = %waypoint.id,
            kind = %event.kind,
            "Waypoint triggered"
        );

        let now = Utc::now();
        if let Err(e) = self.store.set_last_triggered(&waypoint.id, now) {
            // Persisting the trigger time failed; skip the reports for this
            // waypoint rather than emit state the store does not reflect.
            warn!(waypoint = %waypoint.id, error = %e, "Failed to persist trigger time, skipping reports");
            return;
        }

        self.emitter.waypoint_transitioned(&waypoint, event.kind);

        // Correlated location report for the last-known position, filtered
        // against the triggering location.
        self.location
            .publish_correlated(&event.triggering_location)
            .await;

        if is_low_accuracy(&self.config, &event.triggering_location) {
            debug!(
                waypoint = %waypoint.id,
                acc = event.triggering_location.accuracy,
                "Suppressing low-accuracy transition report"
            );
            return;
        }

        let report = TransitionReport::new(
            &waypoint,
            &event.triggering_location,
            event.kind,
            now,
            self.config.tracker_id(),
        );

        debug!(waypoint = %waypoint.id, "Publishing transition report");
        self.publisher.publish(OutboundMessage::Transition(report));
    }
}

// =============================================================================
// Tests
// =============================================================================
