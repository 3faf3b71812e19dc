//! # Geofence Registration Sync
//!
//! Reconciles the waypoint store with the positioning subsystem's region
//! registrations.
//!
//! ## Resync Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Resync Flow                                      │
//! │                                                                         │
//! │  resync()                                                               │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  query waypoints for current mode ── fails ──► log, keep registrations │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  for each waypoint with valid bounds:                                  │
//! │      ├─ has geofence id? ──no──► assign UUID, persist through store    │
//! │      │                              └─ persist fails ──► skip waypoint │
//! │      └─ build registration (enter+exit, 2min responsiveness,           │
//! │         never expires)                                                 │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  empty set? ──yes──► leave existing registrations untouched            │
//! │      │ no                                                               │
//! │      ▼                                                                  │
//! │  register the whole batch in one request                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Waypoint and mode changes run `teardown` + `resync` back to back; the
//! dispatcher serializes both on its single consumer task so a resync never
//! interleaves with another teardown/resync pair.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use waymark_core::{GeofenceRegistration, ModeId};

use crate::providers::{GeofencingProvider, WaypointStore};

// =============================================================================
// Geofence Sync Manager
// =============================================================================

/// Keeps the positioning subsystem's registrations in step with the store.
pub struct GeofenceSyncManager {
    /// Waypoint source and geofence-id persistence.
    store: Arc<dyn WaypointStore>,

    /// Region-monitoring surface of the positioning subsystem.
    geofencing: Arc<dyn GeofencingProvider>,

    /// The currently active waypoint mode, shared with the dispatcher.
    current_mode: Arc<RwLock<ModeId>>,
}

impl GeofenceSyncManager {
    /// Creates a new sync manager.
    pub fn new(
        store: Arc<dyn WaypointStore>,
        geofencing: Arc<dyn GeofencingProvider>,
        current_mode: Arc<RwLock<ModeId>>,
    ) -> Self {
        GeofenceSyncManager {
            store,
            geofencing,
            current_mode,
        }
    }

    /// Removes every registration previously made by this pipeline.
    pub fn teardown(&self) {
        debug!("Removing all geofence registrations");
        self.geofencing.remove_all();
    }

    /// Rebuilds the registration set from the store.
    ///
    /// Idempotent: running it twice against an unchanged store produces the
    /// same registrations, because geofence ids are stable once assigned.
    pub async fn resync(&self) {
        let mode = *self.current_mode.read().await;

        let waypoints = match self.store.waypoints_for_mode(mode) {
            Ok(waypoints) => waypoints,
            Err(e) => {
                error!(mode, error = %e, "Waypoint query failed, keeping current registrations");
                return;
            }
        };

        let mut registrations = Vec::with_capacity(waypoints.len());
        for waypoint in &waypoints {
            let geofence_id = match &waypoint.geofence_id {
                Some(id) => id.clone(),
                None => {
                    // Lazy assignment: the id must be persisted before the
                    // registration exists, so transition lookups can always
                    // resolve it.
                    let id = Uuid::new_v4().to_string();
                    debug!(waypoint = %waypoint.id, geofence_id = %id, "Assigning geofence id");
                    if let Err(e) = self.store.set_geofence_id(&waypoint.id, &id) {
                        warn!(waypoint = %waypoint.id, error = %e, "Failed to persist geofence id, skipping registration");
                        continue;
                    }
                    id
                }
            };

            registrations.push(GeofenceRegistration::for_waypoint(waypoint, &geofence_id));
        }

        if registrations.is_empty() {
            // Nothing registrable in this mode; prior registrations stay as
            // they are.
            debug!(mode, "No registrable waypoints, leaving registrations untouched");
            return;
        }

        info!(mode, count = registrations.len(), "Registering geofences");
        self.geofencing.register(registrations);
    }
}

// =============================================================================
// Tests
// =============================================================================
