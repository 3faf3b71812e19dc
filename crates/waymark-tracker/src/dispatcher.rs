//! # Event Dispatcher
//!
//! Single-consumer actor that routes every external occurrence to the right
//! handler. All state mutation happens on this one task, which is what makes
//! teardown + resync an indivisible unit without any locking protocol.
//!
//! ## Dispatch Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Event Dispatcher                                  │
//! │                                                                         │
//! │  DispatcherHandle ──mpsc──► run() loop (single consumer)               │
//! │                                 │                                       │
//! │   startup: issue polling        │                                       │
//! │   request + initial resync      ▼                                       │
//! │   (no teardown)          ┌──────────────┐                               │
//! │                          │   dispatch   │                               │
//! │                          └──────┬───────┘                               │
//! │        ┌────────────────┬──────┴────────┬──────────────────┐           │
//! │        ▼                ▼               ▼                  ▼           │
//! │  FixArrived      SendLocation*   GeofenceTransition   Waypoint*/       │
//! │  ChangeBackground                Arrived              ModeChanged      │
//! │        │                │               │                  │           │
//! │        ▼                ▼               ▼                  ▼           │
//! │  LocationUpdate   LocationUpdate  TransitionHandler   teardown +       │
//! │  Handler          Handler                             resync           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The occurrence set is closed: every external stimulus the pipeline reacts
//! to is a variant of [`Occurrence`], and the dispatch match is exhaustive,
//! so adding a stimulus is a compile-checked change.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use waymark_core::{GeofenceTransitionEvent, LocationFix, ModeId, PollingRequest, TriggerReason};

use crate::config::TrackerConfig;
use crate::error::{TrackerError, TrackerResult};
use crate::geofence::GeofenceSyncManager;
use crate::location::LocationUpdateHandler;
use crate::providers::{
    GeofencingProvider, LocationProvider, OutboundPublisher, StatusProbe, TrackerEventEmitter,
    WaypointStore,
};
use crate::transition::GeofenceTransitionHandler;

// =============================================================================
// Occurrences
// =============================================================================

/// An external stimulus routed through the dispatcher.
#[derive(Debug, Clone)]
pub enum Occurrence {
    /// A new fix arrived from the positioning subsystem.
    FixArrived(LocationFix),

    /// The embedding application moved between foreground and background.
    ChangeBackgroundMode {
        /// True when the application is now foregrounded.
        foreground: bool,
    },

    /// Scheduled ping: publish the last-known location with trigger "p".
    SendLocationPing,

    /// User request: publish the last-known location with trigger "u".
    SendLocationUser,

    /// A geofence transition batch arrived.
    GeofenceTransitionArrived(GeofenceTransitionEvent),

    /// A waypoint was added to the store.
    WaypointAdded(String),

    /// A waypoint's definition changed in the store.
    WaypointUpdated(String),

    /// A waypoint was removed from the store.
    WaypointRemoved(String),

    /// The active waypoint mode changed.
    ModeChanged(ModeId),
}

// =============================================================================
// Dispatcher Handle
// =============================================================================

/// Cloneable handle for feeding occurrences to a running dispatcher.
#[derive(Clone)]
pub struct DispatcherHandle {
    occurrence_tx: mpsc::Sender<Occurrence>,
    shutdown_tx: mpsc::Sender<()>,
}

impl DispatcherHandle {
    /// Queues an occurrence for the dispatcher task.
    pub async fn dispatch(&self, occurrence: Occurrence) -> TrackerResult<()> {
        self.occurrence_tx
            .send(occurrence)
            .await
            .map_err(|_| TrackerError::ShuttingDown)
    }

    /// Requests a graceful shutdown. Occurrences queued before this call are
    /// still processed.
    pub async fn shutdown(&self) -> TrackerResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| TrackerError::ShuttingDown)
    }
}

// =============================================================================
// Event Dispatcher
// =============================================================================

/// The pipeline's single-consumer occurrence loop.
pub struct EventDispatcher {
    config: Arc<TrackerConfig>,
    occurrence_rx: mpsc::Receiver<Occurrence>,
    shutdown_rx: mpsc::Receiver<()>,

    /// Fix-acquisition surface; polling registrations are reissued on every
    /// foreground/background change.
    locator: Arc<dyn LocationProvider>,

    location: Arc<LocationUpdateHandler>,
    transitions: GeofenceTransitionHandler,
    sync: GeofenceSyncManager,

    /// Foreground flag, shared with the location handler's throttle.
    foreground: Arc<RwLock<bool>>,

    /// Active mode, shared with the sync manager.
    current_mode: Arc<RwLock<ModeId>>,
}

impl EventDispatcher {
    /// Creates a dispatcher wired to the given collaborators, plus the
    /// handle used to feed it.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: TrackerConfig,
        store: Arc<dyn WaypointStore>,
        locator: Arc<dyn LocationProvider>,
        geofencing: Arc<dyn GeofencingProvider>,
        publisher: Arc<dyn OutboundPublisher>,
        emitter: Arc<dyn TrackerEventEmitter>,
        probe: Arc<dyn StatusProbe>,
    ) -> (Self, DispatcherHandle) {
        let (occurrence_tx, occurrence_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let config = Arc::new(config);
        let foreground = Arc::new(RwLock::new(false));
        let current_mode = Arc::new(RwLock::new(config.mode()));

        let location = Arc::new(LocationUpdateHandler::new(
            config.clone(),
            foreground.clone(),
            publisher.clone(),
            emitter.clone(),
            probe,
        ));

        let transitions = GeofenceTransitionHandler::new(
            config.clone(),
            store.clone(),
            location.clone(),
            publisher,
            emitter,
        );

        let sync = GeofenceSyncManager::new(store, geofencing, current_mode.clone());

        let dispatcher = EventDispatcher {
            config,
            occurrence_rx,
            shutdown_rx,
            locator,
            location,
            transitions,
            sync,
            foreground,
            current_mode,
        };

        let handle = DispatcherHandle {
            occurrence_tx,
            shutdown_tx,
        };

        (dispatcher, handle)
    }

    /// Runs the dispatch loop until shutdown.
    ///
    /// Startup issues the initial polling registration and a resync without
    /// a prior teardown, so registrations surviving a restart stay in place
    /// until the store says otherwise.
    pub async fn run(mut self) {
        let mode = *self.current_mode.read().await;
        info!(
            tracker_id = %self.config.tracker_id(),
            mode,
            "Event dispatcher starting"
        );

        self.reissue_polling_request().await;
        self.sync.resync().await;

        loop {
            tokio::select! {
                // Drain queued occurrences before honoring shutdown
                biased;

                Some(occurrence) = self.occurrence_rx.recv() => {
                    self.dispatch(occurrence).await;
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Event dispatcher shutting down");
                    break;
                }
            }
        }

        info!("Event dispatcher stopped");
    }

    /// Routes one occurrence to its handler.
    async fn dispatch(&self, occurrence: Occurrence) {
        match occurrence {
            Occurrence::FixArrived(fix) => {
                self.location.on_fix(fix).await;
            }

            Occurrence::ChangeBackgroundMode { foreground } => {
                debug!(foreground, "Foreground state changed");
                *self.foreground.write().await = foreground;
                self.reissue_polling_request().await;
            }

            Occurrence::SendLocationPing => {
                self.location.publish_on_demand(TriggerReason::Ping).await;
            }

            Occurrence::SendLocationUser => {
                self.location.publish_on_demand(TriggerReason::User).await;
            }

            Occurrence::GeofenceTransitionArrived(event) => {
                self.transitions.on_transition(event).await;
            }

            Occurrence::WaypointAdded(id)
            | Occurrence::WaypointUpdated(id)
            | Occurrence::WaypointRemoved(id) => {
                debug!(waypoint = %id, "Waypoint set changed, resyncing geofences");
                self.resync_geofences().await;
            }

            Occurrence::ModeChanged(mode) => {
                info!(mode, "Active mode changed, resyncing geofences");
                *self.current_mode.write().await = mode;
                self.resync_geofences().await;
            }
        }
    }

    /// Replaces the polling registration to match the current foreground
    /// state.
    async fn reissue_polling_request(&self) {
        let foreground = *self.foreground.read().await;
        let request = PollingRequest::for_mode(foreground, &self.config.locator_profile());

        debug!(foreground, ?request, "Updating location polling request");
        self.locator.remove_updates();
        self.locator.request_updates(request);
    }

    /// Tears down every registration and rebuilds the set from the store.
    ///
    /// Runs on the dispatcher task only, so the pair never interleaves with
    /// another waypoint or mode change.
    async fn resync_geofences(&self) {
        self.sync.teardown();
        self.sync.resync().await;
    }
}

/// Spawns a dispatcher on the current runtime and returns its handle.
pub fn spawn_dispatcher(
    config: TrackerConfig,
    store: Arc<dyn WaypointStore>,
    locator: Arc<dyn LocationProvider>,
    geofencing: Arc<dyn GeofencingProvider>,
    publisher: Arc<dyn OutboundPublisher>,
    emitter: Arc<dyn TrackerEventEmitter>,
    probe: Arc<dyn StatusProbe>,
) -> DispatcherHandle {
    let (dispatcher, handle) = EventDispatcher::new(
        config, store, locator, geofencing, publisher, emitter, probe,
    );
    tokio::spawn(dispatcher.run());
    handle
}

// =============================================================================
// Tests
// =============================================================================
