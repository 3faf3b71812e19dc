//! # Waymark Tracker
//!
//! Asynchronous location-and-geofence event pipeline. Sits between a
//! positioning subsystem, an external waypoint store and an outbound
//! message transport, turning raw fixes and region transitions into
//! telemetry reports.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Waymark Tracker Pipeline                          │
//! │                                                                         │
//! │   fixes, transitions,          ┌──────────────────┐                     │
//! │   app lifecycle  ──mpsc──────► │ EventDispatcher  │  single consumer    │
//! │   (Occurrence)                 └────────┬─────────┘                     │
//! │                                         │                               │
//! │              ┌──────────────────────────┼──────────────────────┐        │
//! │              ▼                          ▼                      ▼        │
//! │   ┌───────────────────┐   ┌──────────────────────┐   ┌──────────────┐  │
//! │   │ LocationUpdate    │   │ GeofenceTransition   │   │ GeofenceSync │  │
//! │   │ Handler           │   │ Handler              │   │ Manager      │  │
//! │   │ ───────────────   │   │ ──────────────────   │   │ ──────────── │  │
//! │   │ last-known slot   │   │ waypoint lookup      │   │ teardown +   │  │
//! │   │ 30s throttle      │   │ trigger persistence  │   │ resync       │  │
//! │   │ accuracy filter   │   │ paired reports       │   │ lazy ids     │  │
//! │   └─────────┬─────────┘   └──────────┬───────────┘   └──────┬───────┘  │
//! │             │                        │                      │          │
//! │             ▼                        ▼                      ▼          │
//! │      OutboundPublisher        OutboundPublisher      GeofencingProvider│
//! │                                                                         │
//! │   The embedding application implements the provider traits             │
//! │   ([`providers`]) and feeds occurrences through [`DispatcherHandle`].  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. **Single consumer**: all state mutation happens on the dispatcher
//!    task. Teardown + resync is indivisible without any locking protocol.
//! 2. **Fire-and-forget seams**: publishing and registration calls are
//!    hand-offs; the pipeline never blocks on network I/O. Only waypoint
//!    store updates report failure, and a failure aborts exactly the one
//!    registration or report it affects.
//! 3. **Pure core**: message construction, validation and the polling
//!    policy live in `waymark-core` with no I/O or clocks of their own.
//!
//! ## Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use waymark_tracker::{spawn_dispatcher, Occurrence, TrackerConfig};
//! use waymark_tracker::providers::{NoOpEmitter, NoStatusProbe};
//! # use waymark_tracker::providers::{GeofencingProvider, LocationProvider,
//! #     OutboundPublisher, WaypointStore};
//! # fn collaborators() -> (Arc<dyn WaypointStore>, Arc<dyn LocationProvider>,
//! #     Arc<dyn GeofencingProvider>, Arc<dyn OutboundPublisher>) { unimplemented!() }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (store, locator, geofencing, publisher) = collaborators();
//! let config = TrackerConfig::load_or_default(None);
//!
//! let handle = spawn_dispatcher(
//!     config,
//!     store,
//!     locator,
//!     geofencing,
//!     publisher,
//!     Arc::new(NoOpEmitter),
//!     Arc::new(NoStatusProbe),
//! );
//!
//! // The embedding application forwards stimuli as occurrences:
//! handle.dispatch(Occurrence::SendLocationPing).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod geofence;
pub mod location;
pub mod providers;
pub mod transition;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::TrackerConfig;
pub use dispatcher::{spawn_dispatcher, DispatcherHandle, EventDispatcher, Occurrence};
pub use error::{TrackerError, TrackerResult};
pub use geofence::GeofenceSyncManager;
pub use location::{LocationUpdateHandler, FOREGROUND_THROTTLE_SECS};
pub use transition::GeofenceTransitionHandler;
