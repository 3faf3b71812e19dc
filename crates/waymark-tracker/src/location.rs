//! # Location Update Handler
//!
//! Owns the last-known-location slot and decides when a passive fix turns
//! into an outbound location report.
//!
//! ## Publish Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Publish Decision                                   │
//! │                                                                         │
//! │  on_fix(F)                                                             │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  replace last-known slot (last write wins), notify observers           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  publishing enabled? ──no──► stop                                      │
//! │      │ yes                                                              │
//! │      ▼                                                                  │
//! │  foregrounded? ──no──► eligible                                        │
//! │      │ yes                                                              │
//! │      ▼                                                                  │
//! │  gap to previous fix > 30s? ──no──► stop (foreground spam guard)       │
//! │      │ yes (strictly greater; exactly 30s is NOT eligible)             │
//! │      ▼                                                                  │
//! │  accuracy filter ──exceeds threshold──► stop                           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  build LocationReport (trigger "") ──► publisher                       │
//! │                                                                         │
//! │  publish_on_demand(trigger) bypasses the throttle but not the          │
//! │  accuracy filter, and is a silent no-op before the first fix.          │
//! │                                                                         │
//! │  publish_correlated(triggering) emits the circular report paired       │
//! │  with a region transition: it carries the last-known location but     │
//! │  is accuracy-filtered against the transition's triggering location,   │
//! │  and is likewise a silent no-op before the first fix.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use waymark_core::{LocationFix, LocationReport, OutboundMessage, TriggerReason};

use crate::config::TrackerConfig;
use crate::providers::{OutboundPublisher, StatusProbe, TrackerEventEmitter};

// =============================================================================
// Constants
// =============================================================================

/// Foreground throttle window in seconds for passive (default-trigger)
/// publishes. Guards against spamming the receiving side while the
/// application is visible and fixes arrive every few seconds.
pub const FOREGROUND_THROTTLE_SECS: i64 = 30;

// =============================================================================
// Accuracy Filter
// =============================================================================

/// Returns true if the fix fails the configured accuracy filter and the
/// candidate publish must be suppressed.
///
/// Applies to every publish, both location and transition messages. A
/// disabled filter (threshold 0) never suppresses.
pub(crate) fn is_low_accuracy(config: &TrackerConfig, fix: &LocationFix) -> bool {
    match config.accuracy_threshold() {
        Some(threshold) => fix.accuracy > threshold,
        None => false,
    }
}

// =============================================================================
// Location Update Handler
// =============================================================================

/// Handles incoming fixes and on-demand publish requests.
pub struct LocationUpdateHandler {
    /// Tracker configuration.
    config: Arc<TrackerConfig>,

    /// Last-known-location slot. Single value, last write wins; readers
    /// take a copy so a publish always works on a consistent snapshot.
    last_fix: Arc<RwLock<Option<LocationFix>>>,

    /// Whether the application is currently foregrounded. Shared with the
    /// dispatcher, which owns mode changes.
    foreground: Arc<RwLock<bool>>,

    /// Outbound message sink.
    publisher: Arc<dyn OutboundPublisher>,

    /// State-change notifications to the embedding application.
    emitter: Arc<dyn TrackerEventEmitter>,

    /// Battery/connectivity snapshot source for extended data.
    probe: Arc<dyn StatusProbe>,
}

impl LocationUpdateHandler {
    /// Creates a new handler.
    pub fn new(
        config: Arc<TrackerConfig>,
        foreground: Arc<RwLock<bool>>,
        publisher: Arc<dyn OutboundPublisher>,
        emitter: Arc<dyn TrackerEventEmitter>,
        probe: Arc<dyn StatusProbe>,
    ) -> Self {
        LocationUpdateHandler {
            config,
            last_fix: Arc::new(RwLock::new(None)),
            foreground,
            publisher,
            emitter,
            probe,
        }
    }

    /// Returns a snapshot of the last-known location, if any.
    pub async fn last_known(&self) -> Option<LocationFix> {
        *self.last_fix.read().await
    }

    /// Handles a new fix from the positioning subsystem.
    ///
    /// The last-known slot is replaced unconditionally; whether a report
    /// goes out depends on the publish switch, the foreground throttle and
    /// the accuracy filter.
    pub async fn on_fix(&self, fix: LocationFix) {
        debug!(
            lat = fix.latitude,
            lon = fix.longitude,
            acc = fix.accuracy,
            "Location update received"
        );

        let previous = {
            let mut slot = self.last_fix.write().await;
            slot.replace(fix)
        };

        self.emitter.current_location_updated(&fix);

        if self.should_publish(&fix, previous.as_ref()).await {
            self.publish_report(&fix, TriggerReason::Default);
        }
    }

    /// Publishes a report for the last-known location with the given
    /// trigger, bypassing the foreground throttle.
    ///
    /// Used for explicit ping/user requests. Silently drops the request
    /// (with a log entry) when no fix has been received yet.
    pub async fn publish_on_demand(&self, trigger: TriggerReason) {
        debug!(trigger = %trigger, "On-demand publish requested");

        let snapshot = *self.last_fix.read().await;
        match snapshot {
            Some(fix) => self.publish_report(&fix, trigger),
            None => warn!(trigger = %trigger, "No location available yet, dropping publish"),
        }
    }

    /// Evaluates whether a passive fix is eligible for publishing.
    async fn should_publish(&self, fix: &LocationFix, previous: Option<&LocationFix>) -> bool {
        if !self.config.is_publishing_enabled() {
            debug!("Publishing disabled by configuration");
            return false;
        }

        // Background fixes always go out; the throttle is a foreground
        // spam guard only.
        if !*self.foreground.read().await {
            return true;
        }

        match previous {
            // Nothing to throttle against before the first fix.
            None => true,
            Some(prev) => {
                let elapsed = fix.reported_at - prev.reported_at;
                elapsed > ChronoDuration::seconds(FOREGROUND_THROTTLE_SECS)
            }
        }
    }

    /// Publishes the circular-trigger report that accompanies a region
    /// transition.
    ///
    /// The report carries the last-known location, like any on-demand
    /// publish, but the accuracy filter runs against the transition's own
    /// triggering location, which may be lower quality than normal fixes.
    /// Silently drops the report (with a log entry) before the first fix.
    pub(crate) async fn publish_correlated(&self, triggering: &LocationFix) {
        if is_low_accuracy(&self.config, triggering) {
            debug!(
                acc = triggering.accuracy,
                "Suppressing correlated report, triggering location is low accuracy"
            );
            return;
        }

        let snapshot = *self.last_fix.read().await;
        match snapshot {
            Some(fix) => self.build_and_publish(&fix, TriggerReason::Circular),
            None => warn!("No location available yet, dropping correlated report"),
        }
    }

    /// Builds and hands off a location report, subject to the accuracy
    /// filter.
    fn publish_report(&self, fix: &LocationFix, trigger: TriggerReason) {
        if is_low_accuracy(&self.config, fix) {
            debug!(
                acc = fix.accuracy,
                trigger = %trigger,
                "Suppressing low-accuracy location report"
            );
            return;
        }

        self.build_and_publish(fix, trigger);
    }

    fn build_and_publish(&self, fix: &LocationFix, trigger: TriggerReason) {
        let status = self
            .config
            .reporting
            .extended_data
            .then(|| self.probe.device_status());

        let report = LocationReport::new(
            fix,
            trigger,
            Utc::now(),
            self.config.tracker_id(),
            self.config.tracker.cp,
            status,
        );

        debug!(trigger = %trigger, "Publishing location report");
        self.publisher.publish(OutboundMessage::Location(report));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::NoOpEmitter;
    use crate::testutil::{fix_at, CapturingEmitter, FixedProbe, MockPublisher};
    use chrono::TimeZone;
    use waymark_core::{ConnectivityClass, DeviceStatus};

    fn handler(
        config: TrackerConfig,
        foreground: bool,
        publisher: Arc<MockPublisher>,
    ) -> LocationUpdateHandler {
        LocationUpdateHandler::new(
            Arc::new(config),
            Arc::new(RwLock::new(foreground)),
            publisher,
            Arc::new(NoOpEmitter),
            Arc::new(FixedProbe(DeviceStatus::default())),
        )
    }

    #[tokio::test]
    async fn test_on_fix_always_updates_last_known() {
        let publisher = MockPublisher::new();
        let mut config = TrackerConfig::default();
        config.reporting.enabled = false; // publishing off, slot still updates

        let h = handler(config, false, publisher.clone());
        assert_eq!(h.last_known().await, None);

        let fix = fix_at(48.1, 11.5, 10.0, 0);
        h.on_fix(fix).await;

        assert_eq!(h.last_known().await, Some(fix));
        assert!(publisher.messages().is_empty());
    }

    #[tokio::test]
    async fn test_background_fix_always_publishes() {
        let publisher = MockPublisher::new();
        let h = handler(TrackerConfig::default(), false, publisher.clone());

        h.on_fix(fix_at(48.1, 11.5, 10.0, 0)).await;
        h.on_fix(fix_at(48.2, 11.6, 10.0, 5)).await;

        assert_eq!(publisher.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_foreground_throttle_suppresses_within_window() {
        let publisher = MockPublisher::new();
        let h = handler(TrackerConfig::default(), true, publisher.clone());

        h.on_fix(fix_at(48.1, 11.5, 10.0, 0)).await;
        // First fix publishes; 29s later is inside the window
        h.on_fix(fix_at(48.2, 11.6, 10.0, 29)).await;

        assert_eq!(publisher.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_foreground_throttle_allows_beyond_window() {
        let publisher = MockPublisher::new();
        let h = handler(TrackerConfig::default(), true, publisher.clone());

        h.on_fix(fix_at(48.1, 11.5, 10.0, 0)).await;
        h.on_fix(fix_at(48.2, 11.6, 10.0, 31)).await;

        assert_eq!(publisher.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_foreground_throttle_exact_boundary_is_suppressed() {
        let publisher = MockPublisher::new();
        let h = handler(TrackerConfig::default(), true, publisher.clone());

        h.on_fix(fix_at(48.1, 11.5, 10.0, 0)).await;
        // Exactly 30s counts as NOT eligible (strict greater-than)
        h.on_fix(fix_at(48.2, 11.6, 10.0, 30)).await;

        assert_eq!(publisher.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_accuracy_filter_suppresses_default_trigger() {
        let publisher = MockPublisher::new();
        let mut config = TrackerConfig::default();
        config.reporting.ignore_inaccurate_locations = 20;

        let h = handler(config, false, publisher.clone());
        h.on_fix(fix_at(48.1, 11.5, 25.0, 0)).await;

        assert!(publisher.messages().is_empty());
        // Slot is still updated even when the report is suppressed
        assert!(h.last_known().await.is_some());
    }

    #[tokio::test]
    async fn test_on_demand_bypasses_throttle_but_not_filter() {
        let publisher = MockPublisher::new();
        let mut config = TrackerConfig::default();
        config.reporting.ignore_inaccurate_locations = 20;

        let h = handler(config, true, publisher.clone());
        h.on_fix(fix_at(48.1, 11.5, 10.0, 0)).await;
        h.on_fix(fix_at(48.2, 11.6, 10.0, 5)).await; // throttled
        assert_eq!(publisher.messages().len(), 1);

        // Ping ignores the throttle entirely
        h.publish_on_demand(TriggerReason::Ping).await;
        assert_eq!(publisher.messages().len(), 2);

        // But a low-accuracy last-known is still filtered
        h.on_fix(fix_at(48.3, 11.7, 30.0, 10)).await;
        h.publish_on_demand(TriggerReason::User).await;
        assert_eq!(publisher.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_correlated_report_carries_last_known_location() {
        let publisher = MockPublisher::new();
        let mut config = TrackerConfig::default();
        config.reporting.enabled = false; // passive publishes off

        let h = handler(config, false, publisher.clone());
        h.on_fix(fix_at(48.5, 11.9, 8.0, 0)).await;

        // Triggering location differs from the slot; the report must use
        // the slot
        h.publish_correlated(&fix_at(48.1, 11.5, 5.0, 10)).await;

        let messages = publisher.messages();
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            OutboundMessage::Location(report) => {
                assert_eq!(report.t, TriggerReason::Circular);
                assert_eq!(report.lat, 48.5);
                assert_eq!(report.lon, 11.9);
            }
            other => panic!("expected location report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_correlated_report_filtered_on_triggering_location() {
        let publisher = MockPublisher::new();
        let mut config = TrackerConfig::default();
        config.reporting.enabled = false;
        config.reporting.ignore_inaccurate_locations = 20;

        let h = handler(config, false, publisher.clone());
        // The slot holds a fix that would fail its own filter; only the
        // triggering location decides
        h.on_fix(fix_at(48.5, 11.9, 25.0, 0)).await;

        h.publish_correlated(&fix_at(48.1, 11.5, 5.0, 10)).await;
        assert_eq!(publisher.messages().len(), 1);

        // A low-accuracy triggering location suppresses the report even
        // though the slot is unchanged
        h.publish_correlated(&fix_at(48.1, 11.5, 25.0, 20)).await;
        assert_eq!(publisher.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_correlated_report_silent_before_first_fix() {
        let publisher = MockPublisher::new();
        let h = handler(TrackerConfig::default(), false, publisher.clone());

        h.publish_correlated(&fix_at(48.1, 11.5, 5.0, 0)).await;
        assert!(publisher.messages().is_empty());
    }

    #[tokio::test]
    async fn test_on_demand_without_fix_is_silent() {
        let publisher = MockPublisher::new();
        let h = handler(TrackerConfig::default(), false, publisher.clone());

        h.publish_on_demand(TriggerReason::User).await;
        assert!(publisher.messages().is_empty());
    }

    #[tokio::test]
    async fn test_observer_notified_on_every_fix() {
        let publisher = MockPublisher::new();
        let emitter = Arc::new(CapturingEmitter::default());
        let mut config = TrackerConfig::default();
        config.reporting.enabled = false;

        let h = LocationUpdateHandler::new(
            Arc::new(config),
            Arc::new(RwLock::new(false)),
            publisher,
            emitter.clone(),
            Arc::new(FixedProbe(DeviceStatus::default())),
        );

        h.on_fix(fix_at(48.1, 11.5, 10.0, 0)).await;
        h.on_fix(fix_at(48.2, 11.6, 10.0, 1)).await;

        assert_eq!(emitter.location_updates(), 2);
    }

    #[tokio::test]
    async fn test_extended_data_attached_when_enabled() {
        let publisher = MockPublisher::new();
        let mut config = TrackerConfig::default();
        config.reporting.extended_data = true;

        let status = DeviceStatus {
            battery: Some(42),
            connectivity: Some(ConnectivityClass::Mobile),
        };
        let h = LocationUpdateHandler::new(
            Arc::new(config),
            Arc::new(RwLock::new(false)),
            publisher.clone(),
            Arc::new(NoOpEmitter),
            Arc::new(FixedProbe(status)),
        );

        h.on_fix(fix_at(48.1, 11.5, 10.0, 0)).await;

        let messages = publisher.messages();
        match &messages[0] {
            OutboundMessage::Location(report) => {
                assert_eq!(report.batt, Some(42));
                assert_eq!(report.conn, Some(ConnectivityClass::Mobile));
            }
            other => panic!("expected location report, got {:?}", other),
        }
    }

    #[test]
    fn test_throttle_window_constant() {
        // The spam guard is fixed at half a minute
        assert_eq!(FOREGROUND_THROTTLE_SECS, 30);
        // fix_at anchors timestamps at a known epoch
        let f = fix_at(0.0, 0.0, 1.0, 0);
        assert_eq!(
            f.reported_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
    }
}
