//! # Tracker Configuration
//!
//! Configuration management for the event pipeline.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WAYMARK_TRACKER_ID=aa                                              │
//! │     WAYMARK_MODE=1                                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/waymark/tracker.toml (Linux)                             │
//! │     ~/Library/Application Support/org.waymark.tracker/tracker.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     publishing enabled, balanced background tier, 60s interval         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tracker.toml
//! [tracker]
//! id = "aa"        # two-character tracker tag attached to every report
//! mode = 0         # active waypoint mode
//! cp = false
//!
//! [reporting]
//! enabled = true
//! extended_data = false
//! ignore_inaccurate_locations = 0   # accuracy threshold, 0 = disabled
//!
//! [locator]
//! interval_secs = 60
//! displacement = 500.0
//! accuracy_foreground = 0   # 0=high, 1=balanced, 2=low-power, 3=no-power
//! accuracy_background = 1
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use waymark_core::validation::validate_tracker_id;
use waymark_core::{LocatorProfile, ModeId};

use crate::error::{TrackerError, TrackerResult};

// =============================================================================
// Tracker Identity Settings
// =============================================================================

/// Identity of this tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Tracker identifier attached to every outbound report (max 2 chars).
    #[serde(default = "default_tracker_id")]
    pub id: String,

    /// Currently active waypoint mode.
    #[serde(default)]
    pub mode: ModeId,

    /// Course-point flag forwarded on location reports.
    #[serde(default)]
    pub cp: bool,
}

fn default_tracker_id() -> String {
    "wm".to_string()
}

impl Default for TrackerSettings {
    fn default() -> Self {
        TrackerSettings {
            id: default_tracker_id(),
            mode: 0,
            cp: false,
        }
    }
}

// =============================================================================
// Reporting Settings
// =============================================================================

/// Outbound reporting behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingSettings {
    /// Global publish switch. When disabled, passive fixes update the
    /// last-known slot but no default-trigger messages are sent.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Attach battery/connectivity extended data to location reports.
    #[serde(default)]
    pub extended_data: bool,

    /// Accuracy threshold above which candidate locations are suppressed.
    /// Same linear unit as fix accuracy; 0 disables the filter.
    #[serde(default)]
    pub ignore_inaccurate_locations: u32,
}

fn default_true() -> bool {
    true
}

impl Default for ReportingSettings {
    fn default() -> Self {
        ReportingSettings {
            enabled: true,
            extended_data: false,
            ignore_inaccurate_locations: 0,
        }
    }
}

// =============================================================================
// Locator Settings
// =============================================================================

/// Background polling parameters and accuracy tiers.
///
/// Foreground interval and displacement are fixed by policy
/// ([`waymark_core::policy`]); only the background side is configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorSettings {
    /// Polling interval while backgrounded (seconds).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Minimum displacement between fixes while backgrounded.
    #[serde(default = "default_displacement")]
    pub displacement: f64,

    /// Accuracy tier while foregrounded (0..3, out of range → balanced).
    #[serde(default)]
    pub accuracy_foreground: u8,

    /// Accuracy tier while backgrounded (0..3, out of range → balanced).
    #[serde(default = "default_background_tier")]
    pub accuracy_background: u8,
}

fn default_interval() -> u64 {
    60
}

fn default_displacement() -> f64 {
    500.0
}

fn default_background_tier() -> u8 {
    1
}

impl Default for LocatorSettings {
    fn default() -> Self {
        LocatorSettings {
            interval_secs: default_interval(),
            displacement: default_displacement(),
            accuracy_foreground: 0,
            accuracy_background: default_background_tier(),
        }
    }
}

// =============================================================================
// Main Tracker Configuration
// =============================================================================

/// Complete tracker configuration.
///
/// ## Example Config File
/// ```toml
/// [tracker]
/// id = "aa"
/// mode = 0
///
/// [reporting]
/// enabled = true
/// ignore_inaccurate_locations = 50
///
/// [locator]
/// interval_secs = 300
/// displacement = 500.0
/// accuracy_background = 2
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Tracker identity.
    #[serde(default)]
    pub tracker: TrackerSettings,

    /// Outbound reporting behavior.
    #[serde(default)]
    pub reporting: ReportingSettings,

    /// Location polling parameters.
    #[serde(default)]
    pub locator: LocatorSettings,
}

impl TrackerConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (tracker.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> TrackerResult<Self> {
        let mut config = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading tracker config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load tracker config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> TrackerResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| TrackerError::ConfigSaveFailed("No config path available".into()))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Tracker config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TrackerResult<()> {
        // Tracker id must be a valid short tag
        validate_tracker_id(&self.tracker.id)?;

        // Background polling must have a usable interval
        if self.locator.interval_secs == 0 {
            return Err(TrackerError::InvalidConfig(
                "locator.interval_secs must be greater than 0".into(),
            ));
        }

        if !self.locator.displacement.is_finite() || self.locator.displacement < 0.0 {
            return Err(TrackerError::InvalidConfig(
                "locator.displacement must be a non-negative number".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // Tracker id
        if let Ok(id) = std::env::var("WAYMARK_TRACKER_ID") {
            debug!(tracker_id = %id, "Overriding tracker id from environment");
            self.tracker.id = id;
        }

        // Active mode
        if let Ok(mode) = std::env::var("WAYMARK_MODE") {
            if let Ok(m) = mode.parse::<ModeId>() {
                self.tracker.mode = m;
            }
        }

        // Publish switch
        if let Ok(enabled) = std::env::var("WAYMARK_REPORTING_ENABLED") {
            if let Ok(e) = enabled.parse::<bool>() {
                debug!(enabled = e, "Overriding publish switch from environment");
                self.reporting.enabled = e;
            }
        }

        // Accuracy threshold
        if let Ok(threshold) = std::env::var("WAYMARK_IGNORE_INACCURATE") {
            if let Ok(t) = threshold.parse::<u32>() {
                self.reporting.ignore_inaccurate_locations = t;
            }
        }

        // Background interval
        if let Ok(interval) = std::env::var("WAYMARK_LOCATOR_INTERVAL") {
            if let Ok(i) = interval.parse::<u64>() {
                debug!(interval_secs = i, "Overriding locator interval from environment");
                self.locator.interval_secs = i;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "waymark", "tracker").map(|dirs| {
            let config_dir = dirs.config_dir();
            config_dir.join("tracker.toml")
        })
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the tracker id.
    pub fn tracker_id(&self) -> &str {
        &self.tracker.id
    }

    /// Returns the currently configured waypoint mode.
    pub fn mode(&self) -> ModeId {
        self.tracker.mode
    }

    /// Returns true if outbound publishing is enabled.
    pub fn is_publishing_enabled(&self) -> bool {
        self.reporting.enabled
    }

    /// Returns the accuracy threshold, or `None` when the filter is disabled.
    pub fn accuracy_threshold(&self) -> Option<f64> {
        (self.reporting.ignore_inaccurate_locations > 0)
            .then(|| f64::from(self.reporting.ignore_inaccurate_locations))
    }

    /// Returns the policy inputs for the location request policy.
    pub fn locator_profile(&self) -> LocatorProfile {
        LocatorProfile {
            background_interval: Duration::from_secs(self.locator.interval_secs),
            background_displacement: self.locator.displacement,
            foreground_tier: self.locator.accuracy_foreground,
            background_tier: self.locator.accuracy_background,
        }
    }
}
