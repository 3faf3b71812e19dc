//! # Location Request Policy
//!
//! Pure mapping from {foreground/background mode, configured accuracy tier}
//! to the polling parameters handed to the location provider.
//!
//! ## Policy Summary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Location Request Policy                              │
//! │                                                                         │
//! │  FOREGROUND                         │  BACKGROUND                       │
//! │  ──────────                         │  ──────────                       │
//! │  • interval: fixed 10s              │  • interval: configured           │
//! │  • displacement: fixed 50 units     │  • displacement: configured       │
//! │  • tier: foreground tier            │  • tier: background tier          │
//! │                                                                         │
//! │  Both modes: fastest interval fixed at 10s                             │
//! │                                                                         │
//! │  TIER → PRIORITY                                                       │
//! │  0 → HighAccuracy    2 → LowPower                                      │
//! │  1 → BalancedPower   3 → NoPower                                       │
//! │  other → BalancedPower (default fallback, never an error)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure and side-effect free: callable any time the mode or tier changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Fastest interval the provider may deliver fixes at, regardless of mode.
pub const FASTEST_INTERVAL: Duration = Duration::from_secs(10);

/// Fixed polling interval while foregrounded.
pub const FOREGROUND_INTERVAL: Duration = Duration::from_secs(10);

/// Fixed minimum displacement while foregrounded.
pub const FOREGROUND_DISPLACEMENT: f64 = 50.0;

// =============================================================================
// Request Priority
// =============================================================================

/// Power/accuracy priority requested from the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPriority {
    /// Most accurate fixes the provider can deliver.
    HighAccuracy,

    /// Balance accuracy against power consumption.
    BalancedPower,

    /// Coarse fixes with minimal power use.
    LowPower,

    /// Passive only: piggyback on fixes requested by others.
    NoPower,
}

impl RequestPriority {
    /// Maps a configured accuracy tier to a priority.
    ///
    /// Out-of-range tiers fall back to balanced power; a misconfigured tier
    /// must never stop location polling.
    pub const fn from_tier(tier: u8) -> Self {
        match tier {
            0 => RequestPriority::HighAccuracy,
            1 => RequestPriority::BalancedPower,
            2 => RequestPriority::LowPower,
            3 => RequestPriority::NoPower,
            _ => RequestPriority::BalancedPower,
        }
    }
}

// =============================================================================
// Locator Profile
// =============================================================================

/// Configured inputs to the polling policy.
///
/// The tracker config exposes this as a value type so the policy stays pure
/// and independent of how configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorProfile {
    /// Polling interval while backgrounded.
    pub background_interval: Duration,

    /// Minimum displacement while backgrounded.
    pub background_displacement: f64,

    /// Accuracy tier while foregrounded (0..3, out of range → balanced).
    pub foreground_tier: u8,

    /// Accuracy tier while backgrounded (0..3, out of range → balanced).
    pub background_tier: u8,
}

// =============================================================================
// Polling Request
// =============================================================================

/// Desired polling parameters handed to the location provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollingRequest {
    /// Requested fix interval.
    pub interval: Duration,

    /// Fastest interval the provider may deliver at.
    pub fastest_interval: Duration,

    /// Minimum displacement between fixes.
    pub min_displacement: f64,

    /// Power/accuracy priority.
    pub priority: RequestPriority,
}

impl PollingRequest {
    /// Computes the polling request for the given mode.
    pub fn for_mode(foreground: bool, profile: &LocatorProfile) -> Self {
        if foreground {
            PollingRequest {
                interval: FOREGROUND_INTERVAL,
                fastest_interval: FASTEST_INTERVAL,
                min_displacement: FOREGROUND_DISPLACEMENT,
                priority: RequestPriority::from_tier(profile.foreground_tier),
            }
        } else {
            PollingRequest {
                interval: profile.background_interval,
                fastest_interval: FASTEST_INTERVAL,
                min_displacement: profile.background_displacement,
                priority: RequestPriority::from_tier(profile.background_tier),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
