//! Configuration for the prefect engine.
//!
//! Maps directly to `prefect.toml`. Every knob has a serde default so a
//! partial file (or none at all) yields a working engine.

use serde::{Deserialize, Serialize};

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Term (season) settings.
    #[serde(default)]
    pub term: TermConfig,
    /// Random-event engine settings.
    #[serde(default)]
    pub events: EventConfig,
    /// Peer-reaction and administrator award rules.
    #[serde(default)]
    pub awards: AwardConfig,
    /// Transient-message retention settings.
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns [`crate::EngineError::Config`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::EngineError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Term (season) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermConfig {
    /// Length of a competitive term in days.
    #[serde(default = "default_7")]
    pub length_days: i64,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self { length_days: 7 }
    }
}

/// Random-event engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Messages between Standard-tier events.
    #[serde(default = "default_400")]
    pub standard_frequency: i64,
    /// Messages between Epic-tier events.
    #[serde(default = "default_1200")]
    pub epic_frequency: i64,
    /// How long an installed Boost/Block modifier lasts, in seconds.
    #[serde(default = "default_modifier_ttl")]
    pub modifier_ttl_seconds: i64,
    /// How long a snitch stays catchable, in seconds.
    #[serde(default = "default_snitch_ttl")]
    pub snitch_ttl_seconds: i64,
    /// Points awarded to whoever catches the snitch.
    #[serde(default = "default_20")]
    pub snitch_award: i64,
    /// The exact phrase that catches an open snitch.
    #[serde(default = "default_snitch_phrase")]
    pub snitch_phrase: String,
    /// Flat bonus paid to the champion of the lowest-ranked house.
    #[serde(default = "default_75")]
    pub underdog_bonus: i64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            standard_frequency: 400,
            epic_frequency: 1200,
            modifier_ttl_seconds: 4 * 60 * 60,
            snitch_ttl_seconds: 48 * 60 * 60,
            snitch_award: 20,
            snitch_phrase: "catch the snitch".to_string(),
            underdog_bonus: 75,
        }
    }
}

/// Peer-reaction and administrator award rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardConfig {
    /// Largest single administrator award or deduction.
    #[serde(default = "default_20")]
    pub admin_bound: i64,
}

impl Default for AwardConfig {
    fn default() -> Self {
        Self { admin_bound: 20 }
    }
}

/// Transient-message retention settings.
///
/// The three tiers carry over from the engine's earliest deployments: quick
/// confirmations disappear fast, award notices linger a little, standings
/// boards stay up long enough to argue over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// TTL for quick confirmations and usage hints, in seconds.
    #[serde(default = "default_30")]
    pub short_ttl_seconds: i64,
    /// TTL for award and deduction notices, in seconds.
    #[serde(default = "default_60")]
    pub standard_ttl_seconds: i64,
    /// TTL for dice rolls and other chunky responses, in seconds.
    #[serde(default = "default_90")]
    pub long_ttl_seconds: i64,
    /// TTL for the standings board, in seconds.
    #[serde(default = "default_9000")]
    pub standings_ttl_seconds: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            short_ttl_seconds: 30,
            standard_ttl_seconds: 60,
            long_ttl_seconds: 90,
            standings_ttl_seconds: 9000,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_snitch_phrase() -> String {
    "catch the snitch".to_string()
}
fn default_modifier_ttl() -> i64 {
    4 * 60 * 60
}
fn default_snitch_ttl() -> i64 {
    48 * 60 * 60
}
fn default_7() -> i64 {
    7
}
fn default_20() -> i64 {
    20
}
fn default_30() -> i64 {
    30
}
fn default_60() -> i64 {
    60
}
fn default_75() -> i64 {
    75
}
fn default_90() -> i64 {
    90
}
fn default_400() -> i64 {
    400
}
fn default_1200() -> i64 {
    1200
}
fn default_9000() -> i64 {
    9000
}
