//! Configuration loading and typed config structures for the Eruxian simulation.
//!
//! The configuration lives in `eruxian-config.yaml`. Every section and field
//! is optional; missing values fall back to the reference constants, so an
//! empty file (or no file at all) yields the standard 20x15, five-faction
//! game ticking once per second.

use std::path::Path;

use eruxian_world::{WorldError, WorldGenConfig};
use serde::Deserialize;

/// Environment variable overriding `observer.port`.
pub const PORT_ENV: &str = "PORT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The world section is unusable.
    #[error("invalid world config: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Some other value is out of range.
    #[error("invalid config value `{name}`: {reason}")]
    Invalid {
        /// Config key.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Grid size, scatter and faction spawn.
    #[serde(default)]
    pub world: WorldGenConfig,

    /// Gathering.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Expansion and attack eligibility and costs.
    #[serde(default)]
    pub ai: AiConfig,

    /// Combat resolution.
    #[serde(default)]
    pub conflict: ConflictConfig,

    /// Tick timing.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Event log sizing.
    #[serde(default)]
    pub events: EventLogConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `PORT` environment variable overrides `observer.port`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        let port = std::env::var(PORT_ENV).ok();
        self.observer.apply_port_override(port.as_deref());
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::World`] or [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        if self.clock.tick_interval_ms == 0 {
            return Err(invalid("clock.tick_interval_ms", "tick period must be positive"));
        }
        if self.events.capacity == 0 {
            return Err(invalid("events.capacity", "capacity must be positive"));
        }
        if !(self.economy.gather_rate >= 0.0) {
            return Err(invalid("economy.gather_rate", "rate must be non-negative"));
        }
        let c = &self.conflict;
        if !(c.multiplier_min > 0.0 && c.multiplier_max >= c.multiplier_min) {
            return Err(invalid(
                "conflict.multiplier_min",
                "multiplier range must be positive and ordered",
            ));
        }
        if !(c.win_ratio > 0.0) {
            return Err(invalid("conflict.win_ratio", "ratio must be positive"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Gathering configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomyConfig {
    /// Maximum units a faction extracts from each owned tile per tick.
    #[serde(default = "default_gather_rate")]
    pub gather_rate: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            gather_rate: default_gather_rate(),
        }
    }
}

/// AI eligibility thresholds and action costs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiConfig {
    /// Total stockpile must exceed this to expand.
    #[serde(default = "default_expansion_resource_threshold")]
    pub expansion_resource_threshold: f64,

    /// Strength must exceed this to expand.
    #[serde(default = "default_expansion_strength_threshold")]
    pub expansion_strength_threshold: f64,

    /// Strength must exceed this to attack.
    #[serde(default = "default_attack_strength_threshold")]
    pub attack_strength_threshold: f64,

    /// Food spent per expansion.
    #[serde(default = "default_expansion_food_cost")]
    pub expansion_food_cost: f64,

    /// Wood spent per expansion.
    #[serde(default = "default_expansion_wood_cost")]
    pub expansion_wood_cost: f64,

    /// Strength gained per expansion.
    #[serde(default = "default_expansion_strength_gain")]
    pub expansion_strength_gain: f64,

    /// Ore spent to launch an attack.
    #[serde(default = "default_attack_ore_cost")]
    pub attack_ore_cost: f64,

    /// Mana spent to launch an attack.
    #[serde(default = "default_attack_mana_cost")]
    pub attack_mana_cost: f64,

    /// Strength spent to launch an attack.
    #[serde(default = "default_attack_strength_cost")]
    pub attack_strength_cost: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            expansion_resource_threshold: default_expansion_resource_threshold(),
            expansion_strength_threshold: default_expansion_strength_threshold(),
            attack_strength_threshold: default_attack_strength_threshold(),
            expansion_food_cost: default_expansion_food_cost(),
            expansion_wood_cost: default_expansion_wood_cost(),
            expansion_strength_gain: default_expansion_strength_gain(),
            attack_ore_cost: default_attack_ore_cost(),
            attack_mana_cost: default_attack_mana_cost(),
            attack_strength_cost: default_attack_strength_cost(),
        }
    }
}

/// Combat resolution parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConflictConfig {
    /// Lower bound of the random strength multiplier.
    #[serde(default = "default_multiplier_min")]
    pub multiplier_min: f64,

    /// Upper bound of the random strength multiplier.
    #[serde(default = "default_multiplier_max")]
    pub multiplier_max: f64,

    /// Attacker wins iff effective attack exceeds effective defense times this.
    #[serde(default = "default_win_ratio")]
    pub win_ratio: f64,

    /// Strength at or below which a beaten defender is eliminated. Also the
    /// floor applied to a defender's losses.
    #[serde(default = "default_destruction_threshold")]
    pub destruction_threshold: f64,

    /// Strength a winning attacker gains.
    #[serde(default = "default_victor_gain")]
    pub victor_gain: f64,

    /// Strength a beaten defender loses.
    #[serde(default = "default_vanquished_loss")]
    pub vanquished_loss: f64,

    /// Strength a repelled attacker loses.
    #[serde(default = "default_repelled_loss")]
    pub repelled_loss: f64,

    /// Strength a successful defender loses.
    #[serde(default = "default_defender_loss")]
    pub defender_loss: f64,
}

impl ConflictConfig {
    /// Strength a repelled attacker never drops below: one above the
    /// destruction threshold.
    pub const fn repelled_floor(&self) -> f64 {
        self.destruction_threshold + 1.0
    }
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            multiplier_min: default_multiplier_min(),
            multiplier_max: default_multiplier_max(),
            win_ratio: default_win_ratio(),
            destruction_threshold: default_destruction_threshold(),
            victor_gain: default_victor_gain(),
            vanquished_loss: default_vanquished_loss(),
            repelled_loss: default_repelled_loss(),
            defender_loss: default_defender_loss(),
        }
    }
}

/// Tick timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Emit a milestone event every N ticks (0 disables).
    #[serde(default = "default_milestone_interval")]
    pub milestone_interval: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            milestone_interval: default_milestone_interval(),
        }
    }
}

/// Event log sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventLogConfig {
    /// Maximum retained entries.
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,

    /// Entries included in the overview snapshot.
    #[serde(default = "default_snapshot_events")]
    pub snapshot_events: usize,

    /// Entries returned by an event query without a limit.
    #[serde(default = "default_query_limit")]
    pub default_query_limit: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
            snapshot_events: default_snapshot_events(),
            default_query_limit: default_query_limit(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Observer HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl ObserverConfig {
    /// Replace the port with a parsed override. Unparseable values are ignored.
    pub fn apply_port_override(&mut self, value: Option<&str>) {
        if let Some(port) = value.and_then(|v| v.trim().parse::<u16>().ok()) {
            self.port = port;
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde's `default = "..."` attribute)
// ---------------------------------------------------------------------------

const fn default_gather_rate() -> f64 {
    1.0
}
const fn default_expansion_resource_threshold() -> f64 {
    80.0
}
const fn default_expansion_strength_threshold() -> f64 {
    12.0
}
const fn default_attack_strength_threshold() -> f64 {
    15.0
}
const fn default_expansion_food_cost() -> f64 {
    15.0
}
const fn default_expansion_wood_cost() -> f64 {
    15.0
}
const fn default_expansion_strength_gain() -> f64 {
    1.0
}
const fn default_attack_ore_cost() -> f64 {
    10.0
}
const fn default_attack_mana_cost() -> f64 {
    5.0
}
const fn default_attack_strength_cost() -> f64 {
    0.5
}
const fn default_multiplier_min() -> f64 {
    0.8
}
const fn default_multiplier_max() -> f64 {
    1.2
}
const fn default_win_ratio() -> f64 {
    1.1
}
const fn default_destruction_threshold() -> f64 {
    1.0
}
const fn default_victor_gain() -> f64 {
    2.0
}
const fn default_vanquished_loss() -> f64 {
    3.0
}
const fn default_repelled_loss() -> f64 {
    2.0
}
const fn default_defender_loss() -> f64 {
    1.0
}
const fn default_tick_interval_ms() -> u64 {
    1000
}
const fn default_milestone_interval() -> u64 {
    50
}
const fn default_event_capacity() -> usize {
    200
}
const fn default_snapshot_events() -> usize {
    20
}
const fn default_query_limit() -> usize {
    50
}
fn default_log_level() -> String {
    String::from("info")
}
fn default_observer_host() -> String {
    String::from("0.0.0.0")
}
const fn default_observer_port() -> u16 {
    3000
}
