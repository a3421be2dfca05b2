//! Configuration System
//!
//! Loads tuning parameters and combat profiles from tuning.toml so the
//! engine can be adjusted without recompiling. Every knob has a default
//! matching the reference behavior.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::components::world::ZoneInfo;
use conflict_events::{HOUR, MINUTE};

/// Default tuning file path.
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure.
#[derive(Resource, Debug, Clone, Deserialize)]
pub struct Config {
    pub cadence: CadenceConfig,
    pub tension: TensionConfig,
    pub confrontation: ConfrontationConfig,
    pub fight: FightConfig,
    pub settlement: SettlementConfig,
    pub accident: AccidentConfig,
    /// Static combat profiles keyed by character id. Characters without
    /// a profile cannot fight.
    #[serde(default)]
    pub profiles: HashMap<String, CombatProfile>,
    /// Zone attributes keyed by zone id.
    #[serde(default)]
    pub zones: HashMap<String, ZoneInfo>,
}

/// How often each subsystem runs, in ticks. Pending resolution runs every
/// tick regardless.
#[derive(Debug, Clone, Deserialize)]
pub struct CadenceConfig {
    pub tension_every: u64,
    pub heal_every: u64,
    pub settle_every: u64,
    pub accident_every: u64,
}

/// Tension evaluation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TensionConfig {
    /// Minimum pair score before a confrontation is initiated.
    pub threshold: i32,
    /// Global quiet period after any fight activity.
    pub activity_cooldown_secs: u64,
}

/// Two-phase confrontation timing.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfrontationConfig {
    /// Pending records younger than this are not yet mature.
    pub resolve_delay_secs: u64,
    /// Pending records older than this are discarded as abandoned.
    pub stale_after_secs: u64,
}

/// Fight resolution parameters not fixed by the dice tables.
#[derive(Debug, Clone, Deserialize)]
pub struct FightConfig {
    /// Energy cost of a successful escape.
    pub escape_energy_penalty: i32,
    /// Affinity the opponent loses toward the escapee.
    pub escape_affinity_penalty: i32,
    /// Modifier gap treated as a likely beatdown for escape scoring.
    pub projected_margin_threshold: i32,
    /// Hard ceiling on the loser's retreat probability.
    pub retreat_cap: f64,
}

/// Settlement and grudge-formation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Fights younger than this are not examined.
    pub min_age_secs: u64,
    pub base_chance: f64,
    /// Applied when a mediator is co-located with both parties.
    pub mediator_multiplier: f64,
    /// Affinity a mediator must hold toward both parties.
    pub mediator_affinity: i32,
    /// Both parties need more energy than this to talk it out.
    pub energy_floor: i32,
    /// Failed attempts before the record calcifies into a grudge.
    pub max_attempts: u32,
    /// Affinity each party gains on reconciliation.
    pub affinity_bonus: i32,
}

/// Environmental accident parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct AccidentConfig {
    pub cooldown_secs: u64,
    /// Per-evaluation trigger probability once off cooldown.
    pub chance: f64,
}

/// Archetype-specific escape mechanics, present only for configured
/// characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscapeProfile {
    pub base_chance: f64,
    /// Added when the character is the defender.
    pub defender_bonus: f64,
    /// Added below 30 energy.
    pub low_health_bonus: f64,
    /// Added when the projected margin suggests a beatdown.
    pub beatdown_bonus: f64,
    /// Ceiling on the combined chance.
    pub max_chance: f64,
    pub cooldown_hours: u64,
    pub max_per_day: u32,
    /// Zones the character may flee to.
    pub safe_zones: Vec<String>,
    /// Always-retreats archetype: fixed 0.90 chance, ignores the bonuses.
    #[serde(default)]
    pub always_flees: bool,
}

impl EscapeProfile {
    /// Fixed chance used by the always-retreats archetype.
    pub const ALWAYS_FLEES_CHANCE: f64 = 0.90;
}

/// Static per-character combat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatProfile {
    pub can_fight: bool,
    /// Base dice modifier.
    pub power: i32,
    /// Fighting-style descriptor; selects fallback narration.
    pub style: String,
    /// Base probability of fleeing when losing.
    pub retreat_affinity: f64,
    /// Qualifying persistent trait: +1 to the fight modifier.
    #[serde(default)]
    pub hardened: bool,
    /// Protected class: collateral-damage and accident victims only.
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub escape: Option<EscapeProfile>,
}

/// Resource: combat profile lookup by character id.
#[derive(Resource, Debug, Default)]
pub struct CombatProfiles {
    profiles: HashMap<String, CombatProfile>,
}

impl CombatProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(profiles: HashMap<String, CombatProfile>) -> Self {
        Self { profiles }
    }

    pub fn insert(&mut self, id: impl Into<String>, profile: CombatProfile) {
        self.profiles.insert(id.into(), profile);
    }

    pub fn get(&self, id: &str) -> Option<&CombatProfile> {
        self.profiles.get(id)
    }

    /// True only for characters with a profile that allows fighting.
    pub fn can_fight(&self, id: &str) -> bool {
        self.get(id).is_some_and(|p| p.can_fight)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from the default path, or use defaults if not
    /// found.
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            tracing::warn!("could not load {}: {}; using defaults", DEFAULT_TUNING_PATH, e);
            Self::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cadence: CadenceConfig {
                tension_every: 3,
                heal_every: 6,
                settle_every: 6,
                accident_every: 10,
            },
            tension: TensionConfig {
                threshold: 10,
                activity_cooldown_secs: 5 * MINUTE,
            },
            confrontation: ConfrontationConfig {
                resolve_delay_secs: 45,
                stale_after_secs: 10 * MINUTE,
            },
            fight: FightConfig {
                escape_energy_penalty: 5,
                escape_affinity_penalty: 2,
                projected_margin_threshold: 5,
                retreat_cap: 0.95,
            },
            settlement: SettlementConfig {
                min_age_secs: 2 * HOUR,
                base_chance: 0.20,
                mediator_multiplier: 2.0,
                mediator_affinity: 50,
                energy_floor: 40,
                max_attempts: 3,
                affinity_bonus: 5,
            },
            accident: AccidentConfig {
                cooldown_secs: 2 * HOUR,
                chance: 0.04,
            },
            profiles: HashMap::new(),
            zones: HashMap::new(),
        }
    }
}

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
