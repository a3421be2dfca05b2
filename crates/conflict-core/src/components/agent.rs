//! Agent Components
//!
//! Per-character state the engine reads and patches: identity, mood, and
//! the energy/patience vitals that feed tension scoring and fight math.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker component identifying an entity as a character.
#[derive(Component, Debug, Clone, Default)]
pub struct Agent;

/// Unique identifier for a character.
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

/// Coarse emotional state. Fights and settlements overwrite this; other
/// systems outside the engine may set any variant.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Furious,
    Hostile,
    Tense,
    Agitated,
    Fierce,
    Cold,
    Upset,
    Hurt,
    Defeated,
    Reflective,
}

impl Mood {
    /// Moods that sharpen a combatant's edge.
    pub fn is_enraged(self) -> bool {
        matches!(self, Mood::Furious | Mood::Hostile)
    }
}

/// Energy and patience, both clamped to 0..=100.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub energy: i32,
    pub patience: i32,
}

impl Vitals {
    pub fn new(energy: i32, patience: i32) -> Self {
        Self {
            energy: energy.clamp(0, 100),
            patience: patience.clamp(0, 100),
        }
    }

    /// Applies an energy delta, clamping to the valid range.
    pub fn adjust_energy(&mut self, delta: i32) {
        self.energy = (self.energy + delta).clamp(0, 100);
    }

    /// Applies a patience delta, clamping to the valid range.
    pub fn adjust_patience(&mut self, delta: i32) {
        self.patience = (self.patience + delta).clamp(0, 100);
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            energy: 100,
            patience: 100,
        }
    }
}
