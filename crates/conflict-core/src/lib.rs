//! Conflict-resolution engine for a shared-household agent simulation.
//!
//! Decides when accumulated hostility between co-located characters erupts
//! into a confrontation, resolves the fight with a d20 contest, applies the
//! persistent consequences (relationships, injuries, moods, relocation),
//! and later reconciles the record or lets it calcify into a grudge.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod limiter;
pub mod narrative;
pub mod setup;
pub mod systems;

pub use config::{CombatProfile, CombatProfiles, Config, EscapeProfile};
pub use error::EngineError;
pub use events::EngineEvents;

/// Seeded RNG resource; every dice roll and probability check in the
/// engine draws from this so runs are reproducible.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// Monotonic simulated clock, advanced by the runner each tick.
#[derive(Resource, Debug, Clone, Copy)]
pub struct GameClock {
    /// Simulated seconds since the start of the run.
    pub now: u64,
    /// Tick counter, used for cadence gating.
    pub tick: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self { now: 0, tick: 0 }
    }

    pub fn advance(&mut self, secs_per_tick: u64) {
        self.now += secs_per_tick;
        self.tick += 1;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}
