//! Two-Phase Confrontation Protocol
//!
//! A confrontation begins as a provocation posted to the zone channel and
//! a pending record. Resolution happens on a later tick, once the fixed
//! delay has elapsed; records that sit unresolved past the stale window
//! are treated as abandoned and discarded.

use bevy_ecs::prelude::*;
use conflict_events::{EngineEvent, PendingConfrontation};
use tracing::{info, warn};

use crate::components::agent::{Agent, AgentId, Mood, Vitals};
use crate::components::social::{MemoryBank, RelationshipGraph};
use crate::components::world::{Zone, ZoneRegistry};
use crate::config::{CombatProfiles, Config};
use crate::events::EngineEvents;
use crate::limiter::RateLimiter;
use crate::narrative::{Narrator, PromptKind, PromptSpec};
use crate::{GameClock, SimRng};

use super::fight::{self, FightLedger};
use super::injury::InjuryLedger;

/// Cooldown marker refreshed by any fight activity; the tension evaluator
/// stays quiet while it is fresh.
pub const FIGHT_ACTIVITY_KEY: &str = "fight_activity";

/// Resource: pending confrontations awaiting their resolution delay.
///
/// Invariant: at most one record per unordered pair.
#[derive(Resource, Debug, Default)]
pub struct PendingConfrontations {
    pub records: Vec<PendingConfrontation>,
}

impl PendingConfrontations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pair(&self, a: &str, b: &str) -> bool {
        self.records.iter().any(|r| r.involves(a, b))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Begins the provocation phase for a pair. No-op if the pair already has
/// a pending confrontation.
#[allow(clippy::too_many_arguments)]
pub fn initiate_confrontation(
    aggressor: &str,
    defender: &str,
    zone: &str,
    tension: i32,
    reason: &str,
    profiles: &CombatProfiles,
    clock: &GameClock,
    pending: &mut PendingConfrontations,
    limiter: &mut RateLimiter,
    narrator: &mut Narrator,
    events: &mut EngineEvents,
) {
    if pending.has_pair(aggressor, defender) {
        return;
    }

    let style = profiles
        .get(aggressor)
        .map(|p| p.style.clone())
        .unwrap_or_default();
    let line = narrator.line(&PromptSpec {
        kind: PromptKind::Provocation,
        character: aggressor.to_string(),
        opponent: defender.to_string(),
        reason: reason.to_string(),
        style,
    });
    events.push(EngineEvent::emote(zone, line));

    pending
        .records
        .push(PendingConfrontation::new(aggressor, defender, reason, tension, clock.now));
    // Keep the evaluator from re-triggering while resolution is pending
    limiter.touch(FIGHT_ACTIVITY_KEY, clock.now);

    info!(aggressor, defender, tension, reason, "confrontation initiated");
}

/// System: mature pending confrontations into fights.
///
/// Each record is removed from the ledger before its resolution is
/// attempted, so a failing resolution can never run twice.
#[allow(clippy::too_many_arguments)]
pub fn resolve_pending(
    mut query: Query<(&AgentId, &mut Zone, &mut Mood, &mut Vitals), With<Agent>>,
    mut pending: ResMut<PendingConfrontations>,
    mut fights: ResMut<FightLedger>,
    mut injuries: ResMut<InjuryLedger>,
    mut graph: ResMut<RelationshipGraph>,
    mut memories: ResMut<MemoryBank>,
    mut limiter: ResMut<RateLimiter>,
    mut rng: ResMut<SimRng>,
    mut narrator: ResMut<Narrator>,
    mut events: ResMut<EngineEvents>,
    profiles: Res<CombatProfiles>,
    zones: Res<ZoneRegistry>,
    config: Res<Config>,
    clock: Res<GameClock>,
) {
    let now = clock.now;
    let delay = config.confrontation.resolve_delay_secs;
    let stale = config.confrontation.stale_after_secs;

    let mut mature = Vec::new();
    pending.records.retain(|record| {
        let age = now.saturating_sub(record.created_at);
        if age < delay {
            return true;
        }
        if age > stale {
            warn!(
                aggressor = %record.aggressor,
                defender = %record.defender,
                age,
                "discarding stale confrontation"
            );
            return false;
        }
        mature.push(record.clone());
        false
    });

    for record in mature {
        match fight::resolve_fight(
            &record.aggressor,
            &record.defender,
            &record.reason,
            &mut query,
            &profiles,
            &zones,
            &config,
            &mut graph,
            &mut injuries,
            &mut fights,
            &mut memories,
            &mut limiter,
            &mut narrator,
            &mut events,
            &mut rng.0,
            now,
        ) {
            Ok(outcome) => {
                info!(
                    aggressor = %record.aggressor,
                    defender = %record.defender,
                    ?outcome,
                    "confrontation resolved"
                );
            }
            Err(e) => {
                // The pending record is already gone; only this pairing
                // is abandoned.
                warn!(
                    aggressor = %record.aggressor,
                    defender = %record.defender,
                    "confrontation aborted: {}",
                    e
                );
            }
        }
    }
}
