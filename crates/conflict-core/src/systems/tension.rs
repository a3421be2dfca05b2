//! Tension Evaluation System
//!
//! Scores every unordered pair of conflict-capable characters sharing a
//! conflict-eligible zone and, when the highest score clears the
//! threshold, kicks off the two-phase confrontation protocol. Scoring is
//! fully deterministic; randomness enters only downstream.

use bevy_ecs::prelude::*;

use crate::components::agent::{Agent, AgentId, Vitals};
use crate::components::social::RelationshipGraph;
use crate::components::world::{Zone, ZoneRegistry};
use crate::config::{CombatProfiles, Config};
use crate::events::EngineEvents;
use crate::limiter::RateLimiter;
use crate::narrative::Narrator;
use crate::GameClock;

use super::confrontation::{initiate_confrontation, PendingConfrontations, FIGHT_ACTIVITY_KEY};

/// Mutual affinity at or below this is deep hostility.
const DEEP_HOSTILITY: i32 = -60;
/// Mutual affinity at or below this is open hostility.
const OPEN_HOSTILITY: i32 = -40;
/// Mutual affinity at or below this is simmering resentment.
const SIMMERING_RESENTMENT: i32 = -20;

const DEEP_HOSTILITY_SCORE: i32 = 8;
const OPEN_HOSTILITY_SCORE: i32 = 5;
const SIMMERING_SCORE: i32 = 3;
const JEALOUSY_SCORE: i32 = 4;
const LOW_PATIENCE_SCORE: i32 = 2;
const LOW_ENERGY_SCORE: i32 = 1;

const LOW_PATIENCE: i32 = 30;
const LOW_ENERGY: i32 = 20;

/// Deterministic tension score for one pair, with the dominant reason.
pub fn score_pair(
    a_id: &str,
    b_id: &str,
    a: &Vitals,
    b: &Vitals,
    graph: &RelationshipGraph,
) -> (i32, String) {
    let mut score = 0;
    let mut reason: Option<String> = None;

    let mutual = graph.mutual_affinity(a_id, b_id);
    if mutual <= DEEP_HOSTILITY {
        score += DEEP_HOSTILITY_SCORE;
        reason = Some("deep hostility".to_string());
    } else if mutual <= OPEN_HOSTILITY {
        score += OPEN_HOSTILITY_SCORE;
        reason = Some("open hostility".to_string());
    } else if mutual <= SIMMERING_RESENTMENT {
        score += SIMMERING_SCORE;
        reason = Some("simmering resentment".to_string());
    }

    if let Some(target) = jealousy_target(a_id, b_id, graph) {
        score += JEALOUSY_SCORE;
        if reason.is_none() {
            reason = Some(format!("rivalry over {}", target));
        }
    }

    if a.patience < LOW_PATIENCE || b.patience < LOW_PATIENCE {
        score += LOW_PATIENCE_SCORE;
    }
    if a.energy < LOW_ENERGY || b.energy < LOW_ENERGY {
        score += LOW_ENERGY_SCORE;
    }

    (score, reason.unwrap_or_else(|| "frayed nerves".to_string()))
}

/// Jealousy: one side holds an exclusive bond to a third party while the
/// other holds a rivalrous bond toward the same target.
fn jealousy_target<'a>(a: &str, b: &str, graph: &'a RelationshipGraph) -> Option<&'a str> {
    for target in graph.exclusive_targets(a) {
        if graph.is_rival_of(b, target) {
            return Some(target);
        }
    }
    for target in graph.exclusive_targets(b) {
        if graph.is_rival_of(a, target) {
            return Some(target);
        }
    }
    None
}

struct PairCandidate {
    id: String,
    zone: String,
    vitals: Vitals,
}

/// System: find the highest-tension co-located pair and, if it clears the
/// threshold, initiate a confrontation.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_tension(
    query: Query<(&AgentId, &Zone, &Vitals), With<Agent>>,
    graph: Res<RelationshipGraph>,
    profiles: Res<CombatProfiles>,
    zones: Res<ZoneRegistry>,
    config: Res<Config>,
    clock: Res<GameClock>,
    mut pending: ResMut<PendingConfrontations>,
    mut limiter: ResMut<RateLimiter>,
    mut narrator: ResMut<Narrator>,
    mut events: ResMut<EngineEvents>,
) {
    if clock.tick % config.cadence.tension_every != 0 {
        return;
    }
    // Quiet period while a recent confrontation is still playing out
    if limiter.in_cooldown(FIGHT_ACTIVITY_KEY, config.tension.activity_cooldown_secs, clock.now) {
        return;
    }

    let mut candidates: Vec<PairCandidate> = query
        .iter()
        .filter(|(id, zone, _)| profiles.can_fight(&id.0) && zones.conflict_eligible(&zone.0))
        .map(|(id, zone, vitals)| PairCandidate {
            id: id.0.clone(),
            zone: zone.0.clone(),
            vitals: *vitals,
        })
        .collect();
    // Stable ordering keeps pair selection reproducible across runs
    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    let mut best: Option<(i32, usize, usize, String)> = None;
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            if candidates[i].zone != candidates[j].zone {
                continue;
            }
            let (score, reason) = score_pair(
                &candidates[i].id,
                &candidates[j].id,
                &candidates[i].vitals,
                &candidates[j].vitals,
                &graph,
            );
            if best.as_ref().is_none_or(|(s, _, _, _)| score > *s) {
                best = Some((score, i, j, reason));
            }
        }
    }

    let Some((score, i, j, reason)) = best else {
        return;
    };
    if score < config.tension.threshold {
        return;
    }

    // The more hostile side starts it
    let (agg, def) = if graph.affinity(&candidates[i].id, &candidates[j].id)
        <= graph.affinity(&candidates[j].id, &candidates[i].id)
    {
        (i, j)
    } else {
        (j, i)
    };

    tracing::info!(
        aggressor = %candidates[agg].id,
        defender = %candidates[def].id,
        score,
        %reason,
        "tension threshold reached"
    );

    initiate_confrontation(
        &candidates[agg].id,
        &candidates[def].id,
        &candidates[agg].zone,
        score,
        &reason,
        &profiles,
        &clock,
        &mut pending,
        &mut limiter,
        &mut narrator,
        &mut events,
    );
}
