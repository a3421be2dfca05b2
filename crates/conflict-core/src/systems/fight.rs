//! Fight Resolution
//!
//! The dice engine. Computes contextual modifiers for both sides, runs the
//! archetype escape checks, rolls the d20 contest, and applies the full
//! consequence pipeline: affinity damage, energy drain, moods, injuries,
//! memories, collateral damage, and the loser's retreat decision.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use conflict_events::{
    EngineEvent, FightRecord, InjuryKind, InjuryRecord, RelocationReason, Severity, HOUR,
    SECS_PER_DAY,
};

use crate::components::agent::{Agent, AgentId, Mood, Vitals};
use crate::components::social::{Memory, MemoryBank, RelationshipGraph};
use crate::components::world::{Zone, ZoneRegistry};
use crate::config::{CombatProfile, CombatProfiles, EscapeProfile};
use crate::error::EngineError;
use crate::events::EngineEvents;
use crate::limiter::RateLimiter;
use crate::narrative::{Narrator, PromptKind, PromptSpec};
use crate::Config;

use super::confrontation::FIGHT_ACTIVITY_KEY;
use super::injury::InjuryLedger;

/// Energy above this sharpens the modifier.
const HIGH_ENERGY: i32 = 70;
/// Energy below this dulls it; below `EXHAUSTED` dulls it further.
const TIRED: i32 = 20;
const EXHAUSTED: i32 = 10;
/// Patience below this adds the rage bonus.
const RAGE_PATIENCE: i32 = 20;
/// Affinity above this means pulling punches.
const PULLED_PUNCHES_AFFINITY: i32 = 60;
/// Affinity below this means genuine hatred.
const HATRED_AFFINITY: i32 = -50;
/// Energy below this adds the escape low-health bonus.
const ESCAPE_LOW_HEALTH: i32 = 30;

const RETREAT_WOUNDED_BONUS: f64 = 0.30;
const RETREAT_BEATDOWN_BONUS: f64 = 0.35;
const RETREAT_LOW_ENERGY_BONUS: f64 = 0.25;
const RETREAT_INJURED_BONUS: f64 = 0.20;

const MAX_WITNESSES: usize = 3;
const PARTICIPANT_MEMORY_DAYS: u64 = 7;
const WITNESS_MEMORY_DAYS: u64 = 3;

/// Resource: all resolved fights, settled or not.
#[derive(Resource, Debug, Default)]
pub struct FightLedger {
    pub records: Vec<FightRecord>,
}

impl FightLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FightRecord) {
        self.records.push(record);
    }

    pub fn unsettled_mut(&mut self) -> impl Iterator<Item = &mut FightRecord> {
        self.records.iter_mut().filter(|r| !r.settled)
    }
}

/// How a confrontation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FightOutcome {
    /// One side slipped away before the dice came out.
    Escaped { escapee: String, to: String },
    /// The contest ran to completion. Winner is `None` for a standoff.
    Resolved {
        severity: Severity,
        winner: Option<String>,
    },
}

/// Which participant a contest result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Aggressor,
    Defender,
}

/// Outcome of the raw d20 contest, before consequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contest {
    pub aggressor_roll: u32,
    pub defender_roll: u32,
    pub severity: Severity,
    pub winner: Option<Side>,
    pub critical_hit: bool,
    pub critical_fail: bool,
}

/// Combined d20 modifier for one combatant.
pub fn fight_modifier(
    profile: &CombatProfile,
    vitals: &Vitals,
    mood: Mood,
    affinity_to_opponent: i32,
    active_injuries: &[InjuryKind],
) -> i32 {
    let mut modifier = profile.power;

    if vitals.energy < EXHAUSTED {
        modifier -= 3;
    } else if vitals.energy < TIRED {
        modifier -= 2;
    } else if vitals.energy > HIGH_ENERGY {
        modifier += 1;
    }

    if vitals.patience < RAGE_PATIENCE {
        modifier += 1;
    }

    if mood.is_enraged() {
        modifier += 1;
    } else if mood == Mood::Defeated {
        modifier -= 2;
    }

    for kind in active_injuries {
        modifier -= match kind {
            InjuryKind::Wounded => 2,
            InjuryKind::Bruised | InjuryKind::Shaken => 1,
            InjuryKind::Humiliated => 0,
        };
    }

    if affinity_to_opponent > PULLED_PUNCHES_AFFINITY {
        modifier -= 3;
    } else if affinity_to_opponent < HATRED_AFFINITY {
        modifier += 1;
    }

    if profile.hardened {
        modifier += 1;
    }

    modifier
}

/// Escape probability for a configured archetype, capped at the profile's
/// declared maximum. The always-flees archetype ignores every bonus.
pub fn escape_chance(
    escape: &EscapeProfile,
    is_defender: bool,
    energy: i32,
    projected_beatdown: bool,
) -> f64 {
    if escape.always_flees {
        return EscapeProfile::ALWAYS_FLEES_CHANCE;
    }
    let mut chance = escape.base_chance;
    if is_defender {
        chance += escape.defender_bonus;
    }
    if energy < ESCAPE_LOW_HEALTH {
        chance += escape.low_health_bonus;
    }
    if projected_beatdown {
        chance += escape.beatdown_bonus;
    }
    chance.min(escape.max_chance)
}

/// The loser's probability of withdrawing to the recovery zone.
///
/// `carried_wound` and `prior_injuries` describe the loser's state before
/// this fight's own injuries were assigned.
pub fn retreat_chance(
    base: f64,
    severity: Severity,
    carried_wound: bool,
    energy: i32,
    prior_injuries: usize,
    cap: f64,
) -> f64 {
    let mut chance = base;
    if carried_wound || severity >= Severity::Fight {
        chance += RETREAT_WOUNDED_BONUS;
    }
    if severity == Severity::Beatdown {
        chance += RETREAT_BEATDOWN_BONUS;
    }
    if energy < TIRED {
        chance += RETREAT_LOW_ENERGY_BONUS;
    }
    if prior_injuries >= 2 {
        chance += RETREAT_INJURED_BONUS;
    }
    chance.min(cap)
}

/// Judges a contest from known rolls and modifiers. Fully deterministic;
/// all randomness stays in `roll_contest`.
pub fn judge_contest(
    aggressor_roll: u32,
    defender_roll: u32,
    aggressor_modifier: i32,
    defender_modifier: i32,
) -> Contest {
    let aggressor_total = aggressor_roll as i32 + aggressor_modifier;
    let defender_total = defender_roll as i32 + defender_modifier;

    let winner = match aggressor_total.cmp(&defender_total) {
        std::cmp::Ordering::Greater => Some(Side::Aggressor),
        std::cmp::Ordering::Less => Some(Side::Defender),
        std::cmp::Ordering::Equal => None,
    };

    let mut severity = Severity::from_margin(aggressor_total.abs_diff(defender_total));
    let natural_twenty = aggressor_roll == 20 || defender_roll == 20;
    let critical_hit = natural_twenty && severity != Severity::Standoff;
    if critical_hit {
        severity = severity.escalate();
    }

    // A natural 1 on the losing side is narrative color only
    let critical_fail = match winner {
        Some(Side::Aggressor) => defender_roll == 1,
        Some(Side::Defender) => aggressor_roll == 1,
        None => false,
    };

    Contest {
        aggressor_roll,
        defender_roll,
        severity,
        winner,
        critical_hit,
        critical_fail,
    }
}

fn roll_contest(rng: &mut SmallRng, aggressor_modifier: i32, defender_modifier: i32) -> Contest {
    let aggressor_roll = rng.gen_range(1..=20);
    let defender_roll = rng.gen_range(1..=20);
    judge_contest(aggressor_roll, defender_roll, aggressor_modifier, defender_modifier)
}

fn severity_importance(severity: Severity) -> f32 {
    match severity {
        Severity::Standoff => 0.4,
        Severity::Scuffle => 0.55,
        Severity::Fight => 0.7,
        Severity::Beatdown => 0.9,
    }
}

struct Combatant {
    zone: String,
    mood: Mood,
    vitals: Vitals,
}

fn snapshot(
    query: &Query<(&AgentId, &mut Zone, &mut Mood, &mut Vitals), With<Agent>>,
    id: &str,
) -> Option<Combatant> {
    query.iter().find(|(agent_id, _, _, _)| agent_id.0 == id).map(
        |(_, zone, mood, vitals)| Combatant {
            zone: zone.0.clone(),
            mood: *mood,
            vitals: *vitals,
        },
    )
}

/// Resolves one matured confrontation end to end.
///
/// Aborts only this pairing on missing profiles or agents; every applied
/// consequence goes through the shared stores so reruns see updated state.
#[allow(clippy::too_many_arguments)]
pub fn resolve_fight(
    aggressor: &str,
    defender: &str,
    reason: &str,
    query: &mut Query<(&AgentId, &mut Zone, &mut Mood, &mut Vitals), With<Agent>>,
    profiles: &CombatProfiles,
    zones: &ZoneRegistry,
    config: &Config,
    graph: &mut RelationshipGraph,
    injuries: &mut InjuryLedger,
    fights: &mut FightLedger,
    memories: &mut MemoryBank,
    limiter: &mut RateLimiter,
    narrator: &mut Narrator,
    events: &mut EngineEvents,
    rng: &mut SmallRng,
    now: u64,
) -> Result<FightOutcome, EngineError> {
    let agg_profile = profiles
        .get(aggressor)
        .ok_or_else(|| EngineError::MissingProfile(aggressor.to_string()))?
        .clone();
    let def_profile = profiles
        .get(defender)
        .ok_or_else(|| EngineError::MissingProfile(defender.to_string()))?
        .clone();
    if !agg_profile.can_fight {
        return Err(EngineError::CannotFight(aggressor.to_string()));
    }
    if !def_profile.can_fight {
        return Err(EngineError::CannotFight(defender.to_string()));
    }

    let agg = snapshot(query, aggressor)
        .ok_or_else(|| EngineError::MissingAgent(aggressor.to_string()))?;
    let def = snapshot(query, defender)
        .ok_or_else(|| EngineError::MissingAgent(defender.to_string()))?;
    let fight_zone = agg.zone.clone();

    let mut bystanders: Vec<String> = query
        .iter()
        .filter(|(id, zone, _, _)| {
            zone.0 == fight_zone && id.0 != aggressor && id.0 != defender
        })
        .map(|(id, _, _, _)| id.0.clone())
        .collect();
    bystanders.sort();

    let agg_injuries: Vec<InjuryKind> =
        injuries.active_for(aggressor).iter().map(|r| r.kind).collect();
    let def_injuries: Vec<InjuryKind> =
        injuries.active_for(defender).iter().map(|r| r.kind).collect();

    let agg_mod = fight_modifier(
        &agg_profile,
        &agg.vitals,
        agg.mood,
        graph.affinity(aggressor, defender),
        &agg_injuries,
    );
    let def_mod = fight_modifier(
        &def_profile,
        &def.vitals,
        def.mood,
        graph.affinity(defender, aggressor),
        &def_injuries,
    );

    // Escape checks run before any dice come out; the defender gets the
    // first chance to slip away.
    let attempts = [
        (defender, aggressor, &def_profile, def.vitals.energy, true, agg_mod - def_mod),
        (aggressor, defender, &agg_profile, agg.vitals.energy, false, def_mod - agg_mod),
    ];
    for (escapee, opponent, profile, energy, is_defender, projected_margin) in attempts {
        let Some(escape) = profile.escape.as_ref() else {
            continue;
        };
        let projected_beatdown = projected_margin >= config.fight.projected_margin_threshold;
        let chance = escape_chance(escape, is_defender, energy, projected_beatdown);
        if rng.gen::<f64>() >= chance {
            continue;
        }
        let key = format!("escape:{}", escapee);
        if !limiter.try_consume(&key, escape.max_per_day, escape.cooldown_hours * HOUR, now) {
            continue;
        }
        let Some(destination) = escape.safe_zones.choose(rng).cloned() else {
            continue;
        };
        return Ok(perform_escape(
            escapee,
            opponent,
            reason,
            &profile.style,
            &fight_zone,
            destination,
            query,
            config,
            graph,
            memories,
            limiter,
            narrator,
            events,
            now,
        ));
    }

    let contest = roll_contest(rng, agg_mod, def_mod);
    let severity = contest.severity;
    let winner: Option<String> = contest.winner.map(|side| match side {
        Side::Aggressor => aggressor.to_string(),
        Side::Defender => defender.to_string(),
    });

    let mut record = FightRecord::new(
        aggressor,
        defender,
        winner.clone(),
        severity,
        (contest.aggressor_roll, contest.defender_roll),
        (agg_mod, def_mod),
        now,
    );
    record.critical_hit = contest.critical_hit;
    record.critical_fail = contest.critical_fail;

    info!(
        aggressor,
        defender,
        aggressor_roll = contest.aggressor_roll,
        defender_roll = contest.defender_roll,
        aggressor_modifier = agg_mod,
        defender_modifier = def_mod,
        severity = severity.label(),
        winner = winner.as_deref().unwrap_or("none"),
        "fight resolved"
    );

    apply_consequences(
        &record,
        reason,
        &fight_zone,
        &bystanders,
        &loser_prior_injuries(&record, &agg_injuries, &def_injuries),
        query,
        profiles,
        zones,
        config,
        graph,
        injuries,
        memories,
        events,
        rng,
        now,
    );

    limiter.touch(FIGHT_ACTIVITY_KEY, now);
    events.push(EngineEvent::Notify {
        summary: match &winner {
            Some(w) => format!("{} vs {}: {} ({} won)", aggressor, defender, severity.label(), w),
            None => format!("{} vs {}: standoff", aggressor, defender),
        },
    });

    fights.push(record);
    Ok(FightOutcome::Resolved { severity, winner })
}

/// The loser's pre-fight injuries, for the retreat decision.
fn loser_prior_injuries(
    record: &FightRecord,
    agg_injuries: &[InjuryKind],
    def_injuries: &[InjuryKind],
) -> Vec<InjuryKind> {
    match record.loser() {
        Some(l) if l == record.aggressor => agg_injuries.to_vec(),
        Some(_) => def_injuries.to_vec(),
        None => Vec::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn perform_escape(
    escapee: &str,
    opponent: &str,
    reason: &str,
    style: &str,
    fight_zone: &str,
    destination: String,
    query: &mut Query<(&AgentId, &mut Zone, &mut Mood, &mut Vitals), With<Agent>>,
    config: &Config,
    graph: &mut RelationshipGraph,
    memories: &mut MemoryBank,
    limiter: &mut RateLimiter,
    narrator: &mut Narrator,
    events: &mut EngineEvents,
    now: u64,
) -> FightOutcome {
    let line = narrator.line(&PromptSpec {
        kind: PromptKind::Escape,
        character: escapee.to_string(),
        opponent: opponent.to_string(),
        reason: reason.to_string(),
        style: style.to_string(),
    });
    events.push(EngineEvent::emote(fight_zone, line));
    events.push(EngineEvent::Relocation {
        character: escapee.to_string(),
        from: fight_zone.to_string(),
        to: destination.clone(),
        reason: RelocationReason::Escape,
    });

    for (id, mut zone, _, mut vitals) in query.iter_mut() {
        if id.0 == escapee {
            zone.0 = destination.clone();
            vitals.adjust_energy(-config.fight.escape_energy_penalty);
        }
    }
    graph.apply_delta(opponent, escapee, -config.fight.escape_affinity_penalty);

    let expiry = now + PARTICIPANT_MEMORY_DAYS * SECS_PER_DAY;
    memories.add(
        escapee,
        Memory::new(
            format!("Slipped away before a fight with {} over {}.", opponent, reason),
            0.5,
            now,
        )
        .with_tags(&["conflict", "escape"])
        .with_related(&[opponent])
        .with_expiry(expiry),
    );
    memories.add(
        opponent,
        Memory::new(format!("{} bolted before the fight could start.", escapee), 0.4, now)
            .with_tags(&["conflict", "escape"])
            .with_related(&[escapee])
            .with_expiry(expiry),
    );

    limiter.touch(FIGHT_ACTIVITY_KEY, now);
    info!(escapee, opponent, to = %destination, "escaped a confrontation");

    FightOutcome::Escaped {
        escapee: escapee.to_string(),
        to: destination,
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_consequences(
    record: &FightRecord,
    reason: &str,
    fight_zone: &str,
    bystanders: &[String],
    loser_prior_injuries: &[InjuryKind],
    query: &mut Query<(&AgentId, &mut Zone, &mut Mood, &mut Vitals), With<Agent>>,
    profiles: &CombatProfiles,
    zones: &ZoneRegistry,
    config: &Config,
    graph: &mut RelationshipGraph,
    injuries: &mut InjuryLedger,
    memories: &mut MemoryBank,
    events: &mut EngineEvents,
    rng: &mut SmallRng,
    now: u64,
) {
    let aggressor = record.aggressor.as_str();
    let defender = record.defender.as_str();
    let severity = record.severity;
    let winner = record.winner.as_deref();
    let loser = record.loser().map(str::to_string);
    let aggressor_won = winner == Some(aggressor);

    // Affinity damage, doubled when an exclusive bond ties the pair
    let (agg_delta, def_delta) = match severity {
        Severity::Standoff => (-3, -3),
        Severity::Scuffle => (-2, -4),
        Severity::Fight => (-3, -6),
        Severity::Beatdown if aggressor_won => (-2, -8),
        Severity::Beatdown => (-8, -2),
    };
    let bond_multiplier = if graph.pair_has_exclusive_bond(aggressor, defender) { 2 } else { 1 };
    graph.apply_delta(aggressor, defender, agg_delta * bond_multiplier);
    graph.apply_delta(defender, aggressor, def_delta * bond_multiplier);

    let (agg_energy, def_energy) = match severity {
        Severity::Standoff => (-10, -10),
        Severity::Scuffle => (-15, -20),
        Severity::Fight => (-25, -25),
        Severity::Beatdown if aggressor_won => (-15, -35),
        Severity::Beatdown => (-35, -15),
    };

    let winner_mood = match severity {
        Severity::Beatdown => Mood::Cold,
        Severity::Fight => Mood::Fierce,
        _ => Mood::Agitated,
    };
    let loser_mood = match severity {
        Severity::Beatdown => Mood::Defeated,
        Severity::Fight => Mood::Hurt,
        _ => Mood::Upset,
    };

    let mut loser_energy_after = 0;
    for (id, _, mut mood, mut vitals) in query.iter_mut() {
        let (delta, is_winner) = if id.0 == aggressor {
            (agg_energy, aggressor_won)
        } else if id.0 == defender {
            (def_energy, winner == Some(defender))
        } else {
            continue;
        };
        vitals.adjust_energy(delta);
        *mood = match (severity, is_winner) {
            (Severity::Standoff, _) => Mood::Tense,
            (_, true) => winner_mood,
            (_, false) => loser_mood,
        };
        if loser.as_deref() == Some(id.0.as_str()) {
            loser_energy_after = vitals.energy;
        }
    }

    // Injury assignment
    let mut assign = |character: &str, kind: InjuryKind, description: String, severity_n: i32| {
        let source = if character == aggressor { defender } else { aggressor };
        injuries.push(InjuryRecord::new(
            character,
            kind,
            description,
            severity_n,
            source,
            Some(record.id),
            now,
        ));
    };
    match (severity, loser.as_deref()) {
        (Severity::Standoff, _) => {
            assign(aggressor, InjuryKind::Shaken, format!("shaken by a standoff with {}", defender), 1);
            assign(defender, InjuryKind::Shaken, format!("shaken by a standoff with {}", aggressor), 1);
        }
        (Severity::Scuffle, Some(l)) => {
            let w = winner.unwrap_or_default();
            assign(l, InjuryKind::Bruised, format!("bruised in a scuffle with {}", w), 1);
        }
        (Severity::Fight, Some(l)) => {
            let w = winner.unwrap_or_default();
            assign(w, InjuryKind::Bruised, format!("bruised in a fight with {}", l), 1);
            assign(l, InjuryKind::Wounded, format!("wounded in a fight with {}", w), 2);
        }
        (Severity::Beatdown, Some(l)) => {
            let w = winner.unwrap_or_default();
            assign(l, InjuryKind::Wounded, format!("beaten down by {}", w), 2);
            assign(l, InjuryKind::Humiliated, format!("humiliated in front of everyone by {}", w), 2);
        }
        _ => {}
    }

    // Memories for both sides and up to three witnesses
    let importance = severity_importance(severity);
    let expiry = now + PARTICIPANT_MEMORY_DAYS * SECS_PER_DAY;
    let participant_memory = |me: &str, other: &str| -> Memory {
        let content = match (winner, severity) {
            (_, Severity::Standoff) => {
                format!("Faced off with {} over {}; neither backed down.", other, reason)
            }
            (Some(w), _) if w == me => {
                format!("Beat {} in a {} over {}.", other, severity.label(), reason)
            }
            _ => format!("Lost a {} to {} over {}.", severity.label(), other, reason),
        };
        Memory::new(content, importance, now)
            .with_tags(&["conflict", "fight"])
            .with_related(&[other])
            .with_expiry(expiry)
    };
    memories.add(aggressor, participant_memory(aggressor, defender));
    memories.add(defender, participant_memory(defender, aggressor));
    for witness in bystanders.iter().take(MAX_WITNESSES) {
        memories.add(
            witness.as_str(),
            Memory::new(
                format!("Watched {} and {} come to blows in the {}.", aggressor, defender, fight_zone),
                importance * 0.5,
                now,
            )
            .with_tags(&["conflict", "witness"])
            .with_related(&[aggressor, defender])
            .with_expiry(now + WITNESS_MEMORY_DAYS * SECS_PER_DAY),
        );
    }

    events.push(EngineEvent::emote(
        fight_zone,
        match (severity, winner) {
            (Severity::Standoff, _) => format!(
                "{} and {} circle each other, trading words, until both back off.",
                aggressor, defender
            ),
            (_, Some(w)) => format!(
                "{} and {} come to blows over {} -- a {} that {} walks away from.",
                aggressor,
                defender,
                reason,
                severity.label(),
                w
            ),
            _ => format!("{} and {} come to blows over {}.", aggressor, defender, reason),
        },
    ));

    collateral_damage(
        record, fight_zone, bystanders, profiles, injuries, memories, events, rng, now,
    );

    // Retreat decision for the loser
    let Some(loser) = loser else {
        return;
    };
    let Some(profile) = profiles.get(&loser) else {
        return;
    };
    let carried_wound = loser_prior_injuries.contains(&InjuryKind::Wounded);
    let chance = retreat_chance(
        profile.retreat_affinity,
        severity,
        carried_wound,
        loser_energy_after,
        loser_prior_injuries.len(),
        config.fight.retreat_cap,
    );
    if rng.gen::<f64>() >= chance {
        return;
    }
    let Some(recovery) = zones.recovery_zone() else {
        return;
    };
    for (id, mut zone, _, _) in query.iter_mut() {
        if id.0 == loser {
            zone.0 = recovery.to_string();
        }
    }
    events.push(EngineEvent::Relocation {
        character: loser.clone(),
        from: fight_zone.to_string(),
        to: recovery.to_string(),
        reason: RelocationReason::Retreat,
    });
    memories.add(
        loser.as_str(),
        Memory::new(
            format!("Withdrew to the {} to lick wounds after losing.", recovery),
            0.5,
            now,
        )
        .with_tags(&["conflict", "retreat"])
        .with_expiry(now + WITNESS_MEMORY_DAYS * SECS_PER_DAY),
    );
    info!(loser = %loser, to = recovery, "loser retreated");
}

/// Bystanders of the protected class can catch a stray hit; wilder fights
/// make that more likely.
#[allow(clippy::too_many_arguments)]
fn collateral_damage(
    record: &FightRecord,
    fight_zone: &str,
    bystanders: &[String],
    profiles: &CombatProfiles,
    injuries: &mut InjuryLedger,
    memories: &mut MemoryBank,
    events: &mut EngineEvents,
    rng: &mut SmallRng,
    now: u64,
) {
    if record.severity == Severity::Standoff {
        return;
    }
    let protected: Vec<&String> = bystanders
        .iter()
        .filter(|id| profiles.get(id).is_some_and(|p| p.protected))
        .collect();
    if protected.is_empty() {
        return;
    }

    let difficulty = match record.severity {
        Severity::Beatdown => 12,
        Severity::Fight => 15,
        _ => 18,
    };
    let roll: u32 = rng.gen_range(1..=20);
    if roll < difficulty {
        return;
    }

    let Some(victim) = protected.choose(rng) else {
        return;
    };
    let culprit = if rng.gen_bool(0.5) {
        record.aggressor.as_str()
    } else {
        record.defender.as_str()
    };
    injuries.push(InjuryRecord::new(
        victim.as_str(),
        InjuryKind::Shaken,
        format!(
            "clipped in the crossfire between {} and {}",
            record.aggressor, record.defender
        ),
        1,
        culprit,
        Some(record.id),
        now,
    ));
    memories.add(
        victim.as_str(),
        Memory::new(
            format!("Caught a stray hit when {} and {} fought.", record.aggressor, record.defender),
            0.6,
            now,
        )
        .with_tags(&["conflict", "collateral"])
        .with_related(&[record.aggressor.as_str(), record.defender.as_str()])
        .with_expiry(now + PARTICIPANT_MEMORY_DAYS * SECS_PER_DAY),
    );
    events.push(EngineEvent::emote(
        fight_zone,
        format!("{} catches a stray hit and staggers back, shaken.", victim),
    ));
    info!(victim = %victim, culprit, "collateral damage");
}
