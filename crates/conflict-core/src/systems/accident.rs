//! Accident Generator
//!
//! Low-probability environmental mishaps, independent of any conflict.
//! A weighted table picks what happened; the victim is always a
//! protected-class character sharing a zone with someone else.

use bevy_ecs::prelude::*;
use conflict_events::{EngineEvent, InjuryKind, InjuryRecord, SECS_PER_DAY};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::components::agent::{Agent, AgentId};
use crate::components::social::{Memory, MemoryBank};
use crate::components::world::Zone;
use crate::config::{CombatProfiles, Config};
use crate::events::EngineEvents;
use crate::limiter::RateLimiter;
use crate::systems::injury::InjuryLedger;
use crate::{GameClock, SimRng};

/// Cooldown key shared by every accident, whatever the mishap.
pub const ACCIDENT_KEY: &str = "accident";

const ACCIDENT_MEMORY_DAYS: u64 = 3;

struct Mishap {
    source: &'static str,
    kind: InjuryKind,
    weight: u32,
    description: &'static str,
}

impl Mishap {
    fn narrative(&self, victim: &str) -> String {
        match self.source {
            "a loose shelf" => format!("A shelf gives way and catches {} on the way down.", victim),
            "a wet floor" => format!("{} skids on the wet floor and goes down hard.", victim),
            "a slamming door" => format!("A door bangs shut right into {}.", victim),
            _ => format!("A chair topples over onto {}.", victim),
        }
    }
}

const MISHAPS: &[Mishap] = &[
    Mishap {
        source: "a loose shelf",
        kind: InjuryKind::Bruised,
        weight: 3,
        description: "bruised by a falling shelf",
    },
    Mishap {
        source: "a wet floor",
        kind: InjuryKind::Bruised,
        weight: 3,
        description: "bruised in a fall on the wet floor",
    },
    Mishap {
        source: "a slamming door",
        kind: InjuryKind::Shaken,
        weight: 2,
        description: "rattled by a slamming door",
    },
    Mishap {
        source: "a toppling chair",
        kind: InjuryKind::Shaken,
        weight: 2,
        description: "rattled by a toppling chair",
    },
];

/// System: maybe inflict one environmental mishap.
#[allow(clippy::too_many_arguments)]
pub fn generate_accident(
    query: Query<(&AgentId, &Zone), With<Agent>>,
    mut injuries: ResMut<InjuryLedger>,
    mut memories: ResMut<MemoryBank>,
    mut limiter: ResMut<RateLimiter>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<EngineEvents>,
    profiles: Res<CombatProfiles>,
    config: Res<Config>,
    clock: Res<GameClock>,
) {
    if clock.tick % config.cadence.accident_every != 0 {
        return;
    }
    let now = clock.now;
    if limiter.in_cooldown(ACCIDENT_KEY, config.accident.cooldown_secs, now) {
        return;
    }
    if rng.0.gen::<f64>() >= config.accident.chance {
        return;
    }

    // Victims are protected characters who are not alone
    let occupants: Vec<(String, String)> = query
        .iter()
        .map(|(id, zone)| (id.0.clone(), zone.0.clone()))
        .collect();
    let mut candidates: Vec<&(String, String)> = occupants
        .iter()
        .filter(|(id, zone)| {
            profiles.get(id).is_some_and(|p| p.protected)
                && occupants.iter().any(|(other, z)| other != id && z == zone)
        })
        .collect();
    candidates.sort();
    let Some((victim, zone)) = candidates.choose(&mut rng.0) else {
        return;
    };

    let Ok(mishap) = MISHAPS.choose_weighted(&mut rng.0, |m| m.weight) else {
        return;
    };

    injuries.push(InjuryRecord::new(
        victim.as_str(),
        mishap.kind,
        mishap.description,
        1,
        mishap.source,
        None,
        now,
    ));
    memories.add(
        victim.as_str(),
        Memory::new(format!("Got hurt by {} today. Bad luck.", mishap.source), 0.4, now)
            .with_tags(&["accident"])
            .with_expiry(now + ACCIDENT_MEMORY_DAYS * SECS_PER_DAY),
    );
    events.push(EngineEvent::emote(zone, mishap.narrative(victim)));
    limiter.touch(ACCIDENT_KEY, now);

    info!(victim = %victim, source = mishap.source, "accident");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatProfile;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn protected_profile() -> CombatProfile {
        CombatProfile {
            can_fight: false,
            power: 0,
            style: "timid".to_string(),
            retreat_affinity: 0.5,
            hardened: false,
            protected: true,
            escape: None,
        }
    }

    fn world_with_chance(chance: f64, now: u64) -> World {
        let mut world = World::new();
        let mut config = Config::default();
        config.accident.chance = chance;
        world.insert_resource(config);
        world.insert_resource(InjuryLedger::new());
        world.insert_resource(MemoryBank::new());
        world.insert_resource(RateLimiter::new());
        world.insert_resource(SimRng(SmallRng::seed_from_u64(11)));
        world.insert_resource(EngineEvents::new());
        let mut profiles = CombatProfiles::new();
        profiles.insert("fern", protected_profile());
        world.insert_resource(profiles);
        let mut clock = GameClock::new();
        clock.now = now;
        world.insert_resource(clock);
        world
    }

    fn spawn(world: &mut World, id: &str, zone: &str) {
        world.spawn((Agent, AgentId(id.to_string()), Zone(zone.to_string())));
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(generate_accident);
        schedule.run(world);
    }

    #[test]
    fn test_accident_hits_protected_bystander() {
        let mut world = world_with_chance(1.0, 1_000);
        spawn(&mut world, "fern", "common_room");
        spawn(&mut world, "rex", "common_room");
        run(&mut world);

        let injuries = world.resource::<InjuryLedger>();
        assert_eq!(injuries.records.len(), 1);
        assert_eq!(injuries.records[0].character, "fern");
        assert!(injuries.records[0].fight_id.is_none());
        assert_eq!(world.resource::<EngineEvents>().events.len(), 1);
    }

    #[test]
    fn test_cooldown_blocks_back_to_back_accidents() {
        let mut world = world_with_chance(1.0, 1_000);
        spawn(&mut world, "fern", "common_room");
        spawn(&mut world, "rex", "common_room");
        run(&mut world);
        assert_eq!(world.resource::<InjuryLedger>().records.len(), 1);

        // Still inside the two-hour window
        world.resource_mut::<GameClock>().now = 2_000;
        run(&mut world);
        assert_eq!(world.resource::<InjuryLedger>().records.len(), 1);
    }

    #[test]
    fn test_lone_protected_character_is_safe() {
        let mut world = world_with_chance(1.0, 1_000);
        spawn(&mut world, "fern", "garden");
        spawn(&mut world, "rex", "yard");
        run(&mut world);
        assert!(world.resource::<InjuryLedger>().records.is_empty());
    }

    #[test]
    fn test_zero_chance_never_triggers() {
        let mut world = world_with_chance(0.0, 1_000);
        spawn(&mut world, "fern", "common_room");
        spawn(&mut world, "rex", "common_room");
        run(&mut world);
        assert!(world.resource::<InjuryLedger>().records.is_empty());
        assert!(!world
            .resource::<RateLimiter>()
            .in_cooldown(ACCIDENT_KEY, 7_200, 1_000));
    }
}
