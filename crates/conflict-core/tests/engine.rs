//! Engine integration tests
//!
//! End-to-end runs of the full schedule against the demo cast: the
//! two-phase confrontation protocol, escapes, healing, and the stale
//! pending path.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use conflict_core::components::agent::{AgentId, Mood, Vitals};
use conflict_core::components::social::{MemoryBank, RelationshipGraph};
use conflict_core::components::world::{Zone, ZoneRegistry};
use conflict_core::config::CombatProfiles;
use conflict_core::limiter::RateLimiter;
use conflict_core::narrative::Narrator;
use conflict_core::setup;
use conflict_core::systems::{
    evaluate_tension, generate_accident, heal_injuries, resolve_pending, settle_fights,
    FightLedger, InjuryLedger, PendingConfrontations,
};
use conflict_core::{Config, EngineEvents, EscapeProfile, GameClock, SimRng};
use conflict_events::{
    EngineEvent, InjuryKind, InjuryRecord, PendingConfrontation, RelocationReason, HOUR,
};

const TICK_SECS: u64 = 60;

fn build_world(seed: u64) -> World {
    let mut world = World::new();
    world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
    world.insert_resource(GameClock::new());
    world.insert_resource(Config::default());
    world.insert_resource(CombatProfiles::from_map(setup::demo_profiles()));
    let mut zones = ZoneRegistry::new();
    for (id, info) in setup::demo_zones() {
        zones.register(id, info);
    }
    world.insert_resource(zones);
    world.insert_resource(setup::demo_relationships());
    world.insert_resource(MemoryBank::new());
    world.insert_resource(RateLimiter::new());
    world.insert_resource(Narrator::without_generator());
    world.insert_resource(EngineEvents::new());
    world.insert_resource(PendingConfrontations::new());
    world.insert_resource(FightLedger::new());
    world.insert_resource(InjuryLedger::new());
    setup::spawn_demo_cast(&mut world);
    world
}

fn full_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            evaluate_tension,
            resolve_pending,
            heal_injuries,
            settle_fights,
            generate_accident,
        )
            .chain(),
    );
    schedule
}

fn agent_state(world: &mut World, id: &str) -> (String, Mood, Vitals) {
    let mut query = world.query::<(&AgentId, &Zone, &Mood, &Vitals)>();
    query
        .iter(world)
        .find(|(agent_id, _, _, _)| agent_id.0 == id)
        .map(|(_, zone, mood, vitals)| (zone.0.clone(), *mood, *vitals))
        .expect("agent should exist")
}

#[test]
fn test_provocation_waits_for_the_resolution_delay() {
    let mut world = build_world(42);
    let mut schedule = full_schedule();

    // Tick 0: the feuding pair crosses the threshold and a provocation
    // is posted, but the dice stay in the cup.
    schedule.run(&mut world);
    assert_eq!(world.resource::<PendingConfrontations>().len(), 1);
    let record = &world.resource::<PendingConfrontations>().records[0];
    assert_eq!(record.aggressor, "rex");
    assert_eq!(record.defender, "vex");
    assert!(world.resource::<FightLedger>().records.is_empty());

    let events = world.resource_mut::<EngineEvents>().drain();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, EngineEvent::ZonePost { zone, .. } if zone == "yard")),
        "provocation should be posted to the fight zone"
    );

    // One minute later the confrontation matures into a fight
    world.resource_mut::<GameClock>().advance(TICK_SECS);
    schedule.run(&mut world);

    assert!(world.resource::<PendingConfrontations>().is_empty());
    let fights = world.resource::<FightLedger>();
    assert_eq!(fights.records.len(), 1);
    let fight = &fights.records[0];
    assert_eq!(fight.aggressor, "rex");
    assert_eq!(fight.defender, "vex");
    assert!(!fight.settled);
    assert_eq!(fight.settlement_attempts, 0);

    // Consequences landed: the feud deepened and both moods shifted
    let graph = world.resource::<RelationshipGraph>();
    assert!(graph.affinity("rex", "vex") < -70);
    assert!(graph.affinity("vex", "rex") < -60);
    let (_, rex_mood, rex_vitals) = agent_state(&mut world, "rex");
    let (_, vex_mood, _) = agent_state(&mut world, "vex");
    assert_ne!(rex_mood, Mood::Neutral);
    assert_ne!(vex_mood, Mood::Neutral);
    assert!(rex_vitals.energy < 85);
}

#[test]
fn test_stale_pending_confrontation_is_discarded() {
    let mut world = build_world(42);
    let mut schedule = full_schedule();

    world
        .resource_mut::<PendingConfrontations>()
        .records
        .push(PendingConfrontation::new("rex", "vex", "deep hostility", 10, 0));
    world.resource_mut::<GameClock>().now = 700;

    schedule.run(&mut world);

    // Past the ten-minute window: abandoned, never resolved
    assert!(world.resource::<PendingConfrontations>().is_empty());
    assert!(world.resource::<FightLedger>().records.is_empty());
}

#[test]
fn test_certain_escape_skips_the_fight() {
    let mut world = build_world(42);
    let mut schedule = full_schedule();

    let mut vex = world
        .resource::<CombatProfiles>()
        .get("vex")
        .expect("demo profile")
        .clone();
    vex.escape = Some(EscapeProfile {
        base_chance: 1.0,
        defender_bonus: 0.0,
        low_health_bonus: 0.0,
        beatdown_bonus: 0.0,
        max_chance: 1.0,
        cooldown_hours: 0,
        max_per_day: 5,
        safe_zones: vec!["garden".to_string()],
        always_flees: false,
    });
    world.resource_mut::<CombatProfiles>().insert("vex", vex);

    world
        .resource_mut::<PendingConfrontations>()
        .records
        .push(PendingConfrontation::new("rex", "vex", "deep hostility", 10, 0));
    world.resource_mut::<GameClock>().now = 60;

    schedule.run(&mut world);

    assert!(world.resource::<FightLedger>().records.is_empty());
    let (zone, _, vitals) = agent_state(&mut world, "vex");
    assert_eq!(zone, "garden");
    assert_eq!(vitals.energy, 70, "escape costs five energy");
    assert_eq!(world.resource::<RelationshipGraph>().affinity("rex", "vex"), -72);

    let events = world.resource_mut::<EngineEvents>().drain();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::Relocation {
            character,
            to,
            reason: RelocationReason::Escape,
            ..
        } if character == "vex" && to == "garden"
    )));
}

#[test]
fn test_escape_cap_exhausted_means_the_fight_happens() {
    let mut world = build_world(42);
    let mut schedule = full_schedule();

    let mut vex = world
        .resource::<CombatProfiles>()
        .get("vex")
        .expect("demo profile")
        .clone();
    vex.escape = Some(EscapeProfile {
        base_chance: 1.0,
        defender_bonus: 0.0,
        low_health_bonus: 0.0,
        beatdown_bonus: 0.0,
        max_chance: 1.0,
        cooldown_hours: 0,
        max_per_day: 0,
        safe_zones: vec!["garden".to_string()],
        always_flees: false,
    });
    world.resource_mut::<CombatProfiles>().insert("vex", vex);

    world
        .resource_mut::<PendingConfrontations>()
        .records
        .push(PendingConfrontation::new("rex", "vex", "deep hostility", 10, 0));
    world.resource_mut::<GameClock>().now = 60;

    schedule.run(&mut world);

    assert_eq!(world.resource::<FightLedger>().records.len(), 1);
}

#[test]
fn test_heal_system_respects_cadence_and_deadline() {
    let mut world = build_world(42);
    let mut schedule = Schedule::default();
    schedule.add_systems(heal_injuries);

    world.resource_mut::<InjuryLedger>().push(InjuryRecord::new(
        "rex",
        InjuryKind::Shaken,
        "rattled",
        1,
        "vex",
        None,
        0,
    ));

    // Off-cadence tick: nothing heals even though the deadline passed
    {
        let mut clock = world.resource_mut::<GameClock>();
        clock.now = 7 * HOUR;
        clock.tick = 1;
    }
    schedule.run(&mut world);
    assert!(world.resource::<InjuryLedger>().records[0].active);

    // On-cadence tick: the six-hour shaken injury heals
    world.resource_mut::<GameClock>().tick = 6;
    schedule.run(&mut world);
    assert!(!world.resource::<InjuryLedger>().records[0].active);
}

#[test]
fn test_activity_cooldown_quiets_the_evaluator() {
    let mut world = build_world(42);
    let mut schedule = full_schedule();

    schedule.run(&mut world);
    assert_eq!(world.resource::<PendingConfrontations>().len(), 1);
    world.resource_mut::<PendingConfrontations>().records.clear();

    // Two more evaluator-cadence ticks inside the five-minute quiet
    // period: no new confrontation starts
    for _ in 0..6 {
        world.resource_mut::<GameClock>().advance(30);
        schedule.run(&mut world);
    }
    assert!(world.resource::<PendingConfrontations>().is_empty());
}
