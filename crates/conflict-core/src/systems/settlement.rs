//! Settlement Engine
//!
//! Re-examines unsettled fights once they are old enough. Reconciliation
//! is probabilistic, boosted when a mediator is nearby; three failed
//! attempts calcify the record into a permanent grudge.

use bevy_ecs::prelude::*;
use conflict_events::{EngineEvent, SettlementKind, SECS_PER_DAY};
use rand::Rng;
use std::collections::HashMap;
use tracing::info;

use crate::components::agent::{Agent, AgentId, Mood, Vitals};
use crate::components::social::{Memory, MemoryBank, RelationshipGraph};
use crate::components::world::Zone;
use crate::config::Config;
use crate::events::EngineEvents;
use crate::systems::fight::FightLedger;
use crate::{GameClock, SimRng};

const RECONCILED_MEMORY_DAYS: u64 = 14;

/// System: attempt reconciliation for every eligible unsettled fight.
///
/// Each failed evaluation increments the attempt counter by exactly one;
/// skipped records (too young, parties apart, too drained) are not
/// counted as attempts.
#[allow(clippy::too_many_arguments)]
pub fn settle_fights(
    mut query: Query<(&AgentId, &Zone, &mut Mood, &Vitals), With<Agent>>,
    mut fights: ResMut<FightLedger>,
    mut graph: ResMut<RelationshipGraph>,
    mut memories: ResMut<MemoryBank>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<EngineEvents>,
    config: Res<Config>,
    clock: Res<GameClock>,
) {
    if clock.tick % config.cadence.settle_every != 0 {
        return;
    }
    let now = clock.now;
    let settings = &config.settlement;

    let whereabouts: HashMap<String, (String, i32)> = query
        .iter()
        .map(|(id, zone, _, vitals)| (id.0.clone(), (zone.0.clone(), vitals.energy)))
        .collect();

    let mut reconciled: Vec<(String, String)> = Vec::new();
    for record in fights.unsettled_mut() {
        if now.saturating_sub(record.occurred_at) < settings.min_age_secs {
            continue;
        }
        let a = record.aggressor.clone();
        let b = record.defender.clone();

        if record.settlement_attempts >= settings.max_attempts {
            record.settled = true;
            record.settlement = Some(SettlementKind::Grudge);
            let grudge = |other: &str| {
                Memory::new(
                    format!("Will never forgive {} for that {}.", other, record.severity.label()),
                    1.0,
                    now,
                )
                .with_tags(&["conflict", "grudge"])
                .with_related(&[other])
                .pinned()
            };
            memories.add(a.as_str(), grudge(&b));
            memories.add(b.as_str(), grudge(&a));
            events.push(EngineEvent::Notify {
                summary: format!("{} and {} have settled into a grudge", a, b),
            });
            info!(aggressor = %a, defender = %b, "grudge formed");
            continue;
        }

        let (Some((zone_a, energy_a)), Some((zone_b, energy_b))) =
            (whereabouts.get(&a), whereabouts.get(&b))
        else {
            continue;
        };
        if zone_a != zone_b || *energy_a <= settings.energy_floor || *energy_b <= settings.energy_floor
        {
            continue;
        }

        let mediator = whereabouts.iter().find(|(id, (zone, _))| {
            **id != a
                && **id != b
                && zone == zone_a
                && graph.affinity(id, &a) >= settings.mediator_affinity
                && graph.affinity(id, &b) >= settings.mediator_affinity
        });
        let chance = if mediator.is_some() {
            settings.base_chance * settings.mediator_multiplier
        } else {
            settings.base_chance
        };

        if rng.0.gen::<f64>() < chance {
            record.settled = true;
            record.settlement = Some(SettlementKind::Reconciliation);
            graph.apply_delta(&a, &b, settings.affinity_bonus);
            graph.apply_delta(&b, &a, settings.affinity_bonus);
            let peace = |other: &str| {
                Memory::new(
                    format!("Talked things through with {} and let the {} go.", other, record.severity.label()),
                    0.6,
                    now,
                )
                .with_tags(&["conflict", "reconciliation"])
                .with_related(&[other])
                .with_expiry(now + RECONCILED_MEMORY_DAYS * SECS_PER_DAY)
            };
            memories.add(a.as_str(), peace(&b));
            memories.add(b.as_str(), peace(&a));
            events.push(EngineEvent::emote(
                zone_a,
                format!("{} and {} talk quietly for a while, and something eases.", a, b),
            ));
            reconciled.push((a.clone(), b.clone()));
            info!(
                aggressor = %a,
                defender = %b,
                mediated = mediator.is_some(),
                "fight reconciled"
            );
        } else {
            record.settlement_attempts += 1;
            info!(
                aggressor = %a,
                defender = %b,
                attempts = record.settlement_attempts,
                "settlement attempt failed"
            );
        }
    }

    for (a, b) in reconciled {
        for (id, _, mut mood, _) in query.iter_mut() {
            if id.0 == a || id.0 == b {
                *mood = Mood::Reflective;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflict_events::{FightRecord, Severity, HOUR};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn world_with(config: Config, fights: Vec<FightRecord>, now: u64) -> World {
        let mut world = World::new();
        world.insert_resource(config);
        world.insert_resource(FightLedger { records: fights });
        world.insert_resource(RelationshipGraph::new());
        world.insert_resource(MemoryBank::new());
        world.insert_resource(SimRng(SmallRng::seed_from_u64(7)));
        world.insert_resource(EngineEvents::new());
        let mut clock = GameClock::new();
        clock.now = now;
        world.insert_resource(clock);
        world
    }

    fn spawn(world: &mut World, id: &str, zone: &str, energy: i32) {
        world.spawn((
            Agent,
            AgentId(id.to_string()),
            Zone(zone.to_string()),
            Mood::Neutral,
            Vitals::new(energy, 80),
        ));
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(settle_fights);
        schedule.run(world);
    }

    fn fight(now: u64, attempts: u32) -> FightRecord {
        let mut record = FightRecord::new(
            "rex",
            "vex",
            Some("rex".to_string()),
            Severity::Fight,
            (15, 8),
            (2, 0),
            now,
        );
        record.settlement_attempts = attempts;
        record
    }

    #[test]
    fn test_young_record_skipped() {
        let now = 3 * HOUR;
        // Occurred one hour ago; the two-hour minimum age is not met
        let mut world = world_with(Config::default(), vec![fight(now - HOUR, 0)], now);
        spawn(&mut world, "rex", "yard", 80);
        spawn(&mut world, "vex", "yard", 80);
        run(&mut world);

        let ledger = world.resource::<FightLedger>();
        assert!(!ledger.records[0].settled);
        assert_eq!(ledger.records[0].settlement_attempts, 0);
    }

    #[test]
    fn test_failed_attempt_increments_exactly_once() {
        let mut config = Config::default();
        config.settlement.base_chance = 0.0;
        let now = 10 * HOUR;
        let mut world = world_with(config, vec![fight(now - 3 * HOUR, 0)], now);
        spawn(&mut world, "rex", "yard", 80);
        spawn(&mut world, "vex", "yard", 80);
        run(&mut world);

        let ledger = world.resource::<FightLedger>();
        assert!(!ledger.records[0].settled);
        assert_eq!(ledger.records[0].settlement_attempts, 1);
    }

    #[test]
    fn test_apart_or_drained_parties_are_skipped_without_attempt() {
        let mut config = Config::default();
        config.settlement.base_chance = 1.0;
        let now = 10 * HOUR;
        let mut world = world_with(config, vec![fight(now - 3 * HOUR, 0)], now);
        spawn(&mut world, "rex", "yard", 80);
        spawn(&mut world, "vex", "garden", 80);
        run(&mut world);
        assert_eq!(world.resource::<FightLedger>().records[0].settlement_attempts, 0);

        let mut config = Config::default();
        config.settlement.base_chance = 1.0;
        let mut world = world_with(config, vec![fight(now - 3 * HOUR, 0)], now);
        spawn(&mut world, "rex", "yard", 80);
        spawn(&mut world, "vex", "yard", 30);
        run(&mut world);
        let record = &world.resource::<FightLedger>().records[0];
        assert!(!record.settled);
        assert_eq!(record.settlement_attempts, 0);
    }

    #[test]
    fn test_reconciliation_applies_bonus_and_moods() {
        let mut config = Config::default();
        config.settlement.base_chance = 1.0;
        let now = 10 * HOUR;
        let mut world = world_with(config, vec![fight(now - 3 * HOUR, 0)], now);
        spawn(&mut world, "rex", "yard", 80);
        spawn(&mut world, "vex", "yard", 80);
        run(&mut world);

        let record = &world.resource::<FightLedger>().records[0];
        assert!(record.settled);
        assert_eq!(record.settlement, Some(SettlementKind::Reconciliation));
        let graph = world.resource::<RelationshipGraph>();
        assert_eq!(graph.affinity("rex", "vex"), 5);
        assert_eq!(graph.affinity("vex", "rex"), 5);

        let mut moods = world.query::<&Mood>();
        for mood in moods.iter(&world) {
            assert_eq!(*mood, Mood::Reflective);
        }
    }

    #[test]
    fn test_mediator_doubles_chance() {
        // Base 0.5 with a x2 mediator makes reconciliation certain
        let mut config = Config::default();
        config.settlement.base_chance = 0.5;
        let now = 10 * HOUR;
        let mut world = world_with(config, vec![fight(now - 3 * HOUR, 0)], now);
        spawn(&mut world, "rex", "yard", 80);
        spawn(&mut world, "vex", "yard", 80);
        spawn(&mut world, "sage", "yard", 80);
        {
            let mut graph = world.resource_mut::<RelationshipGraph>();
            graph.apply_delta("sage", "rex", 60);
            graph.apply_delta("sage", "vex", 60);
        }
        run(&mut world);

        let record = &world.resource::<FightLedger>().records[0];
        assert!(record.settled);
        assert_eq!(record.settlement, Some(SettlementKind::Reconciliation));
    }

    #[test]
    fn test_grudge_after_max_attempts() {
        let now = 10 * HOUR;
        let mut world = world_with(Config::default(), vec![fight(now - 3 * HOUR, 3)], now);
        // Parties are apart; the grudge check runs before co-location
        spawn(&mut world, "rex", "yard", 80);
        spawn(&mut world, "vex", "garden", 80);
        run(&mut world);

        let record = &world.resource::<FightLedger>().records[0];
        assert!(record.settled);
        assert_eq!(record.settlement, Some(SettlementKind::Grudge));

        let memories = world.resource::<MemoryBank>();
        let rex = memories.for_character("rex");
        assert_eq!(rex.len(), 1);
        assert!(rex[0].pinned);
        assert!(rex[0].expires_at.is_none());

        // A settled record is terminal: running again changes nothing
        run(&mut world);
        let record = &world.resource::<FightLedger>().records[0];
        assert_eq!(record.settlement_attempts, 3);
        assert_eq!(world.resource::<MemoryBank>().for_character("rex").len(), 1);
    }
}
