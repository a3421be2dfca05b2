//! Demo World Setup
//!
//! A small household cast used when tuning.toml supplies no profiles or
//! zones of its own. The cast covers every archetype the engine knows:
//! a hardened brawler, a duelist, a scrapper with an escape profile, a
//! skittish always-flees type, a protected non-combatant, and a mediator.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::components::agent::{Agent, AgentId, Mood, Vitals};
use crate::components::social::{BondKind, RelationshipEdge, RelationshipGraph};
use crate::components::world::{Zone, ZoneInfo};
use crate::config::{CombatProfile, EscapeProfile};

fn fighter(power: i32, style: &str, retreat_affinity: f64) -> CombatProfile {
    CombatProfile {
        can_fight: true,
        power,
        style: style.to_string(),
        retreat_affinity,
        hardened: false,
        protected: false,
        escape: None,
    }
}

/// Combat profiles for the demo cast.
pub fn demo_profiles() -> HashMap<String, CombatProfile> {
    let mut profiles = HashMap::new();

    let mut rex = fighter(3, "brawler", 0.10);
    rex.hardened = true;
    profiles.insert("rex".to_string(), rex);

    profiles.insert("vex".to_string(), fighter(2, "duelist", 0.20));

    let mut moss = fighter(1, "scrapper", 0.30);
    moss.escape = Some(EscapeProfile {
        base_chance: 0.35,
        defender_bonus: 0.15,
        low_health_bonus: 0.20,
        beatdown_bonus: 0.15,
        max_chance: 0.85,
        cooldown_hours: 4,
        max_per_day: 2,
        safe_zones: vec!["garden".to_string()],
        always_flees: false,
    });
    profiles.insert("moss".to_string(), moss);

    let mut skit = fighter(0, "skittish", 0.60);
    skit.escape = Some(EscapeProfile {
        base_chance: 0.0,
        defender_bonus: 0.0,
        low_health_bonus: 0.0,
        beatdown_bonus: 0.0,
        max_chance: 1.0,
        cooldown_hours: 2,
        max_per_day: 4,
        safe_zones: vec!["garden".to_string(), "infirmary".to_string()],
        always_flees: true,
    });
    profiles.insert("skit".to_string(), skit);

    let mut fern = fighter(0, "timid", 0.50);
    fern.can_fight = false;
    fern.protected = true;
    profiles.insert("fern".to_string(), fern);

    profiles.insert("sage".to_string(), fighter(1, "duelist", 0.40));

    profiles
}

/// Zone layout for the demo cast.
pub fn demo_zones() -> HashMap<String, ZoneInfo> {
    let mut zones = HashMap::new();
    zones.insert(
        "yard".to_string(),
        ZoneInfo {
            conflict_eligible: true,
            recovery: false,
        },
    );
    zones.insert(
        "common_room".to_string(),
        ZoneInfo {
            conflict_eligible: true,
            recovery: false,
        },
    );
    zones.insert(
        "garden".to_string(),
        ZoneInfo {
            conflict_eligible: false,
            recovery: false,
        },
    );
    zones.insert(
        "infirmary".to_string(),
        ZoneInfo {
            conflict_eligible: false,
            recovery: true,
        },
    );
    zones
}

/// Starting relationships: an old feud, a rivalry over a partner, and a
/// mediator on good terms with both feuding sides.
pub fn demo_relationships() -> RelationshipGraph {
    let mut graph = RelationshipGraph::new();

    graph.set("rex", "vex", RelationshipEdge::new(-70));
    graph.set("vex", "rex", RelationshipEdge::new(-60));

    graph.set("rex", "fern", RelationshipEdge::new(80).with_bond(BondKind::Partner, true));
    graph.set("fern", "rex", RelationshipEdge::new(75).with_bond(BondKind::Partner, true));
    graph.set("vex", "fern", RelationshipEdge::new(40).with_bond(BondKind::Rival, false));

    graph.set("moss", "rex", RelationshipEdge::new(-45));
    graph.set("rex", "moss", RelationshipEdge::new(-40));
    graph.set("skit", "vex", RelationshipEdge::new(-25));

    graph.set("sage", "rex", RelationshipEdge::new(60).with_bond(BondKind::Friend, false));
    graph.set("sage", "vex", RelationshipEdge::new(55).with_bond(BondKind::Friend, false));

    graph
}

/// Spawns the demo cast, worn down enough that trouble is close.
pub fn spawn_demo_cast(world: &mut World) {
    let cast: &[(&str, &str, i32, i32)] = &[
        ("rex", "yard", 85, 25),
        ("vex", "yard", 75, 60),
        ("moss", "common_room", 60, 40),
        ("skit", "common_room", 50, 70),
        ("fern", "yard", 90, 80),
        ("sage", "yard", 80, 90),
    ];
    for (id, zone, energy, patience) in cast {
        world.spawn((
            Agent,
            AgentId(id.to_string()),
            Zone(zone.to_string()),
            Mood::Neutral,
            Vitals::new(*energy, *patience),
        ));
    }
}
