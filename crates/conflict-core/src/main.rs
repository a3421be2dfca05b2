//! Conflict Simulation Runner
//!
//! Drives the conflict engine on a fixed tick loop: tension scoring,
//! delayed confrontation resolution, healing, settlement, and accidents.
//! Engine side effects come back as events, printed here as a transcript.

use bevy_ecs::prelude::*;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use conflict_core::components::social::MemoryBank;
use conflict_core::components::world::ZoneRegistry;
use conflict_core::config::CombatProfiles;
use conflict_core::limiter::RateLimiter;
use conflict_core::narrative::Narrator;
use conflict_core::setup;
use conflict_core::systems::{
    evaluate_tension, generate_accident, heal_injuries, resolve_pending, settle_fights,
    FightLedger, InjuryLedger, PendingConfrontations,
};
use conflict_core::{Config, EngineEvents, GameClock, SimRng};
use conflict_events::{EngineEvent, RelocationReason};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "conflict_sim")]
#[command(about = "A conflict-resolution engine for autonomous social agents")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 720)]
    ticks: u64,

    /// Simulated seconds that pass each tick
    #[arg(long, default_value_t = 60)]
    secs_per_tick: u64,

    /// Path to the tuning file
    #[arg(long, default_value = "tuning.toml")]
    tuning: String,
}

fn main() {
    let args = Args::parse();

    println!("Conflict Simulation Engine");
    println!("==========================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {} ({} simulated seconds each)", args.ticks, args.secs_per_tick);
    println!();

    let config = Config::load(&args.tuning).unwrap_or_else(|e| {
        eprintln!("Warning: could not load {}: {}; using defaults", args.tuning, e);
        Config::default()
    });

    let mut world = World::new();

    let profile_map = if config.profiles.is_empty() {
        setup::demo_profiles()
    } else {
        config.profiles.clone()
    };
    let zone_map = if config.zones.is_empty() {
        setup::demo_zones()
    } else {
        config.zones.clone()
    };
    println!("Loaded {} combat profiles, {} zones", profile_map.len(), zone_map.len());

    let mut zones = ZoneRegistry::new();
    for (id, info) in zone_map {
        zones.register(id, info);
    }

    world.insert_resource(SimRng(SmallRng::seed_from_u64(args.seed)));
    world.insert_resource(GameClock::new());
    world.insert_resource(CombatProfiles::from_map(profile_map));
    world.insert_resource(zones);
    world.insert_resource(config);
    world.insert_resource(setup::demo_relationships());
    world.insert_resource(MemoryBank::new());
    world.insert_resource(RateLimiter::new());
    world.insert_resource(Narrator::without_generator());
    world.insert_resource(EngineEvents::new());
    world.insert_resource(PendingConfrontations::new());
    world.insert_resource(FightLedger::new());
    world.insert_resource(InjuryLedger::new());

    println!("Spawning cast...");
    setup::spawn_demo_cast(&mut world);

    // A fixed system order keeps the RNG draw sequence, and therefore the
    // whole run, reproducible for a given seed.
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

    println!();
    println!("Starting simulation...");
    println!();

    for tick in 0..args.ticks {
        schedule.run(&mut world);

        let events = world.resource_mut::<EngineEvents>().drain();
        for event in events {
            print_event(tick, &event);
        }

        world.resource_mut::<GameClock>().advance(args.secs_per_tick);
    }

    println!();
    let fights = world.resource::<FightLedger>();
    let injuries = world.resource::<InjuryLedger>();
    let settled = fights.records.iter().filter(|r| r.settled).count();
    println!(
        "Simulation complete. {} fights ({} settled), {} injuries recorded.",
        fights.records.len(),
        settled,
        injuries.records.len()
    );
}

fn print_event(tick: u64, event: &EngineEvent) {
    match event {
        EngineEvent::ZonePost { zone, text, emote } => {
            if *emote {
                println!("[tick {:>4}] ({}) * {}", tick, zone, text);
            } else {
                println!("[tick {:>4}] ({}) {}", tick, zone, text);
            }
        }
        EngineEvent::Relocation {
            character,
            from,
            to,
            reason,
        } => {
            let verb = match reason {
                RelocationReason::Escape => "flees",
                RelocationReason::Retreat => "withdraws",
            };
            println!("[tick {:>4}] {} {} from the {} to the {}", tick, character, verb, from, to);
        }
        EngineEvent::Notify { summary } => {
            println!("[tick {:>4}] note: {}", tick, summary);
        }
    }
}
