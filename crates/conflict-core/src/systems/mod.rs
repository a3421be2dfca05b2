//! Engine systems, one per scheduler entry point.

pub mod accident;
pub mod confrontation;
pub mod fight;
pub mod injury;
pub mod settlement;
pub mod tension;

pub use accident::generate_accident;
pub use confrontation::{resolve_pending, PendingConfrontations, FIGHT_ACTIVITY_KEY};
pub use fight::FightLedger;
pub use injury::{heal_injuries, InjuryLedger};
pub use settlement::settle_fights;
pub use tension::evaluate_tension;
