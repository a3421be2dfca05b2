//! Shared record and event types for the conflict engine.
//!
//! Everything persisted by the engine (fight records, injuries, pending
//! confrontations) and everything it emits for the outside world (zone
//! posts, relocations, notifications) lives here, so stores and adapters
//! can depend on the schema without pulling in the engine itself.

pub mod event;
pub mod record;
pub mod time;

pub use event::{EngineEvent, RelocationReason};
pub use record::{
    FightRecord, InjuryKind, InjuryRecord, PendingConfrontation, SettlementKind, Severity,
};
pub use time::{day_of, HOUR, MINUTE, SECS_PER_DAY};
