//! Injury Ledger
//!
//! Timed injuries created by fights and accidents. Healing deactivates a
//! record once its deadline passes; records are never deleted, so the
//! history stays queryable.

use bevy_ecs::prelude::*;
use conflict_events::{InjuryKind, InjuryRecord};
use tracing::info;

use crate::config::Config;
use crate::GameClock;

/// Resource: every injury ever recorded, active or healed.
#[derive(Resource, Debug, Default)]
pub struct InjuryLedger {
    pub records: Vec<InjuryRecord>,
}

impl InjuryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: InjuryRecord) {
        self.records.push(record);
    }

    /// Active injuries carried by one character.
    pub fn active_for(&self, character: &str) -> Vec<&InjuryRecord> {
        self.records
            .iter()
            .filter(|r| r.active && r.character == character)
            .collect()
    }

    pub fn active_count(&self, character: &str) -> usize {
        self.active_for(character).len()
    }

    /// True if the character carries an active injury of this kind.
    pub fn has_active(&self, character: &str, kind: InjuryKind) -> bool {
        self.records
            .iter()
            .any(|r| r.active && r.kind == kind && r.character == character)
    }
}

/// System: deactivate injuries whose heal deadline has passed.
///
/// Safe to run on any cadence; injuries not yet due are untouched.
pub fn heal_injuries(
    mut injuries: ResMut<InjuryLedger>,
    config: Res<Config>,
    clock: Res<GameClock>,
) {
    if clock.tick % config.cadence.heal_every != 0 {
        return;
    }
    let now = clock.now;
    for record in injuries.records.iter_mut() {
        if record.active && record.is_due(now) {
            record.active = false;
            info!(
                character = %record.character,
                kind = record.kind.label(),
                "injury healed"
            );
        }
    }
}
