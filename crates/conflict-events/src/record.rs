//! Persisted Record Types
//!
//! Records created by the engine and consumed on later ticks: pending
//! confrontations, fight outcomes, and injuries. All of them are plain
//! serde data so an external store can snapshot and reload them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::HOUR;

/// Severity tier of a resolved fight, derived from the dice margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Equal totals; nobody wins, nobody is hurt badly.
    Standoff,
    /// Margin of 3 or less.
    Scuffle,
    /// Margin of 7 or less.
    Fight,
    /// Anything wider.
    Beatdown,
}

impl Severity {
    /// Derives the tier from the absolute margin between the two totals.
    /// A margin of zero is a standoff.
    pub fn from_margin(margin: u32) -> Self {
        match margin {
            0 => Severity::Standoff,
            1..=3 => Severity::Scuffle,
            4..=7 => Severity::Fight,
            _ => Severity::Beatdown,
        }
    }

    /// Bumps the tier one step up (natural-20 escalation).
    ///
    /// A standoff has no winner to escalate for and stays a standoff;
    /// a beatdown is already the ceiling.
    pub fn escalate(self) -> Self {
        match self {
            Severity::Standoff => Severity::Standoff,
            Severity::Scuffle => Severity::Fight,
            Severity::Fight | Severity::Beatdown => Severity::Beatdown,
        }
    }

    /// Short label used in narratives and logs.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Standoff => "standoff",
            Severity::Scuffle => "scuffle",
            Severity::Fight => "fight",
            Severity::Beatdown => "beatdown",
        }
    }
}

/// Tiered injury kinds, mildest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryKind {
    Shaken,
    Bruised,
    Wounded,
    Humiliated,
}

impl InjuryKind {
    /// Fixed heal duration per kind, in seconds.
    pub fn heal_duration(self) -> u64 {
        match self {
            InjuryKind::Shaken => 6 * HOUR,
            InjuryKind::Bruised => 4 * HOUR,
            InjuryKind::Wounded => 12 * HOUR,
            InjuryKind::Humiliated => 8 * HOUR,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InjuryKind::Shaken => "shaken",
            InjuryKind::Bruised => "bruised",
            InjuryKind::Wounded => "wounded",
            InjuryKind::Humiliated => "humiliated",
        }
    }
}

/// A timed injury. Deactivated once its heal deadline passes, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryRecord {
    pub id: Uuid,
    /// Who carries the injury.
    pub character: String,
    pub kind: InjuryKind,
    pub description: String,
    /// Coarse numeric severity for downstream consumers.
    pub severity: i32,
    /// Who caused it.
    pub source: String,
    /// Originating fight, if any (accidents have none).
    pub fight_id: Option<Uuid>,
    /// Timestamp at which the injury heals.
    pub heals_at: u64,
    pub active: bool,
}

impl InjuryRecord {
    /// Creates an active injury whose heal deadline is exactly the kind's
    /// fixed duration past `now`.
    pub fn new(
        character: impl Into<String>,
        kind: InjuryKind,
        description: impl Into<String>,
        severity: i32,
        source: impl Into<String>,
        fight_id: Option<Uuid>,
        now: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            character: character.into(),
            kind,
            description: description.into(),
            severity,
            source: source.into(),
            fight_id,
            heals_at: now + kind.heal_duration(),
            active: true,
        }
    }

    /// True once the heal deadline has passed.
    pub fn is_due(&self, now: u64) -> bool {
        self.heals_at <= now
    }
}

/// The provocation phase of a fight, persisted until the resolution delay
/// elapses. At most one exists per unordered pair at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingConfrontation {
    pub aggressor: String,
    pub defender: String,
    /// What pushed the pair over the threshold.
    pub reason: String,
    pub tension: i32,
    /// When the provocation was posted.
    pub created_at: u64,
}

impl PendingConfrontation {
    pub fn new(
        aggressor: impl Into<String>,
        defender: impl Into<String>,
        reason: impl Into<String>,
        tension: i32,
        now: u64,
    ) -> Self {
        Self {
            aggressor: aggressor.into(),
            defender: defender.into(),
            reason: reason.into(),
            tension,
            created_at: now,
        }
    }

    /// Unordered pair match.
    pub fn involves(&self, a: &str, b: &str) -> bool {
        (self.aggressor == a && self.defender == b) || (self.aggressor == b && self.defender == a)
    }
}

/// How a fight record reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementKind {
    /// Both parties made peace.
    Reconciliation,
    /// Repeated failures calcified into a permanent grudge.
    Grudge,
}

/// A resolved fight, kept unsettled until the settlement engine closes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightRecord {
    pub id: Uuid,
    pub aggressor: String,
    pub defender: String,
    /// None for a standoff.
    pub winner: Option<String>,
    pub severity: Severity,
    pub aggressor_roll: u32,
    pub defender_roll: u32,
    pub aggressor_modifier: i32,
    pub defender_modifier: i32,
    /// A natural 20 escalated the severity.
    pub critical_hit: bool,
    /// The loser rolled a natural 1; narrative color only.
    pub critical_fail: bool,
    pub occurred_at: u64,
    pub settled: bool,
    pub settlement_attempts: u32,
    pub settlement: Option<SettlementKind>,
}

impl FightRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        aggressor: impl Into<String>,
        defender: impl Into<String>,
        winner: Option<String>,
        severity: Severity,
        rolls: (u32, u32),
        modifiers: (i32, i32),
        now: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggressor: aggressor.into(),
            defender: defender.into(),
            winner,
            severity,
            aggressor_roll: rolls.0,
            defender_roll: rolls.1,
            aggressor_modifier: modifiers.0,
            defender_modifier: modifiers.1,
            critical_hit: false,
            critical_fail: false,
            occurred_at: now,
            settled: false,
            settlement_attempts: 0,
            settlement: None,
        }
    }

    /// The non-winning participant, if there was a winner.
    pub fn loser(&self) -> Option<&str> {
        match self.winner.as_deref() {
            Some(w) if w == self.aggressor => Some(&self.defender),
            Some(_) => Some(&self.aggressor),
            None => None,
        }
    }
}
