//! Engine Event Types
//!
//! The engine never talks to chat channels or notification sinks directly.
//! Each tick it appends events to a queue; an adapter drains the queue and
//! performs the best-effort side effects. This keeps the decision logic
//! testable without any transport mocks.

use serde::{Deserialize, Serialize};

/// Why a character was moved to another zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationReason {
    /// Slipped away before the fight could happen.
    Escape,
    /// Lost and withdrew to recover.
    Retreat,
}

/// A fire-and-forget side effect requested by the engine.
///
/// Failures applying these are logged and ignored; they never feed back
/// into the consequence pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Narrative text posted to a zone channel.
    ZonePost {
        zone: String,
        text: String,
        /// Emotes render differently from spoken lines.
        emote: bool,
    },
    /// A character changed zones as a fight consequence.
    Relocation {
        character: String,
        from: String,
        to: String,
        reason: RelocationReason,
    },
    /// Operator-facing summary of a fight outcome.
    Notify { summary: String },
}

impl EngineEvent {
    /// Convenience constructor for emoted zone narration.
    pub fn emote(zone: impl Into<String>, text: impl Into<String>) -> Self {
        EngineEvent::ZonePost {
            zone: zone.into(),
            text: text.into(),
            emote: true,
        }
    }
}
