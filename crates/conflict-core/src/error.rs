//! Engine error taxonomy.
//!
//! Per-pairing failures abort only the pairing being processed, never the
//! tick; transient narrative failures are handled with fallbacks inside
//! `narrative` and never surface here.

use thiserror::Error;

/// Errors that abort a single pairing or action.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} cannot fight")]
    CannotFight(String),

    #[error("no combat profile for {0}")]
    MissingProfile(String),

    #[error("character {0} is not in the world")]
    MissingAgent(String),
}
