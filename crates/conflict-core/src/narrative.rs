//! Narrative Source
//!
//! The engine asks an external generator for short narrative lines
//! (provocations, escapes, accident color). The generator is opaque and
//! may fail or time out; callers always supply a static style-specific
//! fallback, so a dead generator never stalls the consequence pipeline.

use bevy_ecs::prelude::*;
use thiserror::Error;
use tracing::warn;

/// What kind of line is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Provocation,
    Escape,
}

/// Inputs for a narrative request.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub kind: PromptKind,
    pub character: String,
    pub opponent: String,
    pub reason: String,
    pub style: String,
}

/// Errors from the external generator. All of them are transient; the
/// caller falls back to static content.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative generator unavailable")]
    Unavailable,
    #[error("narrative generation timed out")]
    Timeout,
    #[error("narrative generator failed: {0}")]
    Failed(String),
}

/// An external text generator. Implementations must already bound their
/// own latency; this call is expected to return promptly.
pub trait NarrativeSource: Send + Sync {
    fn generate(&mut self, prompt: &PromptSpec) -> Result<String, NarrativeError>;
}

/// Source used when no generator is wired up: always defers to fallback.
#[derive(Debug, Default)]
pub struct StaticNarrator;

impl NarrativeSource for StaticNarrator {
    fn generate(&mut self, _prompt: &PromptSpec) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unavailable)
    }
}

/// Resource wrapping the configured narrative source.
#[derive(Resource)]
pub struct Narrator {
    source: Box<dyn NarrativeSource>,
}

impl Narrator {
    pub fn new(source: Box<dyn NarrativeSource>) -> Self {
        Self { source }
    }

    pub fn without_generator() -> Self {
        Self {
            source: Box::new(StaticNarrator),
        }
    }

    /// Requests a line, falling back to static style-specific content on
    /// any failure or on empty output.
    pub fn line(&mut self, prompt: &PromptSpec) -> String {
        match self.source.generate(prompt) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback_line(prompt),
            Err(e) => {
                warn!(character = %prompt.character, "narrative fallback: {}", e);
                fallback_line(prompt)
            }
        }
    }
}

/// Static fallback lines keyed by fighting style.
fn fallback_line(prompt: &PromptSpec) -> String {
    match prompt.kind {
        PromptKind::Provocation => provocation_fallback(&prompt.style, &prompt.character, &prompt.opponent),
        PromptKind::Escape => escape_fallback(&prompt.style, &prompt.character),
    }
}

fn provocation_fallback(style: &str, character: &str, opponent: &str) -> String {
    match style {
        "brawler" => format!("{} cracks their knuckles and steps into {}'s path.", character, opponent),
        "duelist" => format!("{} fixes {} with a long, cold stare.", character, opponent),
        "scrapper" => format!("{} bristles and snaps something sharp at {}.", character, opponent),
        _ => format!("{} squares up to {}.", character, opponent),
    }
}

fn escape_fallback(style: &str, character: &str) -> String {
    match style {
        "scrapper" => format!("{} ducks low and bolts before anyone can react.", character),
        "skittish" => format!("{} is gone before the first move lands.", character),
        _ => format!("{} slips away from the brewing fight.", character),
    }
}
