//! Engine event queue resource.

use bevy_ecs::prelude::*;
use conflict_events::EngineEvent;

/// Resource: side effects requested this tick, drained by the runner.
#[derive(Resource, Debug, Default)]
pub struct EngineEvents {
    pub events: Vec<EngineEvent>,
}

impl EngineEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Removes and returns everything queued so far.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}
