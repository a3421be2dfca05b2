//! World Components
//!
//! Zones are coarse discrete locations. The registry flags which zones can
//! host a confrontation and which one serves as the recovery zone losers
//! retreat to.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current zone of a character.
#[derive(Component, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone(pub String);

/// Static attributes of a zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Fights may start here.
    #[serde(default)]
    pub conflict_eligible: bool,
    /// Losers withdraw here after a retreat.
    #[serde(default)]
    pub recovery: bool,
}

/// Resource: lookup of all known zones.
#[derive(Resource, Debug, Default)]
pub struct ZoneRegistry {
    zones: HashMap<String, ZoneInfo>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, info: ZoneInfo) {
        self.zones.insert(id.into(), info);
    }

    /// Unknown zones are treated as conflict-ineligible.
    pub fn conflict_eligible(&self, zone: &str) -> bool {
        self.zones.get(zone).is_some_and(|z| z.conflict_eligible)
    }

    /// The designated recovery zone, if one is configured.
    pub fn recovery_zone(&self) -> Option<&str> {
        self.zones
            .iter()
            .find(|(_, info)| info.recovery)
            .map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_eligibility() {
        let mut registry = ZoneRegistry::new();
        registry.register(
            "yard",
            ZoneInfo {
                conflict_eligible: true,
                recovery: false,
            },
        );
        registry.register(
            "infirmary",
            ZoneInfo {
                conflict_eligible: false,
                recovery: true,
            },
        );

        assert!(registry.conflict_eligible("yard"));
        assert!(!registry.conflict_eligible("infirmary"));
        assert!(!registry.conflict_eligible("nowhere"));
        assert_eq!(registry.recovery_zone(), Some("infirmary"));
    }
}
