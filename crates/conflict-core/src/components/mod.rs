//! ECS components and world-state resources.

pub mod agent;
pub mod social;
pub mod world;

pub use agent::{Agent, AgentId, Mood, Vitals};
pub use social::{BondKind, Memory, MemoryBank, RelationshipEdge, RelationshipGraph};
pub use world::{Zone, ZoneInfo, ZoneRegistry};
