//! Social Components
//!
//! Directed relationship edges (affinity, bonds) and the memory bank.
//! Affinity is only ever mutated through `apply_delta` so the clamp lives
//! in one place.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relationship bond categories the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondKind {
    Partner,
    Friend,
    /// Rivalrous bond; feeds jealousy tension when pointed at the same
    /// target as someone else's exclusive bond.
    Rival,
}

/// A directed edge from one character to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEdge {
    /// -100..=100; negative is hostility.
    pub affinity: i32,
    pub bond: Option<BondKind>,
    /// Romantic/committed exclusivity; amplifies conflict fallout.
    pub exclusive: bool,
}

impl RelationshipEdge {
    pub fn new(affinity: i32) -> Self {
        Self {
            affinity: affinity.clamp(-100, 100),
            bond: None,
            exclusive: false,
        }
    }

    pub fn with_bond(mut self, bond: BondKind, exclusive: bool) -> Self {
        self.bond = Some(bond);
        self.exclusive = exclusive;
        self
    }
}

/// Resource: all directed relationship edges.
#[derive(Resource, Debug, Default)]
pub struct RelationshipGraph {
    edges: HashMap<(String, String), RelationshipEdge>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, from: &str, to: &str) -> Option<&RelationshipEdge> {
        self.edges.get(&(from.to_string(), to.to_string()))
    }

    /// Affinity from one character toward another; strangers are 0.
    pub fn affinity(&self, from: &str, to: &str) -> i32 {
        self.get(from, to).map_or(0, |e| e.affinity)
    }

    /// Average of the two directed affinities.
    pub fn mutual_affinity(&self, a: &str, b: &str) -> i32 {
        (self.affinity(a, b) + self.affinity(b, a)) / 2
    }

    /// Installs or replaces an edge.
    pub fn set(&mut self, from: impl Into<String>, to: impl Into<String>, edge: RelationshipEdge) {
        self.edges.insert((from.into(), to.into()), edge);
    }

    /// Applies an affinity delta, creating the edge if needed. The clamp
    /// to -100..=100 happens here and nowhere else.
    pub fn apply_delta(&mut self, from: &str, to: &str, delta: i32) {
        let edge = self
            .edges
            .entry((from.to_string(), to.to_string()))
            .or_insert_with(|| RelationshipEdge::new(0));
        edge.affinity = (edge.affinity + delta).clamp(-100, 100);
    }

    /// True if either direction of the pair carries an exclusive bond.
    pub fn pair_has_exclusive_bond(&self, a: &str, b: &str) -> bool {
        self.get(a, b).is_some_and(|e| e.exclusive) || self.get(b, a).is_some_and(|e| e.exclusive)
    }

    /// Targets of this character's exclusive bonds.
    pub fn exclusive_targets(&self, from: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|((f, _), e)| f == from && e.exclusive)
            .map(|((_, t), _)| t.as_str())
            .collect()
    }

    /// True if `from` holds a rivalrous bond toward `target`.
    pub fn is_rival_of(&self, from: &str, target: &str) -> bool {
        self.get(from, target)
            .is_some_and(|e| e.bond == Some(BondKind::Rival))
    }
}

/// A stored memory for one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub content: String,
    /// 0.0..=1.0; how strongly this memory colors behavior.
    pub importance: f32,
    pub tags: Vec<String>,
    /// Other characters this memory is about.
    pub related: Vec<String>,
    pub created_at: u64,
    /// None means the memory never expires.
    pub expires_at: Option<u64>,
    /// Pinned memories survive every cleanup pass (grudges).
    pub pinned: bool,
}

impl Memory {
    pub fn new(content: impl Into<String>, importance: f32, created_at: u64) -> Self {
        Self {
            content: content.into(),
            importance: importance.clamp(0.0, 1.0),
            tags: Vec::new(),
            related: Vec::new(),
            created_at,
            expires_at: None,
            pinned: false,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_related(mut self, related: &[&str]) -> Self {
        self.related = related.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_expiry(mut self, expires_at: u64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// Resource: memories for all characters.
#[derive(Resource, Debug, Default)]
pub struct MemoryBank {
    memories: HashMap<String, Vec<Memory>>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, character: impl Into<String>, memory: Memory) {
        self.memories.entry(character.into()).or_default().push(memory);
    }

    pub fn for_character(&self, character: &str) -> &[Memory] {
        self.memories.get(character).map_or(&[], |m| m.as_slice())
    }

    /// Drops expired, unpinned memories.
    pub fn expire(&mut self, now: u64) {
        for memories in self.memories.values_mut() {
            memories.retain(|m| m.pinned || m.expires_at.is_none_or(|at| at > now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_clamped_through_delta() {
        let mut graph = RelationshipGraph::new();
        graph.apply_delta("rex", "vex", -150);
        assert_eq!(graph.affinity("rex", "vex"), -100);
        graph.apply_delta("rex", "vex", 250);
        assert_eq!(graph.affinity("rex", "vex"), 100);
    }

    #[test]
    fn test_strangers_have_zero_affinity() {
        let graph = RelationshipGraph::new();
        assert_eq!(graph.affinity("rex", "nobody"), 0);
        assert_eq!(graph.mutual_affinity("rex", "nobody"), 0);
    }

    #[test]
    fn test_mutual_affinity_averages_directions() {
        let mut graph = RelationshipGraph::new();
        graph.set("rex", "vex", RelationshipEdge::new(-70));
        graph.set("vex", "rex", RelationshipEdge::new(-50));
        assert_eq!(graph.mutual_affinity("rex", "vex"), -60);
    }

    #[test]
    fn test_exclusive_bond_detection() {
        let mut graph = RelationshipGraph::new();
        graph.set(
            "rex",
            "fern",
            RelationshipEdge::new(80).with_bond(BondKind::Partner, true),
        );
        assert!(graph.pair_has_exclusive_bond("rex", "fern"));
        assert!(graph.pair_has_exclusive_bond("fern", "rex"));
        assert_eq!(graph.exclusive_targets("rex"), vec!["fern"]);
        assert!(graph.exclusive_targets("fern").is_empty());
    }

    #[test]
    fn test_rival_bond_detection() {
        let mut graph = RelationshipGraph::new();
        graph.set(
            "vex",
            "fern",
            RelationshipEdge::new(40).with_bond(BondKind::Rival, false),
        );
        assert!(graph.is_rival_of("vex", "fern"));
        assert!(!graph.is_rival_of("fern", "vex"));
    }

    #[test]
    fn test_memory_expiry_keeps_pinned() {
        let mut bank = MemoryBank::new();
        bank.add("rex", Memory::new("a fight", 0.7, 0).with_expiry(100));
        bank.add("rex", Memory::new("a grudge", 1.0, 0).pinned());
        bank.expire(200);
        let remaining = bank.for_character("rex");
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].pinned);
    }
}
