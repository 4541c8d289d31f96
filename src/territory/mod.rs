//! Settlement territory graph
//!
//! Nodes carry identity and adjacency only. Living population is derived
//! from the actor registry and vitality is derived on demand by the
//! equilibrium engine; neither is ever stored on a node.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::NodeId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementNode {
    pub id: NodeId,
    pub name: String,
    pub neighbors: Vec<NodeId>,
}

/// Read access to the settlement graph. The equilibrium engine consumes
/// this trait; a host with its own world model can provide another
/// implementation.
pub trait TerritoryGraph {
    fn node(&self, id: NodeId) -> Option<&SettlementNode>;
    fn node_ids(&self) -> Vec<NodeId>;

    fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).map(|n| n.neighbors.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct TerritoryMap {
    nodes: AHashMap<NodeId, SettlementNode>,
}

impl TerritoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, name: &str) {
        self.nodes.insert(id, SettlementNode { id, name: name.to_string(), neighbors: Vec::new() });
    }

    pub fn connect(&mut self, a: NodeId, b: NodeId) {
        if let Some(node) = self.nodes.get_mut(&a) {
            if !node.neighbors.contains(&b) {
                node.neighbors.push(b);
            }
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            if !node.neighbors.contains(&a) {
                node.neighbors.push(a);
            }
        }
    }
}

impl TerritoryGraph for TerritoryMap {
    fn node(&self, id: NodeId) -> Option<&SettlementNode> {
        self.nodes.get(&id)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_by_key(|n| n.0);
        ids
    }
}
