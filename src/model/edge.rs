//! Undirected weighted edge between two posts.

use serde::{Deserialize, Serialize};
use super::{ActorId, NodeId};

/// Which relation layer an edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeLayer {
    /// Embedding cosine similarity.
    Semantic,
    /// Shared actors, boosted by known actor relationships.
    SharedActors,
}

/// An edge, stored once per unordered pair and layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub layer: EdgeLayer,
    pub weight: f64,
    /// Empty for semantic edges.
    pub shared_actors: Vec<ActorId>,
}

impl Edge {
    pub fn semantic(source: NodeId, target: NodeId, weight: f64) -> Self {
        Self {
            source,
            target,
            layer: EdgeLayer::Semantic,
            weight,
            shared_actors: Vec::new(),
        }
    }

    pub fn shared_actors(
        source: NodeId,
        target: NodeId,
        weight: f64,
        shared_actors: Vec<ActorId>,
    ) -> Self {
        Self {
            source,
            target,
            layer: EdgeLayer::SharedActors,
            weight,
            shared_actors,
        }
    }

    /// The "other" end of the edge from the given node.
    pub fn other_node(&self, from: &NodeId) -> Option<&NodeId> {
        if from == &self.source { Some(&self.target) }
        else if from == &self.target { Some(&self.source) }
        else { None }
    }

    /// True if this edge joins `a` and `b`, in either order.
    pub fn connects(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }
}
