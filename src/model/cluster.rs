//! Cluster of nodes produced by one clustering pass.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// Cluster identifier, `cluster_<n>` with `n` counted per clustering pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub String);

impl ClusterId {
    pub fn sequential(n: usize) -> Self {
        Self(format!("cluster_{n}"))
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClusterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A group of nodes. Never empty once handed out by the assigner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    /// Members in join order. The center is always the first member.
    pub nodes: Vec<NodeId>,
    pub center: NodeId,
    /// Sum of the members' combined edge weights. 0 for the singletons
    /// left over when an undersized cluster is dissolved.
    pub weight: f64,
}

impl Cluster {
    /// A cluster seeded with a single member, which becomes its center.
    pub fn seeded(id: ClusterId, node: NodeId, weight: f64) -> Self {
        Self {
            id,
            nodes: vec![node.clone()],
            center: node,
            weight,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.iter().any(|n| n == node)
    }

    pub fn push(&mut self, node: NodeId, weight: f64) {
        self.nodes.push(node);
        self.weight += weight;
    }
}
