//! Node in the post graph.

use serde::{Deserialize, Serialize};
use super::{ActorId, ClusterId, Post};

/// Opaque node identifier. Equal to the id of the post it wraps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Adjacency entry for a semantic-similarity edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer1Connection {
    pub node_id: NodeId,
    pub weight: f64,
}

/// Adjacency entry for a shared-actor edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer2Connection {
    pub node_id: NodeId,
    pub weight: f64,
    pub shared_actors: Vec<ActorId>,
}

/// A node in the post graph.
///
/// Adjacency lists are symmetric: if `a` lists `b` with weight `w` on a
/// layer, `b` lists `a` with the same `w` on that layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub post: Post,
    /// Cluster currently holding this node. Only the engine writes this.
    pub cluster_id: Option<ClusterId>,
    pub layer1_connections: Vec<Layer1Connection>,
    pub layer2_connections: Vec<Layer2Connection>,
}

impl Node {
    pub fn new(post: Post) -> Self {
        Self {
            id: NodeId(post.id.clone()),
            post,
            cluster_id: None,
            layer1_connections: Vec::new(),
            layer2_connections: Vec::new(),
        }
    }

    /// True if `other` is a direct neighbor on either layer.
    pub fn is_adjacent_to(&self, other: &NodeId) -> bool {
        self.layer1_connections.iter().any(|c| &c.node_id == other)
            || self.layer2_connections.iter().any(|c| &c.node_id == other)
    }

    pub fn degree(&self) -> usize {
        self.layer1_connections.len() + self.layer2_connections.len()
    }
}
