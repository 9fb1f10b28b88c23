//! Exported graph snapshot: the only view handed to renderers.
//!
//! A snapshot is an owned copy. Mutating it never touches engine state.
//! Field names serialize in camelCase:
//!
//! ```text
//! { nodes: [ { id, type, data, layer, clusterId,
//!              layer1Connections: [{nodeId, weight}],
//!              layer2Connections: [{nodeId, weight, sharedActors}] } ],
//!   clusters: [ { id, nodes, center, weight } ],
//!   metadata: { totalNodes, layer1Connections, layer2Connections,
//!               clusterLevel, totalClusters } }
//! ```

use serde::{Deserialize, Serialize};
use super::{ActorId, Cluster, ClusterId, Node, NodeId, Post};
use crate::Result;

/// Node type tag emitted for every post node.
pub const POST_NODE_TYPE: &str = "post";

/// Layer tag emitted for every post node.
pub const POST_NODE_LAYER: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLayer1Connection {
    pub node_id: NodeId,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLayer2Connection {
    pub node_id: NodeId,
    pub weight: f64,
    pub shared_actors: Vec<ActorId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    pub data: Post,
    pub layer: u8,
    pub cluster_id: Option<ClusterId>,
    pub layer1_connections: Vec<SnapshotLayer1Connection>,
    pub layer2_connections: Vec<SnapshotLayer2Connection>,
}

impl From<&Node> for SnapshotNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            node_type: POST_NODE_TYPE.to_string(),
            data: node.post.clone(),
            layer: POST_NODE_LAYER,
            cluster_id: node.cluster_id.clone(),
            layer1_connections: node
                .layer1_connections
                .iter()
                .map(|c| SnapshotLayer1Connection { node_id: c.node_id.clone(), weight: c.weight })
                .collect(),
            layer2_connections: node
                .layer2_connections
                .iter()
                .map(|c| SnapshotLayer2Connection {
                    node_id: c.node_id.clone(),
                    weight: c.weight,
                    shared_actors: c.shared_actors.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCluster {
    pub id: ClusterId,
    pub nodes: Vec<NodeId>,
    pub center: NodeId,
    pub weight: f64,
}

impl From<&Cluster> for SnapshotCluster {
    fn from(cluster: &Cluster) -> Self {
        Self {
            id: cluster.id.clone(),
            nodes: cluster.nodes.clone(),
            center: cluster.center.clone(),
            weight: cluster.weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub total_nodes: usize,
    /// Number of layer-1 edges (not adjacency entries).
    pub layer1_connections: usize,
    /// Number of layer-2 edges (not adjacency entries).
    pub layer2_connections: usize,
    pub cluster_level: f64,
    pub total_clusters: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<SnapshotNode>,
    pub clusters: Vec<SnapshotCluster>,
    pub metadata: SnapshotMetadata,
}

impl GraphSnapshot {
    pub fn node(&self, id: &NodeId) -> Option<&SnapshotNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn cluster(&self, id: &ClusterId) -> Option<&SnapshotCluster> {
        self.clusters.iter().find(|c| &c.id == id)
    }

    /// Cluster currently holding `node`, if any.
    pub fn cluster_of(&self, node: &NodeId) -> Option<&SnapshotCluster> {
        let id = self.node(node)?.cluster_id.as_ref()?;
        self.cluster(id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
