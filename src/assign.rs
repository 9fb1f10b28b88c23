//! # Cluster Assignment
//!
//! Greedy, single-pass partition of the nodes reached from a focus.
//!
//! 1. Walk nodes by ascending focus distance (focus first).
//! 2. `threshold = max_distance * level`.
//! 3. A node is *admitted* when `distance <= threshold` and its combined
//!    weight is strictly above `MERGE_WEIGHT_MIN`.
//! 4. An admitted node joins the first cluster, in creation order, that
//!    holds one of its direct neighbors (either layer) and is below
//!    `MAX_CLUSTER_SIZE`. Otherwise it seeds a new cluster. A node that is
//!    not admitted gets a singleton cluster.
//! 5. Clusters smaller than `MIN_CLUSTER_SIZE` are dissolved into fresh
//!    singletons of weight 0, except the one holding the focus.
//!
//! The first-match tie-break is order dependent. Cluster ids are
//! reproducible for a given graph, focus, level and mode.

use hashbrown::HashMap;
use tracing::debug;

use crate::builder::Graph;
use crate::config::ClusteringConfig;
use crate::distance::{DistanceEntry, DistanceMap, LayerMode};
use crate::model::{Cluster, ClusterId, NodeId};

/// Result of one clustering pass: a partition of the distance map's nodes.
#[derive(Debug, Clone, Default)]
pub struct ClusterAssignment {
    /// Clusters in creation order, dissolution singletons last.
    pub clusters: Vec<Cluster>,
    pub node_to_cluster: HashMap<NodeId, ClusterId>,
}

impl ClusterAssignment {
    pub fn cluster_of(&self, node: &NodeId) -> Option<&Cluster> {
        let id = self.node_to_cluster.get(node)?;
        self.clusters.iter().find(|c| &c.id == id)
    }
}

/// Layer weight used for the admission gate.
pub fn combined_weight(entry: &DistanceEntry, mode: LayerMode, config: &ClusteringConfig) -> f64 {
    match mode {
        LayerMode::Layer1 => entry.layer1_weight,
        LayerMode::Layer2 => entry.layer2_weight,
        LayerMode::Combined => {
            entry.layer1_weight * config.combined_weight_layer1
                + entry.layer2_weight * config.combined_weight_layer2
        }
    }
}

struct IdSequence(usize);

impl IdSequence {
    fn next(&mut self) -> ClusterId {
        let id = ClusterId::sequential(self.0);
        self.0 += 1;
        id
    }
}

/// Partition the nodes of `distances` into clusters.
///
/// `level` is clamped into [0, 1].
pub fn assign_clusters(
    distances: &DistanceMap,
    level: f64,
    mode: LayerMode,
    graph: &Graph,
    config: &ClusteringConfig,
) -> ClusterAssignment {
    let level = level.clamp(0.0, 1.0);
    let threshold = distances.max_distance() * level;
    let mut ids = IdSequence(0);
    let mut clusters: Vec<Cluster> = Vec::new();

    for entry in distances.sorted_by_distance() {
        let weight = combined_weight(entry, mode, config);

        let admitted = entry.distance <= threshold && weight > config.merge_weight_min;
        let target = if admitted {
            graph.node(&entry.node_id).and_then(|node| {
                clusters.iter().position(|cluster| {
                    cluster.len() < config.max_cluster_size
                        && cluster.nodes.iter().any(|member| node.is_adjacent_to(member))
                })
            })
        } else {
            None
        };

        match target {
            Some(i) => clusters[i].push(entry.node_id.clone(), weight),
            None => clusters.push(Cluster::seeded(ids.next(), entry.node_id.clone(), weight)),
        }
    }

    let formed = clusters.len();
    let focus = distances.focus();
    let mut kept = Vec::with_capacity(clusters.len());
    let mut split = Vec::new();
    for cluster in clusters {
        if cluster.len() < config.min_cluster_size && !cluster.contains(focus) {
            for member in cluster.nodes {
                split.push(Cluster::seeded(ids.next(), member, 0.0));
            }
        } else {
            kept.push(cluster);
        }
    }
    let dissolved = formed - kept.len();
    kept.extend(split);

    let mut node_to_cluster = HashMap::with_capacity(distances.len());
    for cluster in &kept {
        for member in &cluster.nodes {
            node_to_cluster.insert(member.clone(), cluster.id.clone());
        }
    }

    debug!(
        focus = %focus,
        level,
        threshold,
        formed,
        dissolved,
        total = kept.len(),
        "clusters assigned"
    );
    ClusterAssignment { clusters: kept, node_to_cluster }
}
