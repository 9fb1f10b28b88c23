//! # Graph Engine
//!
//! The stateful shell around the pure passes:
//!
//! ```text
//! initialize ─▶ build_graph ─▶ Graph (owned here)
//! cluster_around_node ─▶ distances_from ─▶ assign_clusters ─▶ overwrite clusters
//! decluster / export_snapshot / update_config
//! ```
//!
//! Every clustering call recomputes the whole assignment and overwrites
//! every node's cluster. The engine takes `&mut self` for every change, so
//! a single owner serializes calls; share it across threads through
//! [`SharedGraphEngine`](crate::SharedGraphEngine).
//!
//! A failing operation returns an error and leaves the engine untouched.

use tracing::{debug, info, warn};

use crate::assign::assign_clusters;
use crate::builder::{build_graph, Graph};
use crate::config::{ClusteringConfig, ConfigUpdate};
use crate::distance::{distances_from, LayerMode};
use crate::model::*;
use crate::observer::{GraphEvent, GraphObserver, ObserverRegistry, SubscriptionId};
use crate::{Error, Result};

/// Cluster level before any clustering call.
pub const DEFAULT_CLUSTER_LEVEL: f64 = 0.5;

/// Owns the graph and the current cluster assignment.
#[derive(Debug)]
pub struct GraphEngine {
    config: ClusteringConfig,
    graph: Option<Graph>,
    clusters: Vec<Cluster>,
    cluster_level: f64,
    layer_mode: LayerMode,
    focus: Option<NodeId>,
    observers: ObserverRegistry,
    /// Set while wrapped in a `SharedGraphEngine`: events are queued here
    /// and delivered by the handle once the engine lock is released.
    deferred: Option<Vec<(GraphEvent, GraphSnapshot)>>,
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphEngine {
    /// Engine with the default configuration.
    pub fn new() -> Self {
        Self {
            config: ClusteringConfig::default(),
            graph: None,
            clusters: Vec::new(),
            cluster_level: DEFAULT_CLUSTER_LEVEL,
            layer_mode: LayerMode::default(),
            focus: None,
            observers: ObserverRegistry::default(),
            deferred: None,
        }
    }

    pub fn with_config(config: ClusteringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, ..Self::new() })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_initialized(&self) -> bool {
        self.graph.is_some()
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster_level(&self) -> f64 {
        self.cluster_level
    }

    pub fn layer_mode(&self) -> LayerMode {
        self.layer_mode
    }

    /// Focus of the last successful clustering call.
    pub fn focus(&self) -> Option<&NodeId> {
        self.focus.as_ref()
    }

    fn graph_ref(&self) -> Result<&Graph> {
        self.graph.as_ref().ok_or(Error::NotInitialized)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Build the graph, replacing any previous graph, clusters and focus.
    ///
    /// Actors are accepted for interface parity; scoring only reads the
    /// actor ids carried on posts.
    pub fn initialize(
        &mut self,
        posts: &[Post],
        actors: &[Actor],
        relationships: &[ActorRelationship],
    ) -> GraphSnapshot {
        let graph = build_graph(posts, relationships, &self.config);
        let meta = graph.metadata();
        info!(
            posts = posts.len(),
            actors = actors.len(),
            relationships = relationships.len(),
            layer1_edges = meta.layer1_edges,
            layer2_edges = meta.layer2_edges,
            "graph initialized"
        );

        self.graph = Some(graph);
        self.clusters.clear();
        self.focus = None;

        let snapshot = self.capture();
        self.publish(
            GraphEvent::Initialized {
                nodes: meta.total_nodes,
                layer1_edges: meta.layer1_edges,
                layer2_edges: meta.layer2_edges,
            },
            &snapshot,
        );
        snapshot
    }

    // ========================================================================
    // Clustering
    // ========================================================================

    /// Cluster the neighborhood of `focus`.
    ///
    /// `level` is clamped into [0, 1]; NaN and infinities are rejected.
    /// Nodes outside the focus radius end up with no cluster.
    pub fn cluster_around_node(
        &mut self,
        focus: &NodeId,
        level: f64,
        mode: LayerMode,
    ) -> Result<GraphSnapshot> {
        if !level.is_finite() {
            return Err(Error::InvalidClusterLevel(level));
        }
        let level = level.clamp(0.0, 1.0);

        let assignment = {
            let graph = self.graph_ref()?;
            let distances = distances_from(graph, focus, mode, self.config.focus_radius)?;
            assign_clusters(&distances, level, mode, graph, &self.config)
        };

        if let Some(graph) = self.graph.as_mut() {
            graph.apply_clusters(&assignment.node_to_cluster);
        }
        self.clusters = assignment.clusters;
        self.cluster_level = level;
        self.layer_mode = mode;
        self.focus = Some(focus.clone());

        info!(
            focus = %focus,
            level,
            mode = %mode,
            clusters = self.clusters.len(),
            clustered_nodes = assignment.node_to_cluster.len(),
            "clustered around node"
        );

        let snapshot = self.capture();
        self.publish(GraphEvent::Clustered { focus: focus.clone(), level, mode }, &snapshot);
        Ok(snapshot)
    }

    /// Store a new level and re-cluster at the last focus, if there is one.
    pub fn set_cluster_level(&mut self, level: f64) -> Result<GraphSnapshot> {
        if !level.is_finite() {
            return Err(Error::InvalidClusterLevel(level));
        }
        self.graph_ref()?;
        match self.focus.clone() {
            Some(focus) => self.cluster_around_node(&focus, level, self.layer_mode),
            None => {
                self.cluster_level = level.clamp(0.0, 1.0);
                debug!(level = self.cluster_level, "cluster level stored, no focus yet");
                Ok(self.capture())
            }
        }
    }

    /// Store a new layer mode and re-cluster at the last focus, if there is one.
    pub fn set_layer_mode(&mut self, mode: LayerMode) -> Result<GraphSnapshot> {
        self.graph_ref()?;
        match self.focus.clone() {
            Some(focus) => self.cluster_around_node(&focus, self.cluster_level, mode),
            None => {
                self.layer_mode = mode;
                debug!(mode = %mode, "layer mode stored, no focus yet");
                Ok(self.capture())
            }
        }
    }

    /// Dissolve one cluster, or every cluster when `cluster` is `None`.
    ///
    /// Members of a dissolved cluster are left with no cluster, the same
    /// state as after a full reset. An unknown cluster id changes nothing.
    pub fn decluster(&mut self, cluster: Option<&ClusterId>) -> Result<GraphSnapshot> {
        self.graph_ref()?;

        let changed = match cluster {
            Some(id) => match self.clusters.iter().position(|c| &c.id == id) {
                Some(i) => {
                    let removed = self.clusters.remove(i);
                    if let Some(graph) = self.graph.as_mut() {
                        graph.clear_clusters_of(&removed.nodes);
                    }
                    info!(cluster = %id, members = removed.len(), "cluster dissolved");
                    true
                }
                None => {
                    warn!(cluster = %id, "decluster requested for unknown cluster");
                    false
                }
            },
            None => {
                if let Some(graph) = self.graph.as_mut() {
                    graph.clear_all_clusters();
                }
                let dropped = self.clusters.len();
                self.clusters.clear();
                info!(clusters = dropped, "all clusters dissolved");
                true
            }
        };

        let snapshot = self.capture();
        if changed {
            self.publish(GraphEvent::Declustered { cluster: cluster.cloned() }, &snapshot);
        }
        Ok(snapshot)
    }

    // ========================================================================
    // Export & configuration
    // ========================================================================

    /// Owned copy of the current graph state.
    pub fn export_snapshot(&self) -> Result<GraphSnapshot> {
        self.graph_ref()?;
        Ok(self.capture())
    }

    /// Shallow-merge `update` into the active configuration.
    ///
    /// Nothing is re-clustered. Clustering keys apply from the next
    /// clustering call; edge-building keys apply from the next `initialize`.
    /// An invalid merged result is rejected and the old config kept.
    pub fn update_config(&mut self, update: &ConfigUpdate) -> Result<&ClusteringConfig> {
        let next = self.config.merged(update);
        next.validate()?;
        self.config = next;
        info!(config = ?self.config, "configuration updated");

        if self.graph.is_some() {
            let snapshot = self.capture();
            self.publish(GraphEvent::ConfigUpdated, &snapshot);
        }
        Ok(&self.config)
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register `observer`. It runs inside the call that changed the
    /// engine, so it must not call back into this engine.
    pub fn subscribe(&mut self, observer: impl GraphObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn publish(&mut self, event: GraphEvent, snapshot: &GraphSnapshot) {
        if let Some(queue) = self.deferred.as_mut() {
            queue.push((event, snapshot.clone()));
        } else if !self.observers.is_empty() {
            self.observers.notify(&event, snapshot);
        }
    }

    /// Switch to queued delivery and hand over the current observers.
    pub(crate) fn defer_events(&mut self) -> ObserverRegistry {
        self.deferred.get_or_insert_with(Vec::new);
        std::mem::take(&mut self.observers)
    }

    /// Drain events queued since the last call.
    pub(crate) fn take_events(&mut self) -> Vec<(GraphEvent, GraphSnapshot)> {
        self.deferred.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Snapshot of the current state. Empty when not initialized.
    fn capture(&self) -> GraphSnapshot {
        let (nodes, meta) = match &self.graph {
            Some(graph) => (graph.nodes().iter().map(SnapshotNode::from).collect(), graph.metadata()),
            None => (Vec::new(), Graph::default().metadata()),
        };
        GraphSnapshot {
            nodes,
            clusters: self.clusters.iter().map(SnapshotCluster::from).collect(),
            metadata: SnapshotMetadata {
                total_nodes: meta.total_nodes,
                layer1_connections: meta.layer1_edges,
                layer2_connections: meta.layer2_edges,
                cluster_level: self.cluster_level,
                total_clusters: self.clusters.len(),
            },
        }
    }
}
