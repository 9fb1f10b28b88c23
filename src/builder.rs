//! # Graph Construction
//!
//! Turns posts + actor relationships into the base [`Graph`]: one node per
//! post, plus two undirected edge sets.
//!
//! - **Layer 1**: cosine similarity of embeddings, kept when
//!   `>= LAYER1_SIMILARITY_THRESHOLD`.
//! - **Layer 2**: shared actors, kept when at least
//!   `LAYER2_SHARED_ACTORS_MIN` are shared, weighted by
//!   [`shared_actor_weight`].
//!
//! ## Scaling limit
//!
//! Both layers compare every unordered pair of posts: O(n²) scoring work
//! (O(n²·d) for embeddings of dimension d). Fine for the few hundred posts
//! of a dashboard; thousands of posts need a candidate index in front of
//! this, which is not provided.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::config::ClusteringConfig;
use crate::model::*;
use crate::scoring::{cosine_similarity, shared_actor_weight, RelationshipIndex};

// ============================================================================
// Graph
// ============================================================================

/// Edge counts per layer, fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub layer1_edges: usize,
    pub layer2_edges: usize,
}

/// The dual-layer post graph.
///
/// Nodes keep input order for iteration; lookup is by id.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    layer1_edges: Vec<Edge>,
    layer2_edges: Vec<Edge>,
}

impl Graph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn layer1_edges(&self) -> &[Edge] {
        &self.layer1_edges
    }

    pub fn layer2_edges(&self) -> &[Edge] {
        &self.layer2_edges
    }

    pub fn metadata(&self) -> GraphMetadata {
        GraphMetadata {
            total_nodes: self.nodes.len(),
            layer1_edges: self.layer1_edges.len(),
            layer2_edges: self.layer2_edges.len(),
        }
    }

    /// Set every node's cluster from `lookup`; nodes absent from it get `None`.
    pub(crate) fn apply_clusters(&mut self, lookup: &HashMap<NodeId, ClusterId>) {
        for node in &mut self.nodes {
            node.cluster_id = lookup.get(&node.id).cloned();
        }
    }

    /// Clear the cluster of the listed nodes.
    pub(crate) fn clear_clusters_of(&mut self, members: &[NodeId]) {
        for id in members {
            if let Some(&i) = self.index.get(id) {
                self.nodes[i].cluster_id = None;
            }
        }
    }

    pub(crate) fn clear_all_clusters(&mut self) {
        for node in &mut self.nodes {
            node.cluster_id = None;
        }
    }

    fn link_layer1(&mut self, a: usize, b: usize, weight: f64) {
        let (id_a, id_b) = (self.nodes[a].id.clone(), self.nodes[b].id.clone());
        self.nodes[a].layer1_connections.push(Layer1Connection { node_id: id_b.clone(), weight });
        self.nodes[b].layer1_connections.push(Layer1Connection { node_id: id_a.clone(), weight });
        self.layer1_edges.push(Edge::semantic(id_a, id_b, weight));
    }

    fn link_layer2(&mut self, a: usize, b: usize, weight: f64, shared: Vec<ActorId>) {
        let (id_a, id_b) = (self.nodes[a].id.clone(), self.nodes[b].id.clone());
        self.nodes[a].layer2_connections.push(Layer2Connection {
            node_id: id_b.clone(),
            weight,
            shared_actors: shared.clone(),
        });
        self.nodes[b].layer2_connections.push(Layer2Connection {
            node_id: id_a.clone(),
            weight,
            shared_actors: shared.clone(),
        });
        self.layer2_edges.push(Edge::shared_actors(id_a, id_b, weight, shared));
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Build the base graph. Inputs are not modified.
///
/// A post whose id was already seen is skipped: node identity is the post
/// id, so the first post with a given id wins.
pub fn build_graph(
    posts: &[Post],
    relationships: &[ActorRelationship],
    config: &ClusteringConfig,
) -> Graph {
    let mut graph = Graph::default();
    for post in posts {
        let node = Node::new(post.clone());
        if graph.index.contains_key(&node.id) {
            warn!(post_id = %node.id, "duplicate post id, keeping first occurrence");
            continue;
        }
        graph.index.insert(node.id.clone(), graph.nodes.len());
        graph.nodes.push(node);
    }

    build_layer1(&mut graph, config);

    let index = RelationshipIndex::new(relationships, config.default_relationship_confidence);
    build_layer2(&mut graph, &index, config);

    debug!(
        nodes = graph.nodes.len(),
        layer1_edges = graph.layer1_edges.len(),
        layer2_edges = graph.layer2_edges.len(),
        "graph built"
    );
    graph
}

fn build_layer1(graph: &mut Graph, config: &ClusteringConfig) {
    let n = graph.nodes.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let similarity = cosine_similarity(
                &graph.nodes[i].post.embedding_vector,
                &graph.nodes[j].post.embedding_vector,
            );
            if similarity >= config.layer1_similarity_threshold {
                graph.link_layer1(i, j, similarity);
            }
        }
    }
}

fn build_layer2(graph: &mut Graph, relationships: &RelationshipIndex, config: &ClusteringConfig) {
    // Distinct actors per post, in first-mention order.
    let actor_lists: Vec<Vec<ActorId>> = graph
        .nodes
        .iter()
        .map(|node| {
            let mut seen = HashSet::new();
            node.post
                .actors
                .iter()
                .filter(|a| seen.insert(*a))
                .cloned()
                .collect()
        })
        .collect();
    let actor_sets: Vec<HashSet<&ActorId>> =
        actor_lists.iter().map(|list| list.iter().collect()).collect();

    let min_shared = config.layer2_shared_actors_min.max(1);
    let n = graph.nodes.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let shared: Vec<ActorId> = actor_lists[i]
                .iter()
                .filter(|a| actor_sets[j].contains(a))
                .cloned()
                .collect();
            if shared.len() < min_shared {
                continue;
            }
            let weight = shared_actor_weight(
                &shared,
                relationships,
                actor_lists[i].len(),
                actor_lists[j].len(),
                config,
            );
            graph.link_layer2(i, j, weight, shared);
        }
    }
}
