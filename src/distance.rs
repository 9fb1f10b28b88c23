//! # Focus Distances
//!
//! Weighted frontier expansion from a focus node over one or both edge
//! layers. Hop cost is `1 - weight`, so strong edges are cheap.
//!
//! The expansion is Dijkstra with a radius cut: a node is only expanded
//! while its own distance is strictly below `FOCUS_RADIUS`. A node already
//! expanded is never expanded again, but a node still on the frontier is
//! relaxed whenever a cheaper path to it turns up.
//!
//! Each [`DistanceEntry`] keeps the weight of the edge that last improved
//! it. A layer-1 improvement records its weight and resets the layer-2
//! weight to 0. A layer-2 improvement records its weight and keeps the
//! layer-1 weight, so in `Combined` mode both fields can be set.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::str::FromStr;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::builder::Graph;
use crate::model::NodeId;
use crate::{Error, Result};

// ============================================================================
// LayerMode
// ============================================================================

/// Which edge layers a clustering pass walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerMode {
    Layer1,
    Layer2,
    #[default]
    Combined,
}

impl LayerMode {
    pub fn includes_layer1(self) -> bool {
        matches!(self, LayerMode::Layer1 | LayerMode::Combined)
    }

    pub fn includes_layer2(self) -> bool {
        matches!(self, LayerMode::Layer2 | LayerMode::Combined)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayerMode::Layer1 => "layer1",
            LayerMode::Layer2 => "layer2",
            LayerMode::Combined => "combined",
        }
    }
}

impl std::fmt::Display for LayerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "layer1" => Ok(LayerMode::Layer1),
            "layer2" => Ok(LayerMode::Layer2),
            "combined" => Ok(LayerMode::Combined),
            other => Err(Error::InvalidLayerMode(other.to_string())),
        }
    }
}

// ============================================================================
// DistanceMap
// ============================================================================

/// Path from the focus. Paths are short because the radius is small.
pub type FocusPath = SmallVec<[NodeId; 4]>;

/// Best known distance from the focus to one node.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEntry {
    pub node_id: NodeId,
    pub distance: f64,
    pub path: FocusPath,
    /// Weight of the layer-1 edge that last improved this entry, else 0.
    pub layer1_weight: f64,
    /// Weight of the layer-2 edge that last improved this entry. Reset to 0
    /// whenever a layer-1 edge improves the entry.
    pub layer2_weight: f64,
}

/// Distances from one focus node, in discovery order.
///
/// Only nodes reached within the radius are present. The focus is always
/// the first entry, at distance 0.
#[derive(Debug, Clone)]
pub struct DistanceMap {
    entries: Vec<DistanceEntry>,
    index: HashMap<NodeId, usize>,
}

impl DistanceMap {
    fn new(focus: NodeId) -> Self {
        let entry = DistanceEntry {
            node_id: focus.clone(),
            distance: 0.0,
            path: smallvec![focus.clone()],
            layer1_weight: 0.0,
            layer2_weight: 0.0,
        };
        let mut index = HashMap::new();
        index.insert(focus, 0);
        Self { entries: vec![entry], index }
    }

    pub fn focus(&self) -> &NodeId {
        &self.entries[0].node_id
    }

    pub fn get(&self, id: &NodeId) -> Option<&DistanceEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the focus is always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &DistanceEntry> {
        self.entries.iter()
    }

    /// Entries by ascending distance. Ties keep discovery order, so the
    /// focus always comes first.
    pub fn sorted_by_distance(&self) -> Vec<&DistanceEntry> {
        let mut sorted: Vec<&DistanceEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        sorted
    }

    pub fn max_distance(&self) -> f64 {
        self.entries.iter().map(|e| e.distance).fold(0.0, f64::max)
    }

    /// Hand-built map for assignment tests. The first entry is the focus.
    #[cfg(test)]
    pub(crate) fn from_entries(entries: Vec<DistanceEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.node_id.clone(), i))
            .collect();
        Self { entries, index }
    }
}

// ============================================================================
// Frontier
// ============================================================================

#[derive(Debug)]
struct Frontier {
    distance: f64,
    seq: u64,
    slot: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed: BinaryHeap is a max-heap and we want the closest first,
    // earliest pushed on ties.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Clone, Copy)]
enum Via {
    Layer1,
    Layer2,
}

// ============================================================================
// Expansion
// ============================================================================

/// Distances from `focus` to every node reachable within `radius` over
/// the layers selected by `mode`.
pub fn distances_from(
    graph: &Graph,
    focus: &NodeId,
    mode: LayerMode,
    radius: f64,
) -> Result<DistanceMap> {
    if !graph.contains(focus) {
        return Err(Error::NodeNotFound(focus.clone()));
    }

    let mut map = DistanceMap::new(focus.clone());
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut frontier = BinaryHeap::new();
    let mut seq = 0u64;
    frontier.push(Frontier { distance: 0.0, seq, slot: 0 });

    while let Some(item) = frontier.pop() {
        let current = &map.entries[item.slot];
        if item.distance > current.distance || visited.contains(&current.node_id) {
            continue;
        }
        visited.insert(current.node_id.clone());
        if current.distance >= radius {
            continue;
        }

        let Some(node) = graph.node(&current.node_id) else {
            continue;
        };
        let distance = current.distance;
        let path = current.path.clone();

        let layer1 = node.layer1_connections.iter().map(|c| (&c.node_id, c.weight, Via::Layer1));
        let layer2 = node.layer2_connections.iter().map(|c| (&c.node_id, c.weight, Via::Layer2));
        let edges = layer1
            .filter(|_| mode.includes_layer1())
            .chain(layer2.filter(|_| mode.includes_layer2()));

        for (neighbor, weight, via) in edges {
            if visited.contains(neighbor) || !graph.contains(neighbor) {
                continue;
            }
            let candidate = distance + (1.0 - weight);
            if let Some(slot) = relax(&mut map, neighbor, candidate, &path, weight, via) {
                seq += 1;
                frontier.push(Frontier { distance: candidate, seq, slot });
            }
        }
    }

    debug!(focus = %focus, mode = %mode, reached = map.len(), "focus distances computed");
    Ok(map)
}

/// Record `candidate` for `neighbor` if it beats the known distance.
/// Returns the entry slot when the entry changed.
fn relax(
    map: &mut DistanceMap,
    neighbor: &NodeId,
    candidate: f64,
    path: &FocusPath,
    weight: f64,
    via: Via,
) -> Option<usize> {
    let mut next_path = path.clone();
    next_path.push(neighbor.clone());

    match map.index.get(neighbor) {
        Some(&slot) => {
            let entry = &mut map.entries[slot];
            if entry.distance <= candidate {
                return None;
            }
            entry.distance = candidate;
            entry.path = next_path;
            match via {
                Via::Layer1 => {
                    entry.layer1_weight = weight;
                    entry.layer2_weight = 0.0;
                }
                Via::Layer2 => entry.layer2_weight = weight,
            }
            Some(slot)
        }
        None => {
            let (layer1_weight, layer2_weight) = match via {
                Via::Layer1 => (weight, 0.0),
                Via::Layer2 => (0.0, weight),
            };
            let slot = map.entries.len();
            map.entries.push(DistanceEntry {
                node_id: neighbor.clone(),
                distance: candidate,
                path: next_path,
                layer1_weight,
                layer2_weight,
            });
            map.index.insert(neighbor.clone(), slot);
            Some(slot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::config::ClusteringConfig;
    use crate::model::Post;

    fn chain() -> Graph {
        // a -0.9- b -0.9- c on layer 1, e isolated
        let posts = vec![
            Post::new("a").with_embedding(vec![1.0, 0.0, 0.0]),
            Post::new("b").with_embedding(vec![0.9, 0.435_889_894_354_067_4, 0.0]),
            Post::new("c").with_embedding(vec![0.62, 0.784_601_809_837_321_6, 0.0]),
            Post::new("e").with_embedding(vec![0.0, 0.0, 1.0]),
        ];
        build_graph(&posts, &[], &ClusteringConfig::default())
    }

    #[test]
    fn layer_mode_parses_and_displays() {
        assert_eq!("layer2".parse::<LayerMode>().unwrap(), LayerMode::Layer2);
        assert_eq!(LayerMode::Combined.to_string(), "combined");
        assert!(matches!("both".parse::<LayerMode>(), Err(Error::InvalidLayerMode(_))));
    }

    #[test]
    fn focus_is_first_at_zero() {
        let graph = chain();
        let map = distances_from(&graph, &"a".into(), LayerMode::Layer1, 2.0).unwrap();
        let first = map.sorted_by_distance()[0];
        assert_eq!(first.node_id, NodeId::from("a"));
        assert_eq!(first.distance, 0.0);
        assert_eq!(map.focus(), &NodeId::from("a"));
    }

    #[test]
    fn unreachable_nodes_are_absent() {
        let graph = chain();
        let map = distances_from(&graph, &"a".into(), LayerMode::Layer1, 2.0).unwrap();
        assert!(!map.contains(&"e".into()));
    }

    #[test]
    fn wrong_layer_reaches_nothing() {
        let graph = chain();
        let map = distances_from(&graph, &"a".into(), LayerMode::Layer2, 2.0).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn radius_stops_expansion_beyond_the_bound() {
        let graph = chain();
        // b sits at 0.1 from a; a radius of 0.05 expands a only.
        let map = distances_from(&graph, &"a".into(), LayerMode::Layer1, 0.05).unwrap();
        assert!(map.contains(&"b".into()));
        let b = map.get(&"b".into()).unwrap();
        assert!(b.distance > 0.05);
        // anything only reachable through b stays out
        for entry in map.iter() {
            assert!(entry.path.len() <= 2);
        }
    }

    #[test]
    fn unknown_focus_is_rejected() {
        let graph = chain();
        let err = distances_from(&graph, &"zz".into(), LayerMode::Combined, 2.0).unwrap_err();
        assert!(matches!(err, Error::NodeNotFound(id) if id.0 == "zz"));
    }

    #[test]
    fn path_records_the_route_from_focus() {
        let graph = chain();
        let map = distances_from(&graph, &"a".into(), LayerMode::Layer1, 2.0).unwrap();
        let b = map.get(&"b".into()).unwrap();
        assert_eq!(b.path.as_slice(), &[NodeId::from("a"), NodeId::from("b")]);
        assert!(b.layer1_weight > 0.89);
        assert_eq!(b.layer2_weight, 0.0);
    }

    /// f -0.9- m -0.83- y on layer 1, f and y also share an actor (layer 2, 0.35).
    fn detour() -> Graph {
        let posts = vec![
            Post::new("f").with_embedding(vec![1.0, 0.0, 0.0]).with_actors(["harbor"]),
            Post::new("m").with_embedding(vec![0.9, 0.19f64.sqrt(), 0.0]),
            Post::new("y").with_embedding(vec![0.5, 0.75f64.sqrt(), 0.0]).with_actors(["harbor", "mayor"]),
        ];
        build_graph(&posts, &[], &ClusteringConfig::default())
    }

    #[test]
    fn cheaper_path_found_later_replaces_the_pending_one() {
        let graph = detour();
        let y = graph.node(&"y".into()).unwrap();
        assert_eq!(y.layer1_connections.len(), 1);
        assert_eq!(y.layer2_connections[0].node_id, NodeId::from("f"));

        let map = distances_from(&graph, &"f".into(), LayerMode::Combined, 2.0).unwrap();
        let my_weight = y.layer1_connections[0].weight;
        let entry = map.get(&"y".into()).unwrap();

        // direct layer-2 hop costs 0.65; the layer-1 detour through m is cheaper
        assert!((entry.distance - (0.1 + (1.0 - my_weight))).abs() < 1e-9);
        assert!(entry.distance < 0.65);
        assert_eq!(entry.path.as_slice(), &[NodeId::from("f"), NodeId::from("m"), NodeId::from("y")]);
        assert_eq!(entry.layer1_weight, my_weight);
        assert_eq!(entry.layer2_weight, 0.0);
    }

    fn pending(layer1_weight: f64, layer2_weight: f64) -> DistanceMap {
        let entry = |id: &str, distance, layer1_weight, layer2_weight| DistanceEntry {
            node_id: NodeId::from(id),
            distance,
            path: smallvec![NodeId::from(id)],
            layer1_weight,
            layer2_weight,
        };
        DistanceMap::from_entries(vec![
            entry("f", 0.0, 0.0, 0.0),
            entry("x", 0.9, layer1_weight, layer2_weight),
        ])
    }

    #[test]
    fn layer2_improvement_keeps_the_layer1_weight() {
        let mut map = pending(0.4, 0.0);
        let path: FocusPath = smallvec![NodeId::from("f")];
        let slot = relax(&mut map, &"x".into(), 0.5, &path, 0.6, Via::Layer2);
        assert_eq!(slot, Some(1));

        let x = map.get(&"x".into()).unwrap();
        assert_eq!(x.distance, 0.5);
        assert_eq!(x.layer1_weight, 0.4);
        assert_eq!(x.layer2_weight, 0.6);
    }

    #[test]
    fn layer1_improvement_clears_the_layer2_weight() {
        let mut map = pending(0.0, 0.35);
        let path: FocusPath = smallvec![NodeId::from("f")];
        relax(&mut map, &"x".into(), 0.3, &path, 0.8, Via::Layer1);

        let x = map.get(&"x".into()).unwrap();
        assert_eq!(x.layer1_weight, 0.8);
        assert_eq!(x.layer2_weight, 0.0);
    }

    #[test]
    fn worse_candidate_changes_nothing() {
        let mut map = pending(0.4, 0.2);
        let path: FocusPath = smallvec![NodeId::from("f")];
        assert_eq!(relax(&mut map, &"x".into(), 0.9, &path, 0.95, Via::Layer1), None);

        let x = map.get(&"x".into()).unwrap();
        assert_eq!((x.distance, x.layer1_weight, x.layer2_weight), (0.9, 0.4, 0.2));
    }
}
