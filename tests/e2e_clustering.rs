//! End-to-end tests for focus-relative clustering through `GraphEngine`.
//!
//! Covers the partition invariant, focus exemption, radius cut-off,
//! layer modes, level/mode re-runs and the greedy first-match tie-break.

use pretty_assertions::assert_eq;
use storygraph::{
    ClusterId, ConfigUpdate, Error, GraphEngine, GraphSnapshot, LayerMode, NodeId, Post,
};

// ============================================================================
// Helpers
// ============================================================================

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

/// A, B, C with cos(A,B) = 0.9, cos(A,C) = 0.2, cos(B,C) = 0.1.
fn abc_engine() -> GraphEngine {
    let b2 = 0.19f64.sqrt();
    let c2 = -0.08 / b2;
    let c3 = (1.0 - 0.04 - c2 * c2).sqrt();
    let posts = vec![
        Post::new("A").with_embedding(vec![1.0, 0.0, 0.0]),
        Post::new("B").with_embedding(vec![0.9, b2, 0.0]),
        Post::new("C").with_embedding(vec![0.2, c2, c3]),
    ];
    let mut engine = GraphEngine::new();
    engine.initialize(&posts, &[], &[]);
    engine
}

/// Newsroom fixture: two storylines plus an outlier.
///
/// - strike: s1, s2, s3 share embeddings and the actor "union"
/// - merger: m1, m2 share the actors "acme" and "globex"
/// - lone: no embedding, no actors
fn newsroom() -> GraphEngine {
    let posts = vec![
        Post::new("s1").with_embedding(vec![1.0, 0.0, 0.0]).with_actors(["union", "port"]),
        Post::new("s2").with_embedding(vec![0.95, 0.05, 0.0]).with_actors(["union"]),
        Post::new("s3").with_embedding(vec![0.9, 0.1, 0.05]).with_actors(["union", "mayor"]),
        Post::new("m1").with_embedding(vec![0.0, 1.0, 0.0]).with_actors(["acme", "globex"]),
        Post::new("m2").with_embedding(vec![0.0, 0.0, 1.0]).with_actors(["acme", "globex"]),
        Post::new("lone"),
    ];
    let mut engine = GraphEngine::new();
    engine.initialize(&posts, &[], &[]);
    engine
}

fn assert_partition(snapshot: &GraphSnapshot) {
    for cluster in &snapshot.clusters {
        assert!(!cluster.nodes.is_empty(), "cluster {} is empty", cluster.id);
        assert_eq!(cluster.center, cluster.nodes[0]);
    }
    for node in &snapshot.nodes {
        if let Some(cid) = &node.cluster_id {
            let holders: Vec<_> = snapshot
                .clusters
                .iter()
                .filter(|c| c.nodes.contains(&node.id))
                .collect();
            assert_eq!(holders.len(), 1, "node {} held by {} clusters", node.id, holders.len());
            assert_eq!(&holders[0].id, cid);
        } else {
            assert!(snapshot.clusters.iter().all(|c| !c.nodes.contains(&node.id)));
        }
    }
}

// ============================================================================
// 1. Three-document scenario
// ============================================================================

#[test]
fn test_similar_pair_merges_and_unreachable_node_stays_unclustered() {
    let mut engine = abc_engine();
    let snapshot = engine.cluster_around_node(&id("A"), 1.0, LayerMode::Layer1).unwrap();

    let a = snapshot.node(&id("A")).unwrap();
    let b = snapshot.node(&id("B")).unwrap();
    let c = snapshot.node(&id("C")).unwrap();
    assert!(a.cluster_id.is_some());
    assert_eq!(a.cluster_id, b.cluster_id);
    assert_eq!(c.cluster_id, None);

    let cluster = snapshot.cluster_of(&id("A")).unwrap();
    assert_eq!(cluster.nodes, vec![id("A"), id("B")]);
    assert_eq!(cluster.center, id("A"));
    assert_eq!(snapshot.metadata.total_clusters, 1);
    assert_partition(&snapshot);
}

// ============================================================================
// 2. Focus exemption and isolated focus
// ============================================================================

#[test]
fn test_isolated_focus_gets_a_singleton_cluster() {
    let mut engine = newsroom();
    let snapshot = engine.cluster_around_node(&id("lone"), 1.0, LayerMode::Combined).unwrap();

    assert_eq!(snapshot.clusters.len(), 1);
    assert_eq!(snapshot.clusters[0].nodes, vec![id("lone")]);
    assert_eq!(
        snapshot.nodes.iter().filter(|n| n.cluster_id.is_some()).count(),
        1
    );
}

#[test]
fn test_focus_singleton_survives_minimum_size() {
    let mut engine = newsroom();
    engine
        .update_config(&ConfigUpdate { min_cluster_size: Some(5), ..ConfigUpdate::default() })
        .unwrap();
    let snapshot = engine.cluster_around_node(&id("s1"), 0.0, LayerMode::Combined).unwrap();

    let focus_cluster = snapshot.cluster_of(&id("s1")).unwrap();
    assert_eq!(focus_cluster.id, ClusterId::sequential(0));
    assert_eq!(focus_cluster.nodes, vec![id("s1")]);
    assert_partition(&snapshot);
}

// ============================================================================
// 3. Layer modes
// ============================================================================

#[test]
fn test_layer2_mode_follows_shared_actors_only() {
    let mut engine = newsroom();
    let snapshot = engine.cluster_around_node(&id("m1"), 1.0, LayerMode::Layer2).unwrap();

    // m1 and m2 have orthogonal embeddings but identical actors: weight 0.7
    let cluster = snapshot.cluster_of(&id("m1")).unwrap();
    assert_eq!(cluster.nodes, vec![id("m1"), id("m2")]);
    for other in ["s1", "s2", "s3", "lone"] {
        assert_eq!(snapshot.node(&id(other)).unwrap().cluster_id, None);
    }
}

#[test]
fn test_layer1_mode_ignores_shared_actors() {
    let mut engine = newsroom();
    let snapshot = engine.cluster_around_node(&id("m1"), 1.0, LayerMode::Layer1).unwrap();

    assert_eq!(snapshot.clusters.len(), 1);
    assert_eq!(snapshot.node(&id("m2")).unwrap().cluster_id, None);
}

#[test]
fn test_combined_mode_reaches_the_whole_storyline() {
    let mut engine = newsroom();
    let snapshot = engine.cluster_around_node(&id("s1"), 1.0, LayerMode::Combined).unwrap();

    let cluster = snapshot.cluster_of(&id("s1")).unwrap();
    assert_eq!(cluster.nodes.len(), 3);
    assert_eq!(snapshot.node(&id("m1")).unwrap().cluster_id, None);
    assert_partition(&snapshot);
}

// ============================================================================
// 4. Radius
// ============================================================================

#[test]
fn test_small_radius_limits_reach() {
    // x -0.9- y -0.9- z on layer 1, x and z not linked
    let posts = vec![
        Post::new("x").with_embedding(vec![1.0, 0.0]),
        Post::new("y").with_embedding(vec![0.9, 0.19f64.sqrt()]),
        Post::new("z").with_embedding(vec![0.62, (1.0f64 - 0.62 * 0.62).sqrt()]),
    ];
    let mut engine = GraphEngine::new();
    engine.initialize(&posts, &[], &[]);

    let wide = engine.cluster_around_node(&id("x"), 1.0, LayerMode::Layer1).unwrap();
    assert!(wide.node(&id("z")).unwrap().cluster_id.is_some());

    // y sits at distance 0.1: reached, but not expanded under a 0.05 radius
    engine
        .update_config(&ConfigUpdate { focus_radius: Some(0.05), ..ConfigUpdate::default() })
        .unwrap();
    let narrow = engine.cluster_around_node(&id("x"), 1.0, LayerMode::Layer1).unwrap();
    assert!(narrow.node(&id("y")).unwrap().cluster_id.is_some());
    assert_eq!(narrow.node(&id("z")).unwrap().cluster_id, None);
    assert_partition(&narrow);
}

// ============================================================================
// 5. Level and mode re-runs
// ============================================================================

#[test]
fn test_set_cluster_level_reclusters_at_last_focus() {
    let mut engine = newsroom();
    engine.cluster_around_node(&id("s1"), 1.0, LayerMode::Layer1).unwrap();
    let merged = engine.export_snapshot().unwrap();
    assert_eq!(merged.cluster_of(&id("s1")).unwrap().nodes.len(), 3);

    let split = engine.set_cluster_level(0.0).unwrap();
    assert_eq!(split.metadata.cluster_level, 0.0);
    assert_eq!(split.cluster_of(&id("s1")).unwrap().nodes, vec![id("s1")]);
    assert_eq!(engine.focus(), Some(&id("s1")));
}

#[test]
fn test_set_layer_mode_reclusters_with_new_mode() {
    let mut engine = newsroom();
    engine.cluster_around_node(&id("m1"), 1.0, LayerMode::Layer1).unwrap();

    let snapshot = engine.set_layer_mode("layer2".parse().unwrap()).unwrap();
    assert_eq!(engine.layer_mode(), LayerMode::Layer2);
    assert_eq!(
        snapshot.node(&id("m1")).unwrap().cluster_id,
        snapshot.node(&id("m2")).unwrap().cluster_id
    );
}

#[test]
fn test_bad_layer_mode_string_is_rejected() {
    let err = "layer3".parse::<LayerMode>().unwrap_err();
    assert!(matches!(err, Error::InvalidLayerMode(ref s) if s == "layer3"));
}

#[test]
fn test_raising_level_never_unclusters_nodes() {
    let mut engine = newsroom();
    let mut previous = 0;
    for level in [0.0, 0.2, 0.4, 0.6, 0.8, 1.0] {
        let snapshot = engine.cluster_around_node(&id("s2"), level, LayerMode::Combined).unwrap();
        let clustered = snapshot.nodes.iter().filter(|n| n.cluster_id.is_some()).count();
        assert!(clustered >= previous, "level {level}: {clustered} < {previous}");
        previous = clustered;
        assert_partition(&snapshot);
    }
}

// ============================================================================
// 6. Full overwrite and greedy tie-break
// ============================================================================

#[test]
fn test_each_call_overwrites_previous_assignment() {
    let mut engine = newsroom();
    engine.cluster_around_node(&id("s1"), 1.0, LayerMode::Combined).unwrap();
    let snapshot = engine.cluster_around_node(&id("m1"), 1.0, LayerMode::Layer2).unwrap();

    for storyline in ["s1", "s2", "s3"] {
        assert_eq!(snapshot.node(&id(storyline)).unwrap().cluster_id, None);
    }
    assert_partition(&snapshot);
}

#[test]
fn test_assignment_is_reproducible_and_respects_capacity() {
    // p and q both hang off the focus with weight 0.35; x only links to p and q
    // with weight 0.23, below the merge gate.
    let posts = vec![
        Post::new("f").with_actors(["k"]),
        Post::new("p").with_actors(["k", "a"]),
        Post::new("q").with_actors(["k", "b"]),
        Post::new("x").with_actors(["a", "b"]),
    ];
    let mut engine = GraphEngine::new();
    engine.initialize(&posts, &[], &[]);
    engine
        .update_config(&ConfigUpdate { max_cluster_size: Some(2), ..ConfigUpdate::default() })
        .unwrap();

    let first = engine.cluster_around_node(&id("f"), 1.0, LayerMode::Layer2).unwrap();
    let second = engine.cluster_around_node(&id("f"), 1.0, LayerMode::Layer2).unwrap();
    assert_eq!(first, second);
    assert_partition(&first);

    // f + p fill cluster_0, q seeds cluster_1, x stays alone in cluster_2;
    // the two singletons are then split into cluster_3 and cluster_4.
    let ids: Vec<&str> = first.clusters.iter().map(|c| c.id.0.as_str()).collect();
    assert_eq!(ids, vec!["cluster_0", "cluster_3", "cluster_4"]);
    assert_eq!(first.clusters[0].nodes, vec![id("f"), id("p")]);
    assert_eq!(first.cluster_of(&id("q")).unwrap().id, ClusterId::from("cluster_3"));
    assert_eq!(first.cluster_of(&id("x")).unwrap().id, ClusterId::from("cluster_4"));
}
