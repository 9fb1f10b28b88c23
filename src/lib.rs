//! # storygraph: Dual-Layer Post Graph Clustering
//!
//! Builds a similarity graph over news posts from two independent relation
//! layers and clusters it interactively around a focus post.
//!
//! ## Design Principles
//!
//! 1. **Pure passes, thin shell**: building, distances and assignment are
//!    free functions over borrowed data; [`GraphEngine`] only stores results
//! 2. **Snapshots out**: renderers only ever see an owned [`GraphSnapshot`]
//! 3. **Full overwrite**: every clustering call recomputes the assignment
//!    from scratch
//! 4. **Explicit notifications**: observers are registered on the engine and
//!    called synchronously, in registration order
//!
//! ## Quick Start
//!
//! ```rust
//! use storygraph::{GraphEngine, LayerMode, NodeId, Post};
//!
//! # fn example() -> storygraph::Result<()> {
//! let posts = vec![
//!     Post::new("a").with_embedding(vec![1.0, 0.0]).with_actors(["ceo"]),
//!     Post::new("b").with_embedding(vec![0.9, 0.1]).with_actors(["ceo"]),
//!     Post::new("c").with_embedding(vec![0.0, 1.0]),
//! ];
//!
//! let mut engine = GraphEngine::new();
//! engine.initialize(&posts, &[], &[]);
//!
//! let snapshot = engine.cluster_around_node(&NodeId::from("a"), 1.0, LayerMode::Combined)?;
//! assert!(snapshot.cluster_of(&NodeId::from("b")).is_some());
//! assert!(snapshot.node(&NodeId::from("c")).unwrap().cluster_id.is_none());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Layers
//!
//! | Layer | Relation | Weight |
//! |-------|----------|--------|
//! | 1 | embedding cosine similarity | similarity, clamped to [0, 1] |
//! | 2 | shared actors | Jaccard overlap + relationship bonus |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod scoring;
pub mod builder;
pub mod distance;
pub mod assign;
pub mod observer;
pub mod engine;
pub mod shared;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Post, Actor, ActorId, ActorRelationship,
    Node, NodeId, Layer1Connection, Layer2Connection,
    Edge, EdgeLayer, Cluster, ClusterId,
    GraphSnapshot, SnapshotNode, SnapshotCluster, SnapshotMetadata,
};

// ============================================================================
// Re-exports: Passes
// ============================================================================

pub use config::{ClusteringConfig, ConfigUpdate};
pub use scoring::{cosine_similarity, shared_actor_weight, RelationshipIndex};
pub use builder::{build_graph, Graph, GraphMetadata};
pub use distance::{distances_from, DistanceEntry, DistanceMap, LayerMode};
pub use assign::{assign_clusters, combined_weight, ClusterAssignment};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use engine::GraphEngine;
pub use shared::SharedGraphEngine;
pub use observer::{GraphEvent, GraphObserver, SubscriptionId};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Graph not initialized")]
    NotInitialized,

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid layer mode: {0} (expected layer1, layer2 or combined)")]
    InvalidLayerMode(String),

    #[error("Invalid cluster level: {0}")]
    InvalidClusterLevel(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
