//! # Post Graph Model
//!
//! Plain DTOs shared by the builder, the clustering passes and the
//! exported snapshot. This module is pure data: no state, no logging.

pub mod post;
pub mod node;
pub mod edge;
pub mod cluster;
pub mod snapshot;

pub use post::{Post, Actor, ActorId, ActorRelationship};
pub use node::{Node, NodeId, Layer1Connection, Layer2Connection};
pub use edge::{Edge, EdgeLayer};
pub use cluster::{Cluster, ClusterId};
pub use snapshot::{
    GraphSnapshot, SnapshotNode, SnapshotCluster, SnapshotMetadata,
    SnapshotLayer1Connection, SnapshotLayer2Connection,
    POST_NODE_TYPE, POST_NODE_LAYER,
};
