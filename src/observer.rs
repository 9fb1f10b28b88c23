//! Change notifications.
//!
//! Observers are called synchronously, in registration order, after every
//! successful state change, with the event and the fresh snapshot. A failed
//! operation notifies nobody.
//!
//! On a bare [`GraphEngine`](crate::GraphEngine) the callback runs inside the
//! changing call. Through [`SharedGraphEngine`](crate::SharedGraphEngine) it
//! runs after the engine lock is released, so it may call back into the
//! handle.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::distance::LayerMode;
use crate::model::{ClusterId, GraphSnapshot, NodeId};

/// What changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent {
    Initialized { nodes: usize, layer1_edges: usize, layer2_edges: usize },
    Clustered { focus: NodeId, level: f64, mode: LayerMode },
    /// `cluster` is `None` for a full reset.
    Declustered { cluster: Option<ClusterId> },
    ConfigUpdated,
}

/// Receiver of engine change notifications.
pub trait GraphObserver: Send {
    fn on_graph_event(&mut self, event: &GraphEvent, snapshot: &GraphSnapshot);
}

impl<F> GraphObserver for F
where
    F: FnMut(&GraphEvent, &GraphSnapshot) + Send,
{
    fn on_graph_event(&mut self, event: &GraphEvent, snapshot: &GraphSnapshot) {
        self(event, snapshot)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Observer slot shared between a registry and an in-flight delivery.
pub(crate) type SharedObserver = Arc<Mutex<dyn GraphObserver>>;

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(SubscriptionId, SharedObserver)>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(&mut self, observer: impl GraphObserver + 'static) -> SubscriptionId {
        let observer: SharedObserver = Arc::new(Mutex::new(observer));
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.observers.iter().any(|(sid, _)| *sid == id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Current subscribers in registration order.
    pub(crate) fn entries(&self) -> Vec<(SubscriptionId, SharedObserver)> {
        self.observers.clone()
    }

    pub(crate) fn notify(&self, event: &GraphEvent, snapshot: &GraphSnapshot) {
        for (_, observer) in &self.observers {
            observer.lock().on_graph_event(event, snapshot);
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}
