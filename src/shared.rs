//! Thread-safe handle to a [`GraphEngine`].
//!
//! Each call holds the engine lock for the whole operation, so overlapping
//! requests from several threads run one after another, in lock order.
//! The last call to finish still wins: serializing does not merge intents.
//!
//! Observers never run under the engine lock. The engine queues each
//! `(event, snapshot)` pair; the handle moves the queue to an outbox before
//! releasing the lock and delivers it afterwards. One caller delivers at a
//! time, so an observer may call back into the handle: events raised by
//! such a nested call are delivered after the current callback returns.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::{ClusteringConfig, ConfigUpdate};
use crate::distance::LayerMode;
use crate::engine::GraphEngine;
use crate::model::*;
use crate::observer::{GraphEvent, GraphObserver, ObserverRegistry, SubscriptionId};
use crate::Result;

#[derive(Debug)]
struct Inner {
    engine: Mutex<GraphEngine>,
    observers: Mutex<ObserverRegistry>,
    outbox: Mutex<VecDeque<(GraphEvent, GraphSnapshot)>>,
    delivering: AtomicBool,
}

/// Cloneable, lock-serialized engine handle.
#[derive(Debug, Clone)]
pub struct SharedGraphEngine {
    inner: Arc<Inner>,
}

impl Default for SharedGraphEngine {
    fn default() -> Self {
        Self::new(GraphEngine::new())
    }
}

impl SharedGraphEngine {
    /// Wrap `engine`. Observers already subscribed on it move to the handle.
    pub fn new(mut engine: GraphEngine) -> Self {
        let observers = engine.defer_events();
        Self {
            inner: Arc::new(Inner {
                engine: Mutex::new(engine),
                observers: Mutex::new(observers),
                outbox: Mutex::new(VecDeque::new()),
                delivering: AtomicBool::new(false),
            }),
        }
    }

    pub fn initialize(
        &self,
        posts: &[Post],
        actors: &[Actor],
        relationships: &[ActorRelationship],
    ) -> GraphSnapshot {
        self.run(|engine| engine.initialize(posts, actors, relationships))
    }

    pub fn cluster_around_node(&self, focus: &NodeId, level: f64, mode: LayerMode) -> Result<GraphSnapshot> {
        self.run(|engine| engine.cluster_around_node(focus, level, mode))
    }

    pub fn set_cluster_level(&self, level: f64) -> Result<GraphSnapshot> {
        self.run(|engine| engine.set_cluster_level(level))
    }

    pub fn set_layer_mode(&self, mode: LayerMode) -> Result<GraphSnapshot> {
        self.run(|engine| engine.set_layer_mode(mode))
    }

    pub fn decluster(&self, cluster: Option<&ClusterId>) -> Result<GraphSnapshot> {
        self.run(|engine| engine.decluster(cluster))
    }

    pub fn export_snapshot(&self) -> Result<GraphSnapshot> {
        self.inner.engine.lock().export_snapshot()
    }

    /// Returns the merged configuration.
    pub fn update_config(&self, update: &ConfigUpdate) -> Result<ClusteringConfig> {
        self.run(|engine| engine.update_config(update).cloned())
    }

    /// Register `observer`. Callbacks run after the engine lock is
    /// released, possibly on the thread of another caller.
    pub fn subscribe(&self, observer: impl GraphObserver + 'static) -> SubscriptionId {
        self.inner.observers.lock().subscribe(observer)
    }

    /// Returns false if `id` was not subscribed. Takes effect for events
    /// not yet delivered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.lock().unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// Events raised inside `f` reach the handle's observers. Observers
    /// subscribed on the engine from inside `f` are never called.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut GraphEngine) -> R) -> R {
        self.run(f)
    }

    fn run<R>(&self, op: impl FnOnce(&mut GraphEngine) -> R) -> R {
        let result = {
            let mut engine = self.inner.engine.lock();
            let result = op(&mut *engine);
            let events = engine.take_events();
            if !events.is_empty() {
                self.inner.outbox.lock().extend(events);
            }
            result
        };
        self.deliver_pending();
        result
    }

    /// Drain the outbox unless another caller already is.
    fn deliver_pending(&self) {
        loop {
            if self.inner.delivering.swap(true, Ordering::AcqRel) {
                return;
            }
            loop {
                let next = self.inner.outbox.lock().pop_front();
                let Some((event, snapshot)) = next else { break };
                self.deliver(&event, &snapshot);
            }
            self.inner.delivering.store(false, Ordering::Release);
            // events queued between the last pop and the store above
            if self.inner.outbox.lock().is_empty() {
                return;
            }
        }
    }

    fn deliver(&self, event: &GraphEvent, snapshot: &GraphSnapshot) {
        let observers = self.inner.observers.lock().entries();
        for (id, observer) in observers {
            if !self.inner.observers.lock().contains(id) {
                continue;
            }
            observer.lock().on_graph_event(event, snapshot);
        }
    }
}

impl From<GraphEngine> for SharedGraphEngine {
    fn from(engine: GraphEngine) -> Self {
        Self::new(engine)
    }
}
