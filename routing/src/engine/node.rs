// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Node handles.

use core::fmt::{Debug, Display};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};
use tokio::{sync::watch, task::JoinHandle};

use super::Shared;
use crate::{router, Error, Result, Routed, StreamMetadata, Subscription, SubscriptionMode};

/// Unique name of a node within one client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Role of a node within a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Input,
    Processor,
    Output,
    Duplex,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Input => write!(f, "input"),
            NodeKind::Processor => write!(f, "processor"),
            NodeKind::Output => write!(f, "output"),
            NodeKind::Duplex => write!(f, "duplex"),
        }
    }
}

/// Task driving a node, and the generation it was started for.
///
/// Results of a task are only published while its generation is current.
#[derive(Default)]
struct Driver {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Driver {
    fn restart(&mut self, spawn: impl FnOnce(u64) -> JoinHandle<()>) {
        self.stop();
        self.task = Some(spawn(self.generation));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
    }
}

pub(crate) struct NodeCore {
    id: NodeId,
    kind: NodeKind,
    type_name: &'static str,
    /// streams this node currently produces
    announced: watch::Sender<Vec<StreamMetadata>>,
    /// streams currently routed into this node
    routed: watch::Sender<Routed>,
    subscriptions: Mutex<Vec<Subscription>>,
    /// guards publishing into `routed`
    routing: Mutex<Driver>,
    /// guards publishing into `announced`
    behaviour: Mutex<Driver>,
    closed: AtomicBool,
}

/// Shared handle of a node registered with a [`Client`](crate::Client).
#[derive(Clone)]
pub struct NodeHandle {
    core: Arc<NodeCore>,
    shared: Weak<Shared>,
}

impl Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("id", &self.core.id)
            .field("kind", &self.core.kind)
            .field("type", &self.core.type_name)
            .finish()
    }
}

impl NodeHandle {
    pub(crate) fn new(
        id: NodeId,
        kind: NodeKind,
        type_name: &'static str,
        shared: Weak<Shared>,
    ) -> Self {
        let (announced, _) = watch::channel(Vec::new());
        let (routed, _) = watch::channel(Routed::default());

        Self {
            core: Arc::new(NodeCore {
                id,
                kind,
                type_name,
                announced,
                routed,
                subscriptions: Mutex::new(Vec::new()),
                routing: Mutex::default(),
                behaviour: Mutex::default(),
                closed: AtomicBool::new(false),
            }),
            shared,
        }
    }

    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.core.id
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.core.kind
    }

    /// Factory name of the node, e.g. `rtmp_server`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.core.type_name
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.core.closed.load(Ordering::Acquire)
    }

    /// Snapshot of the streams this node currently announces.
    #[must_use]
    pub fn announced(&self) -> Vec<StreamMetadata> {
        self.core.announced.borrow().clone()
    }

    /// Snapshot of the streams currently routed into this node.
    #[must_use]
    pub fn routed(&self) -> Routed {
        self.core.routed.borrow().clone()
    }

    /// Current subscriptions of this node.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.core.subscriptions.lock().clone()
    }

    /// Wait until the routed streams satisfy `ready`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Shutdown`] if the client shuts down first.
    pub async fn wait_for_routed(&self, ready: impl FnMut(&Routed) -> bool) -> Result<Routed> {
        let mut shutdown = self.shutdown_receiver()?;
        let mut routed = self.core.routed.subscribe();

        tokio::select! {
            result = routed.wait_for(ready) => {
                result
                    .map(|routed| routed.clone())
                    .map_err(|_| Error::Closed(self.id().clone()))
            }
            _ = shutdown.wait_for(|down| *down) => Err(Error::Shutdown),
        }
    }

    /// Wait until the node announces streams satisfying `ready`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Shutdown`] if the client shuts down first.
    pub async fn wait_for_announced(
        &self,
        ready: impl FnMut(&Vec<StreamMetadata>) -> bool,
    ) -> Result<Vec<StreamMetadata>> {
        let mut shutdown = self.shutdown_receiver()?;
        let mut announced = self.core.announced.subscribe();

        tokio::select! {
            result = announced.wait_for(ready) => {
                result
                    .map(|streams| streams.clone())
                    .map_err(|_| Error::Closed(self.id().clone()))
            }
            _ = shutdown.wait_for(|down| *down) => Err(Error::Shutdown),
        }
    }

    /// Tear the node down.
    ///
    /// Stops routing into the node, withdraws everything it announced so that
    /// downstream nodes re-evaluate, and frees its id.
    pub fn close(&self) {
        if self.core.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("closing node '{}'", self.id());

        {
            let mut routing = self.core.routing.lock();
            routing.stop();
            self.send_routed(Routed::default());
        }
        {
            let mut behaviour = self.core.behaviour.lock();
            behaviour.stop();
            self.send_announced(Vec::new());
        }
        self.core.subscriptions.lock().clear();

        if let Some(shared) = self.shared.upgrade() {
            shared.nodes.lock().remove(self.id());
        }
    }

    pub(crate) fn announcements(&self) -> watch::Receiver<Vec<StreamMetadata>> {
        self.core.announced.subscribe()
    }

    /// Replace the announced streams, ignored once the node is closed.
    pub(crate) fn announce(&self, streams: Vec<StreamMetadata>) {
        let _behaviour = self.core.behaviour.lock();
        if self.is_closed() {
            return;
        }
        self.send_announced(streams);
    }

    /// Announce `streams` on behalf of the behaviour task of `generation`.
    fn announce_derived(&self, generation: u64, streams: Vec<StreamMetadata>) {
        let behaviour = self.core.behaviour.lock();
        if behaviour.generation != generation || self.is_closed() {
            trace!("'{}' drops announcement of stale behaviour", self.id());
            return;
        }
        self.send_announced(streams);
    }

    /// Publish `routed` on behalf of the routing task of `generation`.
    pub(crate) fn publish_routed(&self, generation: u64, routed: Routed) {
        let routing = self.core.routing.lock();
        if routing.generation != generation || self.is_closed() {
            trace!("'{}' drops result of stale routing", self.id());
            return;
        }
        self.send_routed(routed);
    }

    /// Notifies subscribers on change only.
    fn send_announced(&self, streams: Vec<StreamMetadata>) {
        let modified = self.core.announced.send_if_modified(|current| {
            if *current == streams {
                false
            } else {
                *current = streams;
                true
            }
        });

        if modified {
            debug!(
                "'{}' announces {} stream(s)",
                self.id(),
                self.core.announced.borrow().len()
            );
        }
    }

    fn send_routed(&self, routed: Routed) {
        let modified = self.core.routed.send_if_modified(|current| {
            if *current == routed {
                false
            } else {
                *current = routed;
                true
            }
        });

        if modified {
            let routed = self.core.routed.borrow();
            debug!(
                "'{}' receives {} stream(s) on {} pin(s)",
                self.id(),
                routed.streams.len(),
                routed.pins.len()
            );
        }
    }

    /// Replace the subscriptions of this node and start routing them.
    ///
    /// # Errors
    ///
    /// Fails if the node has been closed or the client has been shut down.
    pub(crate) fn subscribe(
        &self,
        mode: SubscriptionMode,
        subscriptions: Vec<Subscription>,
    ) -> Result<()> {
        let shutdown = self.shutdown_receiver()?;

        let mut routing = self.core.routing.lock();
        if self.is_closed() {
            return Err(Error::Closed(self.id().clone()));
        }

        for subscription in &subscriptions {
            info!(
                "subscribe '{}' to '{}' using {}",
                self.id(),
                subscription.source_id(),
                subscription.selector.name()
            );
        }

        *self.core.subscriptions.lock() = subscriptions.clone();

        routing.restart(|generation| {
            tokio::spawn(router::run(
                self.clone(),
                generation,
                mode,
                subscriptions,
                shutdown,
            ))
        });

        Ok(())
    }

    /// Let the node announce `derive(routed)` whenever its routed streams change.
    ///
    /// Closes the node if that is not possible.
    ///
    /// # Errors
    ///
    /// Fails if the client has been shut down.
    pub(crate) fn derive_announcements<F>(self, derive: F) -> Result<Self>
    where
        F: Fn(&Routed) -> Vec<StreamMetadata> + Send + 'static,
    {
        let mut shutdown = match self.shutdown_receiver() {
            Ok(shutdown) => shutdown,
            Err(e) => {
                self.close();
                return Err(e);
            }
        };
        let mut routed = self.core.routed.subscribe();
        let node = self.clone();

        self.core.behaviour.lock().restart(|generation| {
            tokio::spawn(async move {
                loop {
                    let streams = derive(&routed.borrow_and_update());
                    node.announce_derived(generation, streams);

                    tokio::select! {
                        _ = shutdown.wait_for(|down| *down) => break,
                        result = routed.changed() => {
                            if result.is_err() {
                                break;
                            }
                        }
                    }
                }
            })
        });

        Ok(self)
    }

    fn shutdown_receiver(&self) -> Result<watch::Receiver<bool>> {
        let shared = self.shared.upgrade().ok_or(Error::Shutdown)?;
        if *shared.shutdown.borrow() {
            return Err(Error::Shutdown);
        }
        Ok(shared.shutdown.subscribe())
    }
}

/// Anything backed by a node of the client.
pub trait Node {
    fn node(&self) -> &NodeHandle;

    fn id(&self) -> &NodeId {
        self.node().id()
    }

    /// Tear the node down, see [`NodeHandle::close`].
    fn close(&self) {
        self.node().close();
    }
}

/// A node producing streams other nodes can subscribe to.
pub trait SourceNode: Node {
    /// Streams currently announced by this node.
    fn announced(&self) -> Vec<StreamMetadata> {
        self.node().announced()
    }
}

/// A node consuming streams selected from other nodes.
pub trait SinkNode: Node {
    /// Replace this node's subscriptions.
    ///
    /// # Errors
    ///
    /// Fails if the node has been closed or the client has been shut down.
    fn subscribe(&self, subscriptions: Vec<Subscription>) -> Result<()> {
        self.node()
            .subscribe(SubscriptionMode::Streams, subscriptions)
    }

    /// Streams currently routed into this node.
    fn routed(&self) -> Routed {
        self.node().routed()
    }
}
