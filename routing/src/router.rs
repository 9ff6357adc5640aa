// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Subscription router.
//!
//! Every downstream node owns one list of [`Subscription`]s. The router keeps
//! the node's [`Routed`] streams equal to what the selectors currently pick
//! from their sources and re-evaluates whenever one of those sources announces
//! new metadata.

use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

use futures::future::select_all;
use tokio::sync::watch;

use crate::{NodeHandle, NodeId, Selection, SourceNode, SourceSelector, StreamKey, StreamMetadata};

/// Selects streams of `source` for a downstream node.
#[derive(Clone)]
pub struct Subscription {
    pub(crate) source: NodeHandle,
    pub(crate) selector: Arc<dyn SourceSelector>,
}

impl Subscription {
    pub fn new(source: &impl SourceNode, selector: impl SourceSelector) -> Self {
        Self {
            source: source.node().clone(),
            selector: Arc::new(selector),
        }
    }

    /// Like [`Subscription::new`] for a selector shared between subscriptions.
    pub fn shared(source: &impl SourceNode, selector: Arc<dyn SourceSelector>) -> Self {
        Self {
            source: source.node().clone(),
            selector,
        }
    }

    #[must_use]
    pub fn source_id(&self) -> &NodeId {
        self.source.id()
    }

    #[must_use]
    pub fn selector(&self) -> &dyn SourceSelector {
        self.selector.as_ref()
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("source", self.source.id())
            .field("selector", &self.selector.name())
            .finish()
    }
}

/// How the selections of a subscription list are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionMode {
    /// Flat, ordered list of streams.
    Streams,
    /// Streams grouped by the pin they feed.
    Pins,
}

/// Streams currently flowing into a downstream node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routed {
    pub streams: Vec<StreamMetadata>,
    pub pins: BTreeMap<String, Vec<StreamMetadata>>,
}

impl Routed {
    #[must_use]
    pub fn keys(&self) -> Vec<StreamKey> {
        self.streams.iter().map(|stream| stream.key.clone()).collect()
    }

    #[must_use]
    pub fn pin(&self, pin: &str) -> &[StreamMetadata] {
        self.pins.get(pin).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty() && self.pins.values().all(Vec::is_empty)
    }

    pub fn videos(&self) -> impl Iterator<Item = &StreamMetadata> {
        self.streams.iter().filter(|stream| stream.is_video())
    }

    pub fn audios(&self) -> impl Iterator<Item = &StreamMetadata> {
        self.streams.iter().filter(|stream| stream.is_audio())
    }
}

/// Evaluate every selector against its source snapshot and merge the results.
///
/// Selections which are not ready contribute nothing. Results of the wrong
/// shape for `mode` and keys the source does not announce are dropped.
pub fn evaluate<'a, I>(mode: SubscriptionMode, inputs: I) -> Routed
where
    I: IntoIterator<Item = (&'a [StreamMetadata], &'a dyn SourceSelector)>,
{
    let mut routed = Routed::default();

    for (streams, selector) in inputs {
        match (mode, selector.select(streams)) {
            (_, Selection::NotReady) => {
                trace!("{} not ready", selector.name());
            }
            (SubscriptionMode::Streams, Selection::Keys(keys)) => {
                for stream in resolve(streams, &keys, selector) {
                    if !routed.streams.contains(&stream) {
                        routed.streams.push(stream);
                    }
                }
            }
            (SubscriptionMode::Pins, Selection::Pins(pins)) => {
                for (pin, keys) in pins {
                    let resolved = resolve(streams, &keys, selector);
                    let entry = routed.pins.entry(pin).or_default();
                    for stream in resolved {
                        if !entry.contains(&stream) {
                            entry.push(stream);
                        }
                    }
                }
            }
            (SubscriptionMode::Streams, Selection::Pins(_)) => {
                warn!(
                    "{} returned pins for a stream subscription, ignoring",
                    selector.name()
                );
            }
            (SubscriptionMode::Pins, Selection::Keys(_)) => {
                warn!(
                    "{} returned keys for a pin subscription, ignoring",
                    selector.name()
                );
            }
        }
    }

    routed
}

fn resolve(
    streams: &[StreamMetadata],
    keys: &[StreamKey],
    selector: &dyn SourceSelector,
) -> Vec<StreamMetadata> {
    keys.iter()
        .filter_map(|key| {
            let found = streams.iter().find(|stream| &stream.key == key).cloned();
            if found.is_none() {
                warn!(
                    "{} selected '{key}' which is not announced",
                    selector.name()
                );
            }
            found
        })
        .collect()
}

/// Keep `target`'s routed streams in line with `subscriptions` until the
/// client shuts down or a source disappears.
///
/// Results are published for `generation` only, a re-subscribe or close of
/// `target` makes them stale.
pub(crate) async fn run(
    target: NodeHandle,
    generation: u64,
    mode: SubscriptionMode,
    subscriptions: Vec<Subscription>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(
        "routing {} subscription(s) into '{}'",
        subscriptions.len(),
        target.id()
    );

    let mut sources: Vec<_> = subscriptions
        .iter()
        .map(|subscription| subscription.source.announcements())
        .collect();

    loop {
        if *shutdown.borrow() {
            break;
        }

        let snapshots: Vec<Vec<StreamMetadata>> = sources
            .iter_mut()
            .map(|source| source.borrow_and_update().clone())
            .collect();

        let routed = evaluate(
            mode,
            snapshots
                .iter()
                .zip(&subscriptions)
                .map(|(streams, subscription)| {
                    (streams.as_slice(), subscription.selector.as_ref())
                }),
        );
        target.publish_routed(generation, routed);

        if sources.is_empty() {
            _ = shutdown.changed().await;
            break;
        }

        let changes = sources.iter_mut().map(|source| Box::pin(source.changed()));
        tokio::select! {
            _ = shutdown.changed() => break,
            (result, index, _) = select_all(changes) => {
                if result.is_err() {
                    debug!(
                        "source '{}' of '{}' is gone, stop routing",
                        subscriptions[index].source.id(),
                        target.id()
                    );
                    break;
                }
            }
        }
    }

    trace!("routing into '{}' stopped", target.id());
}
