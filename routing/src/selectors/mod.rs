// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Source selectors.
//!
//! A selector decides which of the sub-streams announced by a source node
//! flow into a subscription. Selectors are evaluated by the router whenever
//! the source announces new metadata, possibly from several tasks at once,
//! so every implementation must be a pure function of the snapshot it gets.

use std::{borrow::Cow, collections::BTreeMap};

use crate::{StreamKey, StreamMetadata};

mod basic;
mod ladder;
mod pin;

pub use basic::*;
pub use ladder::*;
pub use pin::*;

/// Mapping from a pin name of a compose node to the keys feeding it.
pub type PinToKey = BTreeMap<String, Vec<StreamKey>>;

/// Result of one selector evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No match yet, retry on the next metadata change.
    #[default]
    NotReady,
    /// Ordered keys for a stream subscription.
    Keys(Vec<StreamKey>),
    /// Keys per pin for a pin subscription.
    Pins(PinToKey),
}

impl Selection {
    /// Selected keys, empty unless this is a [`Selection::Keys`].
    #[must_use]
    pub fn keys(&self) -> &[StreamKey] {
        match self {
            Selection::Keys(keys) => keys,
            Selection::NotReady | Selection::Pins(_) => &[],
        }
    }

    #[must_use]
    pub fn pins(&self) -> Option<&PinToKey> {
        match self {
            Selection::Pins(pins) => Some(pins),
            Selection::NotReady | Selection::Keys(_) => None,
        }
    }

    /// true if the selection contributes at least one stream
    #[must_use]
    pub fn is_ready(&self) -> bool {
        match self {
            Selection::NotReady => false,
            Selection::Keys(keys) => !keys.is_empty(),
            Selection::Pins(pins) => pins.values().any(|keys| !keys.is_empty()),
        }
    }
}

/// Trait of a function choosing sub-streams out of a metadata snapshot.
pub trait SourceSelector: Send + Sync + 'static {
    /// Evaluate the selector against the streams a source currently announces.
    ///
    /// Must not block and must return the same result for the same snapshot.
    fn select(&self, streams: &[StreamMetadata]) -> Selection;

    /// Name used in logs and DOT graphs.
    fn name(&self) -> Cow<'static, str>;
}

/// Selector backed by a closure.
pub struct FnSelector<F> {
    name: &'static str,
    select: F,
}

impl<F> std::fmt::Debug for FnSelector<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSelector").field("name", &self.name).finish()
    }
}

impl<F> SourceSelector for FnSelector<F>
where
    F: Fn(&[StreamMetadata]) -> Selection + Send + Sync + 'static,
{
    fn select(&self, streams: &[StreamMetadata]) -> Selection {
        (self.select)(streams)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.name)
    }
}

/// Wrap a pure closure as a selector.
#[must_use]
pub fn selector_fn<F>(name: &'static str, select: F) -> FnSelector<F>
where
    F: Fn(&[StreamMetadata]) -> Selection + Send + Sync + 'static,
{
    FnSelector { name, select }
}
