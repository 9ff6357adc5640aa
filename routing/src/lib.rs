// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

/*!
    # Purpose
    The *routing* crate wires media pipelines out of so-called *nodes*. Every node announces the
    sub-streams it produces as [StreamMetadata] and downstream nodes declare [Subscription]s, pairs
    of a source node and a [SourceSelector], to pick the sub-streams that shall flow into them.

    - [Client]
    - [Subscription]
    - [SourceSelector]

    Whenever a source announces new metadata, the router re-evaluates every subscription
    referencing it and updates the [Routed] streams of the downstream node. A selector which
    finds nothing suitable yet returns [Selection::NotReady] and simply contributes nothing until
    a later announcement makes it ready.

    Encoding, packaging and transport are not done here. The engine only moves metadata and
    routing decisions.

    # Selectors

    - [SelectVideo], [SelectAudio] and [SelectAv]
      select every video and/or audio stream.
    - [SelectAllVideos]
      selects all video streams once a given number of them is announced.
    - [LadderItem]
      selects one rendition of a complete encode ladder.
    - [VideoToPin]
      maps the single video stream of a source onto a pin of a compose node.
    - [FnSelector]
      wraps a pure closure.

    # Nodes

    - Inputs: [RtmpServerInput], [AudioSignalInput], [BrowserInput]
    - Processors: [VideoEncodeLadder], [ComposeOverlay]
    - Outputs: [HlsMasterOutput], [HlsMediaOutput]
    - Duplex: [LocalWebRtc]

    Nodes are created through the factories of a [Client] (`client.input()`,
    `client.processor().transform()`, `client.output()`, `client.duplex()`) from plain settings
    values which are validated once at construction.

    # Generic traits

    - [Node]
      gives access to the [NodeHandle] of a node.
    - [SourceNode]
      is implemented by nodes other nodes can subscribe to.
    - [SinkNode]
      is implemented by nodes which subscribe to streams.

    # Debugging

    - [dot](debug::dot) and [dot_file](debug::dot_file)
      render the pipeline as DOT graph, written into `ROUTING_DEBUG_DUMP_DOT_DIR` when set.
*/

#![allow(clippy::module_name_repetitions)]

#[macro_use]
extern crate log;

mod engine;
mod error;
mod geometry;
mod inputs;
mod metadata;
mod outputs;
mod processors;
mod router;
mod selectors;

#[cfg(test)]
mod tests;

pub use engine::*;
pub use error::*;
pub use geometry::*;
pub use inputs::*;
pub use metadata::*;
pub use outputs::*;
pub use processors::*;
pub use router::{evaluate, Routed, Subscription, SubscriptionMode};
pub use selectors::*;

#[cfg(test)]
pub use tests::testing;
