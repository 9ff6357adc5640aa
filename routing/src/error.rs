// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Errors raised by the engine.

use crate::NodeId;

/// Failures of node construction, subscription and teardown.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node with the same id is already registered with the client.
    #[error("a node with the id '{0}' already exists")]
    DuplicateNode(NodeId),

    /// The node id is not (or no longer) registered with the client.
    #[error("there is no node with the id '{0}'")]
    UnknownNode(NodeId),

    /// Settings handed to a node factory were rejected.
    #[error("invalid settings for node '{node}': {reason}")]
    InvalidSettings { node: NodeId, reason: String },

    /// The node has been closed and can no longer be used.
    #[error("node '{0}' has been closed")]
    Closed(NodeId),

    /// A base URL or an URL derived from it could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The client has been shut down.
    #[error("the client has been shut down")]
    Shutdown,
}

impl Error {
    pub(crate) fn invalid(node: &NodeId, reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            node: node.clone(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
