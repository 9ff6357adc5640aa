// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde::Deserialize;
use url::Url;

use crate::{Duplexes, Node, NodeHandle, NodeId, NodeKind, Result, SinkNode, SourceNode};

#[derive(Debug, Clone, Deserialize)]
pub struct LocalWebRtcSettings {
    pub id: NodeId,
}

/// WebRTC endpoint with a local test player.
#[derive(Debug, Clone)]
pub struct LocalWebRtc {
    node: NodeHandle,
    player_url: Url,
}

impl LocalWebRtc {
    #[must_use]
    pub fn player_url(&self) -> &Url {
        &self.player_url
    }
}

impl Node for LocalWebRtc {
    fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl SinkNode for LocalWebRtc {}
impl SourceNode for LocalWebRtc {}

impl Duplexes<'_> {
    /// Create a local WebRTC duplex node.
    ///
    /// # Errors
    ///
    /// Fails if the id is taken.
    pub async fn local_webrtc(&self, settings: LocalWebRtcSettings) -> Result<LocalWebRtc> {
        let player_url = self
            .client
            .url(&format!("webrtc/{}/player.html", settings.id))?;
        let node = self
            .client
            .register(&settings.id, NodeKind::Duplex, "local_webrtc")?;

        Ok(LocalWebRtc { node, player_url })
    }
}
