// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde::Deserialize;

use crate::{
    Error, Inputs, Node, NodeHandle, NodeId, NodeKind, Result, SourceNode, StreamKey,
    StreamMetadata,
};

pub const DEFAULT_RTMP_PORT: u16 = 1935;

const VIDEO_STREAM_ID: u32 = 256;
const AUDIO_STREAM_ID: u32 = 257;

#[derive(Debug, Clone, Deserialize)]
pub struct RtmpServerSettings {
    pub id: NodeId,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_RTMP_PORT
}

impl RtmpServerSettings {
    /// # Errors
    ///
    /// Fails if the port is zero.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::invalid(&self.id, "port must not be zero"));
        }
        Ok(())
    }
}

/// RTMP server input.
///
/// Announces one video and one audio stream while a publisher is connected.
#[derive(Debug, Clone)]
pub struct RtmpServerInput {
    node: NodeHandle,
    settings: RtmpServerSettings,
}

impl RtmpServerInput {
    #[must_use]
    pub fn settings(&self) -> &RtmpServerSettings {
        &self.settings
    }

    /// A publisher connected and streams under `source_name`.
    pub fn publish(&self, source_name: &str) {
        if self.node.is_closed() {
            warn!("'{}' is closed, ignoring publisher", self.node.id());
            return;
        }
        info!(
            "'{}' receives publisher '{source_name}' on port {}",
            self.node.id(),
            self.settings.port
        );
        self.node.announce(vec![
            StreamMetadata::video(StreamKey::new(source_name, VIDEO_STREAM_ID)),
            StreamMetadata::audio(StreamKey::new(source_name, AUDIO_STREAM_ID)),
        ]);
    }

    /// The publisher disconnected.
    pub fn unpublish(&self) {
        info!("'{}' lost its publisher", self.node.id());
        self.node.announce(Vec::new());
    }
}

impl Node for RtmpServerInput {
    fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl SourceNode for RtmpServerInput {}

impl Inputs<'_> {
    /// Create an RTMP server input.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the id is taken.
    pub async fn rtmp_server(&self, settings: RtmpServerSettings) -> Result<RtmpServerInput> {
        settings.validate()?;
        let node = self
            .client
            .register(&settings.id, NodeKind::Input, "rtmp_server")?;

        Ok(RtmpServerInput { node, settings })
    }
}
