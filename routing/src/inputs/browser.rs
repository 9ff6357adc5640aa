// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde::Deserialize;
use url::Url;

use crate::{
    Error, FrameRate, Inputs, Node, NodeHandle, NodeId, NodeKind, Result, Size, SourceNode,
    StreamKey, StreamMetadata,
};

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserInputSettings {
    pub id: NodeId,
    /// page to render
    pub url: Url,
    pub resolution: Size,
    pub source_name: String,
    #[serde(default)]
    pub frame_rate: FrameRate,
}

impl BrowserInputSettings {
    /// # Errors
    ///
    /// Fails for empty resolutions, invalid frame rates and URLs which are
    /// neither `http(s)` nor `file`.
    pub fn validate(&self) -> Result<()> {
        if self.resolution.is_empty() {
            return Err(Error::invalid(
                &self.id,
                format!("invalid resolution {}", self.resolution),
            ));
        }
        if !self.frame_rate.is_valid() {
            return Err(Error::invalid(
                &self.id,
                format!("invalid frame rate {}", self.frame_rate),
            ));
        }
        if !matches!(self.url.scheme(), "http" | "https" | "file") {
            return Err(Error::invalid(
                &self.id,
                format!("unsupported url scheme '{}'", self.url.scheme()),
            ));
        }
        if self.source_name.is_empty() {
            return Err(Error::invalid(&self.id, "source name must not be empty"));
        }
        Ok(())
    }
}

/// Web page rendered into a video stream.
#[derive(Debug, Clone)]
pub struct BrowserInput {
    node: NodeHandle,
    settings: BrowserInputSettings,
}

impl BrowserInput {
    #[must_use]
    pub fn settings(&self) -> &BrowserInputSettings {
        &self.settings
    }
}

impl Node for BrowserInput {
    fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl SourceNode for BrowserInput {}

impl Inputs<'_> {
    /// Create a browser input rendering `settings.url`.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the id is taken.
    pub async fn browser(&self, settings: BrowserInputSettings) -> Result<BrowserInput> {
        settings.validate()?;
        let node = self
            .client
            .register(&settings.id, NodeKind::Input, "browser")?;

        debug!(
            "'{}' renders {} at {} @ {}",
            settings.id, settings.url, settings.resolution, settings.frame_rate
        );
        node.announce(vec![StreamMetadata::video(StreamKey::new(
            settings.source_name.as_str(),
            1,
        ))]);

        Ok(BrowserInput { node, settings })
    }
}
