// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde::Deserialize;
use url::Url;

use crate::{Error, MediaKind, Node, NodeHandle, NodeId, NodeKind, Outputs, Result, SinkNode};

const DEFAULT_PART_DURATION_SECONDS: f64 = 1.0;
const DEFAULT_SEGMENT_DURATION_SECONDS: f64 = 4.0;

#[derive(Debug, Clone, Deserialize)]
pub struct HlsMasterSettings {
    pub id: NodeId,
    pub playlist_name: String,
}

impl HlsMasterSettings {
    /// # Errors
    ///
    /// Fails if the playlist name is empty or contains a path separator.
    pub fn validate(&self) -> Result<()> {
        if self.playlist_name.is_empty() || self.playlist_name.contains('/') {
            return Err(Error::invalid(
                &self.id,
                format!("invalid playlist name '{}'", self.playlist_name),
            ));
        }
        Ok(())
    }
}

/// Segmenting parameters of a media playlist.
#[derive(Debug, Clone, Deserialize)]
pub struct HlsSegmentSettings {
    pub id: NodeId,
    #[serde(default = "default_part_duration")]
    pub part_duration_seconds: f64,
    #[serde(default = "default_segment_duration")]
    pub segment_duration_seconds: f64,
}

fn default_part_duration() -> f64 {
    DEFAULT_PART_DURATION_SECONDS
}

fn default_segment_duration() -> f64 {
    DEFAULT_SEGMENT_DURATION_SECONDS
}

impl HlsSegmentSettings {
    #[must_use]
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            part_duration_seconds: DEFAULT_PART_DURATION_SECONDS,
            segment_duration_seconds: DEFAULT_SEGMENT_DURATION_SECONDS,
        }
    }

    /// # Errors
    ///
    /// Fails unless `0 < part_duration_seconds <= segment_duration_seconds`.
    pub fn validate(&self) -> Result<()> {
        let part = self.part_duration_seconds;
        let segment = self.segment_duration_seconds;
        if !(part.is_finite() && segment.is_finite() && part > 0.0 && part <= segment) {
            return Err(Error::invalid(
                &self.id,
                format!("part duration {part}s and segment duration {segment}s do not satisfy 0 < part <= segment"),
            ));
        }
        Ok(())
    }
}

/// HLS master playlist referencing the media playlists of its streams.
#[derive(Debug, Clone)]
pub struct HlsMasterOutput {
    node: NodeHandle,
    settings: HlsMasterSettings,
    playlist_url: Url,
}

impl HlsMasterOutput {
    #[must_use]
    pub fn settings(&self) -> &HlsMasterSettings {
        &self.settings
    }

    #[must_use]
    pub fn playlist_url(&self) -> &Url {
        &self.playlist_url
    }
}

impl Node for HlsMasterOutput {
    fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl SinkNode for HlsMasterOutput {}

/// HLS media playlist of either audio or video.
#[derive(Debug, Clone)]
pub struct HlsMediaOutput {
    node: NodeHandle,
    settings: HlsSegmentSettings,
    kind: MediaKind,
    playlist_url: Url,
}

impl HlsMediaOutput {
    #[must_use]
    pub fn settings(&self) -> &HlsSegmentSettings {
        &self.settings
    }

    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Playlist URL, resolves once a stream of the right kind is routed in.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Shutdown`] if the client shuts down first.
    pub async fn url(&self) -> Result<Url> {
        let kind = self.kind;
        self.node
            .wait_for_routed(|routed| routed.streams.iter().any(|stream| stream.kind == kind))
            .await?;
        Ok(self.playlist_url.clone())
    }
}

impl Node for HlsMediaOutput {
    fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl SinkNode for HlsMediaOutput {}

impl Outputs<'_> {
    /// Create a master playlist output.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the id is taken.
    pub async fn hls_master(&self, settings: HlsMasterSettings) -> Result<HlsMasterOutput> {
        settings.validate()?;
        let playlist_url = self
            .client
            .url(&format!("hls/{}/{}.m3u8", settings.id, settings.playlist_name))?;
        let node = self
            .client
            .register(&settings.id, NodeKind::Output, "hls_master")?;

        Ok(HlsMasterOutput {
            node,
            settings,
            playlist_url,
        })
    }

    /// Create an audio media playlist output.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the id is taken.
    pub async fn hls_audio(&self, settings: HlsSegmentSettings) -> Result<HlsMediaOutput> {
        self.hls_media(settings, MediaKind::Audio, "hls_audio")
    }

    /// Create a video media playlist output.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the id is taken.
    pub async fn hls_video(&self, settings: HlsSegmentSettings) -> Result<HlsMediaOutput> {
        self.hls_media(settings, MediaKind::Video, "hls_video")
    }

    fn hls_media(
        &self,
        settings: HlsSegmentSettings,
        kind: MediaKind,
        type_name: &'static str,
    ) -> Result<HlsMediaOutput> {
        settings.validate()?;
        let playlist_url = self
            .client
            .url(&format!("hls/{}/playlist.m3u8", settings.id))?;
        let node = self
            .client
            .register(&settings.id, NodeKind::Output, type_name)?;

        Ok(HlsMediaOutput {
            node,
            settings,
            kind,
            playlist_url,
        })
    }
}
