// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Stream metadata announced by nodes.

use core::fmt::Display;

/// Elementary media carried by a sub-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    Video,
    Audio,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Identifies one elementary stream produced by a node.
///
/// Selectors treat keys as opaque values. Only the rendition name carries
/// meaning, it names the ladder rung a video stream was encoded for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey {
    pub source_name: String,
    pub program_number: u32,
    pub stream_id: u32,
    pub rendition_name: String,
}

impl StreamKey {
    pub const DEFAULT_RENDITION: &'static str = "default";

    #[must_use]
    pub fn new(source_name: impl Into<String>, stream_id: u32) -> Self {
        Self {
            source_name: source_name.into(),
            program_number: 1,
            stream_id,
            rendition_name: Self::DEFAULT_RENDITION.to_owned(),
        }
    }

    #[must_use]
    pub fn with_rendition(mut self, rendition_name: impl Into<String>) -> Self {
        self.rendition_name = rendition_name.into();
        self
    }
}

impl Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.source_name, self.program_number, self.stream_id, self.rendition_name
        )
    }
}

/// Description of one announced sub-stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamMetadata {
    pub key: StreamKey,
    pub kind: MediaKind,
}

impl StreamMetadata {
    #[must_use]
    pub fn video(key: StreamKey) -> Self {
        Self {
            key,
            kind: MediaKind::Video,
        }
    }

    #[must_use]
    pub fn audio(key: StreamKey) -> Self {
        Self {
            key,
            kind: MediaKind::Audio,
        }
    }

    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.kind == MediaKind::Audio
    }
}

impl Display for StreamMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.key, self.kind)
    }
}

/// Keys of all video streams, in announcement order.
#[must_use]
pub fn video_stream_keys(streams: &[StreamMetadata]) -> Vec<StreamKey> {
    keys_of(streams, MediaKind::Video)
}

/// Keys of all audio streams, in announcement order.
#[must_use]
pub fn audio_stream_keys(streams: &[StreamMetadata]) -> Vec<StreamKey> {
    keys_of(streams, MediaKind::Audio)
}

fn keys_of(streams: &[StreamMetadata], kind: MediaKind) -> Vec<StreamKey> {
    streams
        .iter()
        .filter(|stream| stream.kind == kind)
        .map(|stream| stream.key.clone())
        .collect()
}
