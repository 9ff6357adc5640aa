// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use std::borrow::Cow;

use crate::{audio_stream_keys, video_stream_keys, Selection, SourceSelector, StreamMetadata};

/// Selects every announced video stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectVideo;

/// Selects every announced audio stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAudio;

/// Selects every announced video stream followed by every audio stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAv;

/// Selects all video streams, but only once exactly `count` of them are announced.
///
/// Used to feed a master playlist from an encode ladder: a partial ladder
/// must not be published.
#[derive(Debug, Clone, Copy)]
pub struct SelectAllVideos {
    pub count: usize,
}

impl SourceSelector for SelectVideo {
    fn select(&self, streams: &[StreamMetadata]) -> Selection {
        Selection::Keys(video_stream_keys(streams))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("select_video")
    }
}

impl SourceSelector for SelectAudio {
    fn select(&self, streams: &[StreamMetadata]) -> Selection {
        Selection::Keys(audio_stream_keys(streams))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("select_audio")
    }
}

impl SourceSelector for SelectAv {
    fn select(&self, streams: &[StreamMetadata]) -> Selection {
        let mut keys = video_stream_keys(streams);
        keys.extend(audio_stream_keys(streams));
        Selection::Keys(keys)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("select_av")
    }
}

impl SourceSelector for SelectAllVideos {
    fn select(&self, streams: &[StreamMetadata]) -> Selection {
        let video = video_stream_keys(streams);
        if video.len() == self.count {
            Selection::Keys(video)
        } else {
            Selection::NotReady
        }
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("select_all_videos({})", self.count))
    }
}

#[must_use]
pub fn select_video() -> SelectVideo {
    SelectVideo
}

#[must_use]
pub fn select_audio() -> SelectAudio {
    SelectAudio
}

#[must_use]
pub fn select_av() -> SelectAv {
    SelectAv
}

#[must_use]
pub fn select_all_videos(count: usize) -> SelectAllVideos {
    SelectAllVideos { count }
}
