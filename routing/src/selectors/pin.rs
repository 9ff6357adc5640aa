// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use std::borrow::Cow;

use crate::{video_stream_keys, PinToKey, Selection, SourceSelector, StreamMetadata};

/// Maps the single video stream of a source onto a compose pin.
///
/// Zero and several video streams are both treated as not ready.
#[derive(Debug, Clone)]
pub struct VideoToPin {
    pub pin: String,
}

impl SourceSelector for VideoToPin {
    fn select(&self, streams: &[StreamMetadata]) -> Selection {
        let video = video_stream_keys(streams);
        if video.len() != 1 {
            return Selection::NotReady;
        }

        let mut pins = PinToKey::new();
        pins.insert(self.pin.clone(), video);
        Selection::Pins(pins)
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("video_to_pin({})", self.pin))
    }
}

#[must_use]
pub fn video_to_pin(pin: impl Into<String>) -> VideoToPin {
    VideoToPin { pin: pin.into() }
}
