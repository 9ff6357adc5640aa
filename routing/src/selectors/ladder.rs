// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use std::borrow::Cow;

use crate::{video_stream_keys, Selection, SourceSelector, StreamMetadata};

/// Selects the video stream of one ladder rung.
///
/// The ladder announces its renditions one after another. Nothing is selected
/// until all `rung_count` renditions are present, after that the keys whose
/// rendition name equals `rendition` are selected (which may be none).
#[derive(Debug, Clone)]
pub struct LadderItem {
    pub rendition: String,
    pub rung_count: usize,
}

impl SourceSelector for LadderItem {
    fn select(&self, streams: &[StreamMetadata]) -> Selection {
        let video = video_stream_keys(streams);
        if video.len() != self.rung_count {
            return Selection::NotReady;
        }

        Selection::Keys(
            video
                .into_iter()
                .filter(|key| key.rendition_name == self.rendition)
                .collect(),
        )
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("ladder_item({})", self.rendition))
    }
}

#[must_use]
pub fn ladder_item(rendition: impl Into<String>, rung_count: usize) -> LadderItem {
    LadderItem {
        rendition: rendition.into(),
        rung_count,
    }
}
