// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::{
    ladder_item, select_all_videos, Error, FrameRate, LadderItem, Node, NodeHandle, NodeId,
    NodeKind, Result, SelectAllVideos, SinkNode, Size, SourceNode, StreamMetadata, Transforms,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateControl {
    /// average bitrate
    Abr,
    /// constant bitrate
    Cbr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BitrateMode {
    /// bits per second
    pub value: u32,
    pub mode: RateControl,
}

impl BitrateMode {
    #[must_use]
    pub const fn abr(value: u32) -> Self {
        Self {
            value,
            mode: RateControl::Abr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Baseline,
    Main,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    #[default]
    Medium,
    Slow,
    Slower,
    Veryslow,
    Placebo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tune {
    Film,
    Animation,
    Zerolatency,
}

/// x264 encoder parameters of one rung.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct X264Codec {
    pub bitrate_mode: BitrateMode,
    pub key_frame_interval_max: u32,
    pub key_frame_interval_min: u32,
    #[serde(default)]
    pub bframes: u32,
    #[serde(default)]
    pub scene_cut: i32,
    pub profile: Option<Profile>,
    pub level: Option<f32>,
    pub preset: Option<Preset>,
    pub tune: Option<Tune>,
}

impl X264Codec {
    /// Low latency encoding with a fixed key frame interval.
    #[must_use]
    pub fn zero_latency(bitrate: u32, key_frame_interval: u32) -> Self {
        Self {
            bitrate_mode: BitrateMode::abr(bitrate),
            key_frame_interval_max: key_frame_interval,
            key_frame_interval_min: key_frame_interval,
            bframes: 0,
            scene_cut: 0,
            profile: None,
            level: None,
            preset: None,
            tune: Some(Tune::Zerolatency),
        }
    }
}

/// One quality tier of an encode ladder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LadderRung {
    /// rendition name of the encoded stream
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub frame_rate: FrameRate,
    pub codec: X264Codec,
}

impl LadderRung {
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoEncodeLadderSettings {
    pub id: NodeId,
    pub rungs: Vec<LadderRung>,
}

impl VideoEncodeLadderSettings {
    /// # Errors
    ///
    /// Fails for an empty ladder, duplicate rung names, empty sizes, invalid
    /// frame rates and key frame intervals with min > max.
    pub fn validate(&self) -> Result<()> {
        if self.rungs.is_empty() {
            return Err(Error::invalid(&self.id, "ladder needs at least one rung"));
        }

        let mut names = BTreeSet::new();
        for rung in &self.rungs {
            if !names.insert(rung.name.as_str()) {
                return Err(Error::invalid(
                    &self.id,
                    format!("rung name '{}' used twice", rung.name),
                ));
            }
            if rung.size().is_empty() {
                return Err(Error::invalid(
                    &self.id,
                    format!("rung '{}' has invalid size {}", rung.name, rung.size()),
                ));
            }
            if !rung.frame_rate.is_valid() {
                return Err(Error::invalid(
                    &self.id,
                    format!("rung '{}' has invalid frame rate", rung.name),
                ));
            }
            if rung.codec.key_frame_interval_min > rung.codec.key_frame_interval_max {
                return Err(Error::invalid(
                    &self.id,
                    format!("rung '{}' has key frame interval min > max", rung.name),
                ));
            }
        }

        Ok(())
    }
}

/// Encodes its video input once per rung.
///
/// Announces one video stream per rung, carrying the rung name as rendition,
/// as long as a video stream is routed in.
#[derive(Debug, Clone)]
pub struct VideoEncodeLadder {
    node: NodeHandle,
    settings: VideoEncodeLadderSettings,
}

impl VideoEncodeLadder {
    #[must_use]
    pub fn settings(&self) -> &VideoEncodeLadderSettings {
        &self.settings
    }

    #[must_use]
    pub fn rung_count(&self) -> usize {
        self.settings.rungs.len()
    }

    /// Selector for the rendition of the rung called `name`.
    #[must_use]
    pub fn rendition(&self, name: &str) -> LadderItem {
        ladder_item(name, self.rung_count())
    }

    /// Selector for all renditions of the complete ladder.
    #[must_use]
    pub fn all_renditions(&self) -> SelectAllVideos {
        select_all_videos(self.rung_count())
    }
}

impl Node for VideoEncodeLadder {
    fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl SourceNode for VideoEncodeLadder {}
impl SinkNode for VideoEncodeLadder {}

impl Transforms<'_> {
    /// Create an encode ladder.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the id is taken.
    pub async fn video_encode_ladder(
        &self,
        settings: VideoEncodeLadderSettings,
    ) -> Result<VideoEncodeLadder> {
        settings.validate()?;
        let node = self.client.register(
            &settings.id,
            NodeKind::Processor,
            "video_encode_ladder",
        )?;

        let rungs: Vec<String> = settings.rungs.iter().map(|rung| rung.name.clone()).collect();
        let node = node.derive_announcements(move |routed| {
            let Some(input) = routed.videos().next() else {
                return Vec::new();
            };
            rungs
                .iter()
                .map(|rung| StreamMetadata::video(input.key.clone().with_rendition(rung.as_str())))
                .collect()
        })?;

        Ok(VideoEncodeLadder { node, settings })
    }
}
