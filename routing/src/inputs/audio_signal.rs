// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use serde::Deserialize;

use crate::{
    Error, Inputs, Node, NodeHandle, NodeId, NodeKind, Result, SourceNode, StreamKey,
    StreamMetadata,
};

const SUPPORTED_SAMPLE_RATES: [u32; 11] = [
    8_000, 11_025, 12_000, 16_000, 22_050, 24_000, 32_000, 44_100, 48_000, 88_200, 96_000,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Mono,
    #[default]
    Stereo,
}

impl ChannelLayout {
    #[must_use]
    pub fn channels(&self) -> u32 {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }
}

/// Wave form of a generated signal.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Wave {
    Sine { frequency: f64 },
}

impl Wave {
    #[must_use]
    pub fn sine(frequency: f64) -> Self {
        Wave::Sine { frequency }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSignalSettings {
    pub id: NodeId,
    pub source_name: String,
    #[serde(default)]
    pub channel_layout: ChannelLayout,
    pub sample_rate: u32,
    pub wave: Wave,
}

impl AudioSignalSettings {
    /// # Errors
    ///
    /// Fails for unsupported sample rates and frequencies outside of
    /// `(0, sample_rate / 2)`.
    pub fn validate(&self) -> Result<()> {
        if self.source_name.is_empty() {
            return Err(Error::invalid(&self.id, "source name must not be empty"));
        }
        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(Error::invalid(
                &self.id,
                format!("unsupported sample rate {}", self.sample_rate),
            ));
        }

        let Wave::Sine { frequency } = self.wave;
        let nyquist = f64::from(self.sample_rate) / 2.0;
        if !(frequency > 0.0 && frequency < nyquist) {
            return Err(Error::invalid(
                &self.id,
                format!("frequency {frequency} Hz outside of (0, {nyquist}) Hz"),
            ));
        }

        Ok(())
    }
}

/// Generated audio signal, announces one audio stream right away.
#[derive(Debug, Clone)]
pub struct AudioSignalInput {
    node: NodeHandle,
    settings: AudioSignalSettings,
}

impl AudioSignalInput {
    #[must_use]
    pub fn settings(&self) -> &AudioSignalSettings {
        &self.settings
    }
}

impl Node for AudioSignalInput {
    fn node(&self) -> &NodeHandle {
        &self.node
    }
}

impl SourceNode for AudioSignalInput {}

impl Inputs<'_> {
    /// Create an audio signal generator.
    ///
    /// # Errors
    ///
    /// Fails if the settings are invalid or the id is taken.
    pub async fn audio_signal(&self, settings: AudioSignalSettings) -> Result<AudioSignalInput> {
        settings.validate()?;
        let node = self
            .client
            .register(&settings.id, NodeKind::Input, "audio_signal")?;

        debug!(
            "'{}' generates {:?} with {} channel(s) at {} Hz",
            settings.id,
            settings.wave,
            settings.channel_layout.channels(),
            settings.sample_rate
        );
        node.announce(vec![StreamMetadata::audio(StreamKey::new(
            settings.source_name.as_str(),
            1,
        ))]);

        Ok(AudioSignalInput { node, settings })
    }
}
