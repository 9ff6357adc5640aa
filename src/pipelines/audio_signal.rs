// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use anyhow::{Context, Result};
use routing::{
    select_audio, AudioSignalInput, AudioSignalSettings, ChannelLayout, Client, HlsMediaOutput,
    SinkNode, Subscription, Wave,
};
use tokio::task::JoinHandle;

use crate::settings::Settings;

/// Sine tone packaged as HLS audio.
pub struct AudioSignalPipeline {
    pub input: AudioSignalInput,
    pub output: HlsMediaOutput,
    pub url_logger: JoinHandle<()>,
}

fn signal_settings() -> AudioSignalSettings {
    AudioSignalSettings {
        id: "audio-signal".into(),
        source_name: "signal".to_owned(),
        channel_layout: ChannelLayout::Stereo,
        sample_rate: 48_000,
        wave: Wave::sine(440.0),
    }
}

pub async fn build(client: &Client, settings: &Settings) -> Result<AudioSignalPipeline> {
    let input = client
        .input()
        .audio_signal(signal_settings())
        .await
        .context("failed to create audio signal")?;
    let output = client
        .output()
        .hls_audio(settings.hls.segments("hls-audio"))
        .await
        .context("failed to create hls audio output")?;

    output.subscribe(vec![Subscription::new(&input, select_audio())])?;

    let url_logger = super::log_playlist_url(output.clone());

    Ok(AudioSignalPipeline {
        input,
        output,
        url_logger,
    })
}
