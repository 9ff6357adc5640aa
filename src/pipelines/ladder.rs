// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! RTMP ingest re-encoded into an adaptive bitrate ladder.

use anyhow::{Context, Result};
use routing::{
    select_audio, select_video, Client, FrameRate, HlsMasterOutput, HlsMasterSettings,
    HlsMediaOutput, LadderRung, LocalWebRtc, LocalWebRtcSettings, Preset, Profile,
    RtmpServerInput, RtmpServerSettings, SinkNode, Subscription, VideoEncodeLadder,
    VideoEncodeLadderSettings, X264Codec,
};

use crate::settings::Settings;

const KEY_FRAME_INTERVAL: u32 = 50;

pub struct LadderPipeline {
    pub input: RtmpServerInput,
    pub ladder: VideoEncodeLadder,
    pub master: HlsMasterOutput,
    pub audio: HlsMediaOutput,
    /// one video playlist per rung, in rung order
    pub renditions: Vec<HlsMediaOutput>,
    pub webrtc: LocalWebRtc,
}

fn rung(name: &str, width: u32, height: u32, codec: X264Codec) -> LadderRung {
    LadderRung {
        name: name.to_owned(),
        width,
        height,
        frame_rate: FrameRate::FPS_25,
        codec,
    }
}

/// high 720p, medium 360p and low 180p
#[must_use]
pub fn rungs() -> Vec<LadderRung> {
    let high = X264Codec {
        bframes: 3,
        profile: Some(Profile::High),
        level: Some(4.1),
        preset: Some(Preset::Veryfast),
        ..X264Codec::zero_latency(8_000_000, KEY_FRAME_INTERVAL)
    };

    vec![
        rung("high", 1280, 720, high),
        rung(
            "medium",
            640,
            360,
            X264Codec::zero_latency(250_000, KEY_FRAME_INTERVAL),
        ),
        rung(
            "low",
            320,
            180,
            X264Codec::zero_latency(150_000, KEY_FRAME_INTERVAL),
        ),
    ]
}

pub async fn build(client: &Client, settings: &Settings) -> Result<LadderPipeline> {
    let input = client
        .input()
        .rtmp_server(RtmpServerSettings {
            id: "rtmp".into(),
            port: settings.rtmp.port,
        })
        .await
        .context("failed to create rtmp input")?;

    let ladder = client
        .processor()
        .transform()
        .video_encode_ladder(VideoEncodeLadderSettings {
            id: "ladder".into(),
            rungs: rungs(),
        })
        .await
        .context("failed to create encode ladder")?;

    let master = client
        .output()
        .hls_master(HlsMasterSettings {
            id: "master".into(),
            playlist_name: "master".to_owned(),
        })
        .await
        .context("failed to create hls master output")?;
    let audio = client
        .output()
        .hls_audio(settings.hls.segments("audio"))
        .await
        .context("failed to create hls audio output")?;

    let mut renditions = Vec::with_capacity(ladder.rung_count());
    for rung in &ladder.settings().rungs {
        let output = client
            .output()
            .hls_video(settings.hls.segments(&rung.name))
            .await
            .with_context(|| format!("failed to create hls output for '{}'", rung.name))?;
        output.subscribe(vec![Subscription::new(&ladder, ladder.rendition(&rung.name))])?;
        renditions.push(output);
    }
    audio.subscribe(vec![Subscription::new(&input, select_audio())])?;

    let all_video_and_audio = vec![
        Subscription::new(&ladder, ladder.all_renditions()),
        Subscription::new(&input, select_audio()),
    ];
    master.subscribe(all_video_and_audio.clone())?;
    log::info!("local player: {}", master.playlist_url());

    let webrtc = client
        .duplex()
        .local_webrtc(LocalWebRtcSettings {
            id: "localRtcOutput".into(),
        })
        .await
        .context("failed to create local webrtc output")?;
    webrtc.subscribe(all_video_and_audio)?;
    log::info!("local player: {}", webrtc.player_url());

    ladder.subscribe(vec![Subscription::new(&input, select_video())])?;

    Ok(LadderPipeline {
        input,
        ladder,
        master,
        audio,
        renditions,
        webrtc,
    })
}
