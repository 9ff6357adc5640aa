// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Scoreboard rendered by a browser and composited onto an RTMP feed.

use anyhow::{Context, Result};
use routing::{
    select_audio, select_video, video_to_pin, BrowserInput, BrowserInputSettings, Client,
    ComposeOverlay, ComposePart, ComposeVideoSettings, FrameRate, LocalWebRtc,
    LocalWebRtcSettings, PixelFormat, RtmpServerInput, RtmpServerSettings, SinkNode, Size,
    Subscription,
};
use std::net::SocketAddr;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    http::{self, ScoreboardState},
    settings::Settings,
};

const BACKGROUND: &str = "background";
const OVERLAY: &str = "overlay";

pub struct OverlayScorePipeline {
    /// address the scoreboard server is bound to
    pub scoreboard: SocketAddr,
    pub state: ScoreboardState,
    pub server: JoinHandle<Result<()>>,
    pub input: RtmpServerInput,
    pub browser: BrowserInput,
    pub compose: ComposeOverlay,
    pub output: LocalWebRtc,
}

fn compose_settings() -> ComposeVideoSettings {
    ComposeVideoSettings {
        id: "compose".into(),
        reference_stream: BACKGROUND.to_owned(),
        output_resolution: Size::HD,
        reference_resolution: Size::PERCENT,
        output_pixel_format: PixelFormat::Bgra,
        parts: vec![
            ComposePart::full_frame(BACKGROUND, 0, Size::PERCENT),
            ComposePart::full_frame(OVERLAY, 1, Size::PERCENT),
        ],
    }
}

pub async fn build(
    client: &Client,
    settings: &Settings,
    shutdown: watch::Receiver<bool>,
) -> Result<OverlayScorePipeline> {
    let state = ScoreboardState::default();
    let (scoreboard, server) = http::start(
        settings.scoreboard.socket_addr(),
        &settings.scoreboard.static_dir,
        state.clone(),
        shutdown,
    )
    .await?;
    log::info!(
        "score overlay: {}, score ui: {}",
        http::static_url(scoreboard, "overlay-score.html"),
        http::static_url(scoreboard, "overlay-ui.html")
    );

    let input = client
        .input()
        .rtmp_server(RtmpServerSettings {
            id: "rtmpInput".into(),
            port: settings.rtmp.port,
        })
        .await
        .context("failed to create rtmp input")?;

    let url = http::static_url(scoreboard, "overlay-score.html")
        .parse()
        .context("invalid overlay url")?;
    let browser = client
        .input()
        .browser(BrowserInputSettings {
            id: "browser".into(),
            url,
            resolution: Size::HD,
            source_name: "browserOverlay".to_owned(),
            frame_rate: FrameRate::FPS_25,
        })
        .await
        .context("failed to create browser input")?;

    let compose = client
        .processor()
        .transform()
        .compose_overlay(compose_settings())
        .await
        .context("failed to create compose node")?;
    compose.subscribe_to_pins(vec![
        Subscription::new(&input, video_to_pin(BACKGROUND)),
        Subscription::new(&browser, video_to_pin(OVERLAY)),
    ])?;

    let output = client
        .duplex()
        .local_webrtc(LocalWebRtcSettings {
            id: "localRtcOutput".into(),
        })
        .await
        .context("failed to create local webrtc output")?;
    output.subscribe(vec![
        Subscription::new(&compose, select_video()),
        Subscription::new(&input, select_audio()),
    ])?;
    log::info!("local player: {}", output.player_url());

    Ok(OverlayScorePipeline {
        scoreboard,
        state,
        server,
        input,
        browser,
        compose,
        output,
    })
}
