// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

#![allow(clippy::module_name_repetitions)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::warn;
use media_pipelines::{pipelines, settings::Settings};
use routing::{Client, ClientOptions, RtmpServerInput};
use tokio::{
    select,
    signal::{
        ctrl_c,
        unix::{signal, SignalKind},
    },
    sync::watch::{self, Receiver},
};

const DOT_OUTPUT_PATH: &str = "./pipelines";

#[derive(Debug, Parser)]
#[command(version, about = "Example media pipelines")]
struct Cli {
    #[command(subcommand)]
    pipeline: Pipeline,

    /// configuration file, missing files fall back to defaults
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// let the RTMP input publish a stream right away
    #[arg(long)]
    simulate_publisher: bool,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Pipeline {
    /// RTMP into an adaptive bitrate ladder served as HLS and WebRTC
    Ladder,
    /// sine tone as HLS audio
    AudioSignal,
    /// browser rendered scoreboard composited onto RTMP, served as WebRTC
    OverlayScore,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if std::env::var(routing::debug::DOT_DIR_ENV).is_err() {
        warn!(
            "Using default dot path. You need to set {} in environment to an absolute path to get DOT output.",
            routing::debug::DOT_DIR_ENV
        );
        std::env::set_var(routing::debug::DOT_DIR_ENV, DOT_OUTPUT_PATH);
    };

    let (shutdown_tx, shutdown_rx) = watch::channel::<bool>(false);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio async runtime")?;

    runtime.spawn(async move {
        let mut sig_term = match signal(SignalKind::terminate()) {
            Ok(sig_term) => sig_term,
            Err(e) => {
                log::error!("can not setup SIGTERM handler: {e}");
                return;
            }
        };
        select! {
            _ = ctrl_c() => { log::info!("received Ctrl-C"); }
            _ = sig_term.recv() => { log::info!("received SIGTERM"); }
        }
        _ = shutdown_tx.send(true);
    });

    if let Err(e) = runtime.block_on(main2(cli, shutdown_rx)) {
        eprintln!("Exit on failure: {e:?}");
        std::process::exit(-1);
    }

    Ok(())
}

async fn main2(cli: Cli, mut shutdown_rx: Receiver<bool>) -> Result<()> {
    let settings = Settings::load(&cli.config).context("Failed to read config")?;

    let mut options = ClientOptions::default().base_url(settings.engine.base_url.clone());
    if matches!(cli.pipeline, Pipeline::OverlayScore) {
        options = options.on_shutdown(|| {
            log::info!("engine has shut down");
            std::process::exit(1);
        });
    }
    let client = Client::connect(options)
        .await
        .context("Failed to connect engine client")?;

    let input = match cli.pipeline {
        Pipeline::Ladder => {
            let pipeline = pipelines::ladder::build(&client, &settings).await?;
            Some(pipeline.input)
        }
        Pipeline::AudioSignal => {
            pipelines::audio_signal::build(&client, &settings).await?;
            None
        }
        Pipeline::OverlayScore => {
            let pipeline =
                pipelines::overlay_score::build(&client, &settings, shutdown_rx.clone()).await?;
            Some(pipeline.input)
        }
    };

    if cli.simulate_publisher {
        simulate_publisher(input.as_ref());
    }
    client.dot(&format!("{:?}", cli.pipeline).to_lowercase());

    select! {
        result = shutdown_rx.wait_for(|down| *down) => {
            result?;
        }
        () = client.wait_for_shutdown() => {}
    }

    if !matches!(cli.pipeline, Pipeline::OverlayScore) {
        client.shutdown();
    }

    Ok(())
}

fn simulate_publisher(input: Option<&RtmpServerInput>) {
    match input {
        Some(input) => {
            log::info!("simulating a publisher on port {}", input.settings().port);
            input.publish("simulated");
        }
        None => warn!("pipeline has no RTMP input, ignoring --simulate-publisher"),
    }
}
