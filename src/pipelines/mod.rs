// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Streaming pipelines which can be started from the command line.

use routing::{HlsMediaOutput, Node};
use tokio::task::JoinHandle;

pub mod audio_signal;
pub mod ladder;
pub mod overlay_score;

pub use audio_signal::AudioSignalPipeline;
pub use ladder::LadderPipeline;
pub use overlay_score::OverlayScorePipeline;

/// Log the playlist URL of `output` as soon as it is available.
pub fn log_playlist_url(output: HlsMediaOutput) -> JoinHandle<()> {
    tokio::spawn(async move {
        match output.url().await {
            Ok(url) => log::info!("playlist url of '{}': {url}", output.id()),
            Err(e) => log::debug!("no playlist url for '{}': {e}", output.id()),
        }
    })
}
