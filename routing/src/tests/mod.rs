// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

mod engine;
mod router;

pub mod testing {

    use crate::*;
    use core::{future::Future, time::Duration};
    use std::sync::Once;

    /// rungs of the ladder used throughout the tests
    pub const RENDITIONS: [&str; 3] = ["high", "medium", "low"];

    /// maximum time to wait for the router to settle
    pub const TIMEOUT: Duration = Duration::from_secs(2);

    static INIT: Once = Once::new();

    /// initialize for testing
    pub fn init() {
        INIT.call_once(|| {
            env_logger::builder().is_test(true).try_init().ok();
        });
    }

    /// video stream of `source` carrying `rendition`
    pub fn video(source: &str, rendition: &str) -> StreamMetadata {
        StreamMetadata::video(StreamKey::new(source, 1).with_rendition(rendition))
    }

    /// audio stream of `source`
    pub fn audio(source: &str) -> StreamMetadata {
        StreamMetadata::audio(StreamKey::new(source, 2))
    }

    /// snapshot of a ladder which announced the given renditions so far
    pub fn ladder_snapshot(renditions: &[(&str, &str)]) -> Vec<StreamMetadata> {
        renditions
            .iter()
            .map(|(key, rendition)| video(key, rendition))
            .collect()
    }

    /// connect a client with default options
    pub async fn client() -> Client {
        init();
        Client::connect(ClientOptions::default())
            .await
            .expect("client connects")
    }

    /// await `future` but fail the test after [`TIMEOUT`]
    pub async fn within<F: Future>(future: F) -> F::Output {
        tokio::time::timeout(TIMEOUT, future)
            .await
            .expect("router did not settle in time")
    }

    pub fn rtmp_settings(id: &str) -> RtmpServerSettings {
        RtmpServerSettings {
            id: id.into(),
            port: 5001,
        }
    }

    pub fn ladder_settings(id: &str) -> VideoEncodeLadderSettings {
        let sizes = [Size::HD, Size::NHD, Size::LOW];
        VideoEncodeLadderSettings {
            id: id.into(),
            rungs: RENDITIONS
                .iter()
                .zip(sizes)
                .map(|(name, size)| LadderRung {
                    name: (*name).to_owned(),
                    width: size.width,
                    height: size.height,
                    frame_rate: FrameRate::FPS_25,
                    codec: X264Codec::zero_latency(250_000, 50),
                })
                .collect(),
        }
    }

    pub fn compose_settings(id: &str) -> ComposeVideoSettings {
        ComposeVideoSettings {
            id: id.into(),
            reference_stream: "background".to_owned(),
            output_resolution: Size::HD,
            reference_resolution: Size::PERCENT,
            output_pixel_format: PixelFormat::Bgra,
            parts: vec![
                ComposePart::full_frame("background", 0, Size::PERCENT),
                ComposePart::full_frame("overlay", 1, Size::PERCENT),
            ],
        }
    }
}
