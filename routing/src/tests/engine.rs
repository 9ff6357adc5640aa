// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use pretty_assertions::assert_eq;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::{
    debug, select_audio, select_video,
    testing::{self, within},
    video_to_pin, AudioSignalSettings, BrowserInputSettings, ChannelLayout, Client,
    ClientOptions, Error, FrameRate, HlsMasterSettings, HlsSegmentSettings, LocalWebRtcSettings,
    MediaKind, Node, NodeId, NodeKind, SinkNode, Size, SourceNode, StreamKey, Subscription, Wave,
};

#[tokio::test]
async fn duplicate_node_ids_are_rejected() {
    let client = testing::client().await;

    client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmp"))
        .await
        .unwrap();
    let result = client
        .output()
        .hls_audio(HlsSegmentSettings::new("rtmp"))
        .await;

    assert!(matches!(result, Err(Error::DuplicateNode(id)) if id.as_str() == "rtmp"));
    assert_eq!(client.nodes().len(), 1);
}

#[tokio::test]
async fn invalid_base_url_is_rejected() {
    testing::init();

    let result = Client::connect(ClientOptions::default().base_url("not a url")).await;

    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[tokio::test]
async fn ladder_pipeline_routes_once_all_rungs_are_announced() {
    let client = testing::client().await;

    let input = client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmp"))
        .await
        .unwrap();
    let ladder = client
        .processor()
        .transform()
        .video_encode_ladder(testing::ladder_settings("ladder"))
        .await
        .unwrap();
    let medium = client
        .output()
        .hls_video(HlsSegmentSettings::new("medium"))
        .await
        .unwrap();
    let master = client
        .output()
        .hls_master(HlsMasterSettings {
            id: "master".into(),
            playlist_name: "master".to_owned(),
        })
        .await
        .unwrap();

    medium
        .subscribe(vec![Subscription::new(&ladder, ladder.rendition("medium"))])
        .unwrap();
    master
        .subscribe(vec![
            Subscription::new(&ladder, ladder.all_renditions()),
            Subscription::new(&input, select_audio()),
        ])
        .unwrap();
    ladder
        .subscribe(vec![Subscription::new(&input, select_video())])
        .unwrap();

    // nothing published yet
    tokio::task::yield_now().await;
    assert!(master.routed().is_empty());
    assert!(ladder.announced().is_empty());

    input.publish("camera");

    let routed = within(master.node().wait_for_routed(|routed| routed.streams.len() == 4))
        .await
        .unwrap();
    assert_eq!(routed.videos().count(), 3);
    assert_eq!(routed.audios().count(), 1);

    let routed = within(medium.node().wait_for_routed(|routed| !routed.is_empty()))
        .await
        .unwrap();
    assert_eq!(
        routed.keys(),
        vec![StreamKey::new("camera", 256).with_rendition("medium")]
    );

    let url = within(medium.url()).await.unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:8080/hls/medium/playlist.m3u8");
    assert_eq!(
        master.playlist_url().as_str(),
        "http://127.0.0.1:8080/hls/master/master.m3u8"
    );

    input.unpublish();

    within(master.node().wait_for_routed(|routed| routed.is_empty()))
        .await
        .unwrap();
    within(ladder.node().wait_for_announced(|streams| streams.is_empty()))
        .await
        .unwrap();
}

#[tokio::test]
async fn audio_signal_feeds_hls_audio() {
    let client = testing::client().await;

    let signal = client
        .input()
        .audio_signal(AudioSignalSettings {
            id: "audio-signal".into(),
            source_name: "signal".to_owned(),
            channel_layout: ChannelLayout::Stereo,
            sample_rate: 48_000,
            wave: Wave::sine(440.0),
        })
        .await
        .unwrap();
    let output = client
        .output()
        .hls_audio(HlsSegmentSettings::new("hls-audio"))
        .await
        .unwrap();

    assert_eq!(signal.announced().len(), 1);
    assert_eq!(output.kind(), MediaKind::Audio);

    output
        .subscribe(vec![Subscription::new(&signal, select_audio())])
        .unwrap();

    let url = within(output.url()).await.unwrap();
    assert!(url.as_str().ends_with("/hls/hls-audio/playlist.m3u8"));
}

#[tokio::test]
async fn compose_announces_once_reference_pin_is_fed() {
    let client = testing::client().await;

    let input = client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmpInput"))
        .await
        .unwrap();
    let browser = client
        .input()
        .browser(BrowserInputSettings {
            id: "browser".into(),
            url: "http://localhost:3000/static/overlay-score.html".parse().unwrap(),
            resolution: Size::HD,
            source_name: "browserOverlay".to_owned(),
            frame_rate: FrameRate::FPS_25,
        })
        .await
        .unwrap();
    let compose = client
        .processor()
        .transform()
        .compose_overlay(testing::compose_settings("compose"))
        .await
        .unwrap();
    let output = client
        .duplex()
        .local_webrtc(LocalWebRtcSettings {
            id: "localRtcOutput".into(),
        })
        .await
        .unwrap();

    compose
        .subscribe_to_pins(vec![
            Subscription::new(&input, video_to_pin("background")),
            Subscription::new(&browser, video_to_pin("overlay")),
        ])
        .unwrap();
    output
        .subscribe(vec![
            Subscription::new(&compose, select_video()),
            Subscription::new(&input, select_audio()),
        ])
        .unwrap();

    // only the overlay is available, the reference pin is missing
    let routed = within(compose.node().wait_for_routed(|routed| !routed.is_empty()))
        .await
        .unwrap();
    assert_eq!(routed.pin("overlay").len(), 1);
    assert!(compose.announced().is_empty());

    input.publish("camera");

    let routed = within(output.node().wait_for_routed(|routed| routed.streams.len() == 2))
        .await
        .unwrap();
    assert_eq!(
        routed.keys(),
        vec![StreamKey::new("compose", 1), StreamKey::new("camera", 257)]
    );
    assert_eq!(
        output.player_url().as_str(),
        "http://127.0.0.1:8080/webrtc/localRtcOutput/player.html"
    );
}

#[tokio::test]
async fn resubscribe_replaces_previous_subscriptions() {
    let client = testing::client().await;

    let input = client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmp"))
        .await
        .unwrap();
    let output = client
        .duplex()
        .local_webrtc(LocalWebRtcSettings { id: "rtc".into() })
        .await
        .unwrap();
    input.publish("camera");

    output
        .subscribe(vec![Subscription::new(&input, select_video())])
        .unwrap();
    within(output.node().wait_for_routed(|routed| routed.videos().count() == 1))
        .await
        .unwrap();

    output
        .subscribe(vec![Subscription::new(&input, select_audio())])
        .unwrap();
    let routed = within(
        output
            .node()
            .wait_for_routed(|routed| routed.audios().count() == 1),
    )
    .await
    .unwrap();

    assert_eq!(routed.videos().count(), 0);
    assert_eq!(output.node().subscriptions().len(), 1);
}

#[tokio::test]
async fn closing_a_source_withdraws_its_streams() {
    let client = testing::client().await;

    let input = client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmp"))
        .await
        .unwrap();
    let output = client
        .output()
        .hls_audio(HlsSegmentSettings::new("audio"))
        .await
        .unwrap();
    input.publish("camera");
    output
        .subscribe(vec![Subscription::new(&input, select_audio())])
        .unwrap();
    within(output.node().wait_for_routed(|routed| !routed.is_empty()))
        .await
        .unwrap();

    input.close();

    within(output.node().wait_for_routed(|routed| routed.is_empty()))
        .await
        .unwrap();
    assert!(input.node().is_closed());
    assert!(client.node(&NodeId::new("rtmp")).is_none());

    // the id is free again
    let again = client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmp"))
        .await
        .unwrap();
    assert_eq!(again.node().kind(), NodeKind::Input);

    // publishing on the closed handle has no effect
    input.publish("camera");
    assert!(input.announced().is_empty());
}

#[tokio::test]
async fn closed_nodes_refuse_subscriptions() {
    let client = testing::client().await;

    let input = client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmp"))
        .await
        .unwrap();
    let output = client
        .output()
        .hls_audio(HlsSegmentSettings::new("audio"))
        .await
        .unwrap();

    client.close(output.id()).unwrap();

    let result = output.subscribe(vec![Subscription::new(&input, select_audio())]);
    assert!(matches!(result, Err(Error::Closed(_))));
    assert!(matches!(
        client.close(&NodeId::new("audio")),
        Err(Error::UnknownNode(_))
    ));
}

#[tokio::test]
async fn shutdown_runs_hook_once_and_fails_pending_urls() {
    testing::init();
    let calls = Arc::new(AtomicUsize::new(0));
    let client = Client::connect(ClientOptions::default().on_shutdown({
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    }))
    .await
    .unwrap();

    let output = client
        .output()
        .hls_audio(HlsSegmentSettings::new("audio"))
        .await
        .unwrap();

    let pending = tokio::spawn({
        let output = output.clone();
        async move { output.url().await }
    });
    tokio::task::yield_now().await;

    client.shutdown();
    client.shutdown();

    let result = within(pending).await.unwrap();
    assert!(matches!(result, Err(Error::Shutdown)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(client.is_shut_down());
    within(client.wait_for_shutdown()).await;

    let result = client
        .input()
        .rtmp_server(testing::rtmp_settings("late"))
        .await;
    assert!(matches!(result, Err(Error::Shutdown)));
}

#[tokio::test]
async fn dot_graph_lists_nodes_and_subscriptions() {
    let client = testing::client().await;

    let input = client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmp"))
        .await
        .unwrap();
    let output = client
        .output()
        .hls_audio(HlsSegmentSettings::new("audio"))
        .await
        .unwrap();
    output
        .subscribe(vec![Subscription::new(&input, select_audio())])
        .unwrap();

    let graph = debug::dot(&client);

    assert!(graph.starts_with("digraph pipeline {"));
    assert!(graph.contains("\"rtmp\" [shape=invhouse"));
    assert!(graph.contains("\"rtmp\" -> \"audio\" [label=\"select_audio\"];"));
}

#[tokio::test]
async fn dot_files_are_numbered() {
    let client = testing::client().await;
    client
        .input()
        .rtmp_server(testing::rtmp_settings("rtmp"))
        .await
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let first = debug::write_dot(&client, &dir.path().join("dots"), "ladder").unwrap();
    let second = debug::write_dot(&client, &dir.path().join("dots"), "ladder").unwrap();

    assert_ne!(first, second);
    assert!(first.to_string_lossy().ends_with("-ladder.dot"));
    let graph = std::fs::read_to_string(&second).unwrap();
    assert!(graph.contains("\"rtmp\" [shape=invhouse"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn resubscribe_while_publishing_never_keeps_stale_routes() {
    for _ in 0..200 {
        let client = testing::client().await;
        let input = client
            .input()
            .rtmp_server(testing::rtmp_settings("rtmp"))
            .await
            .unwrap();
        let output = client
            .duplex()
            .local_webrtc(LocalWebRtcSettings { id: "rtc".into() })
            .await
            .unwrap();

        output
            .subscribe(vec![Subscription::new(&input, select_video())])
            .unwrap();
        let publisher = tokio::spawn({
            let input = input.clone();
            async move { input.publish("camera") }
        });
        output
            .subscribe(vec![Subscription::new(&input, select_audio())])
            .unwrap();
        publisher.await.unwrap();

        let routed = within(output.node().wait_for_routed(|routed| {
            routed.videos().count() == 0 && routed.audios().count() == 1
        }))
        .await
        .unwrap();
        assert_eq!(routed.keys(), vec![StreamKey::new("camera", 257)]);

        client.shutdown();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn closed_ladder_stays_silent_while_input_publishes() {
    for _ in 0..200 {
        let client = testing::client().await;
        let input = client
            .input()
            .rtmp_server(testing::rtmp_settings("rtmp"))
            .await
            .unwrap();
        let ladder = client
            .processor()
            .transform()
            .video_encode_ladder(testing::ladder_settings("ladder"))
            .await
            .unwrap();
        ladder
            .subscribe(vec![Subscription::new(&input, select_video())])
            .unwrap();

        let publisher = tokio::spawn({
            let input = input.clone();
            async move { input.publish("camera") }
        });
        ladder.close();
        publisher.await.unwrap();
        tokio::task::yield_now().await;

        assert!(ladder.announced().is_empty());
        assert!(ladder.routed().is_empty());

        client.shutdown();
    }
}

#[tokio::test]
async fn failed_setup_frees_the_id() {
    let client = testing::client().await;
    let node = client
        .register(&NodeId::new("ladder"), NodeKind::Processor, "video_encode_ladder")
        .unwrap();

    client.shutdown();
    let result = node.clone().derive_announcements(|_| Vec::new());

    assert!(matches!(result, Err(Error::Shutdown)));
    assert!(node.is_closed());
    assert!(client.node(&NodeId::new("ladder")).is_none());
}
