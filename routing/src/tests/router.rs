// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use pretty_assertions::assert_eq;

use crate::{
    evaluate, ladder_item, select_all_videos, select_audio, select_av, select_video, selector_fn,
    testing::{self, audio, ladder_snapshot, video},
    video_to_pin, Selection, SourceSelector, StreamKey, StreamMetadata, SubscriptionMode,
};

fn ladder() -> Vec<StreamMetadata> {
    ladder_snapshot(&[("ladder", "high"), ("ladder", "medium"), ("ladder", "low")])
}

fn camera() -> Vec<StreamMetadata> {
    vec![video("camera", "default"), audio("camera")]
}

#[test]
fn aggregate_selects_all_renditions_and_audio() {
    testing::init();

    let ladder = ladder();
    let camera = camera();
    let all_videos = select_all_videos(3);
    let audio_only = select_audio();

    let routed = evaluate(
        SubscriptionMode::Streams,
        [
            (ladder.as_slice(), &all_videos as &dyn SourceSelector),
            (camera.as_slice(), &audio_only as &dyn SourceSelector),
        ],
    );

    assert_eq!(routed.streams.len(), 3 + 1);
    assert_eq!(routed.videos().count(), 3);
    assert_eq!(routed.audios().count(), 1);
}

#[test]
fn aggregate_with_partial_ladder_contributes_audio_only() {
    let ladder = ladder_snapshot(&[("ladder", "high"), ("ladder", "medium")]);
    let camera = camera();
    let all_videos = select_all_videos(3);
    let audio_only = select_audio();

    let routed = evaluate(
        SubscriptionMode::Streams,
        [
            (ladder.as_slice(), &all_videos as &dyn SourceSelector),
            (camera.as_slice(), &audio_only as &dyn SourceSelector),
        ],
    );

    assert_eq!(routed.streams, vec![audio("camera")]);
}

#[test]
fn not_ready_everywhere_routes_nothing() {
    let ladder = ladder_snapshot(&[("ladder", "high")]);
    let selector = ladder_item("high", 3);

    let routed = evaluate(
        SubscriptionMode::Streams,
        [(ladder.as_slice(), &selector as &dyn SourceSelector)],
    );

    assert!(routed.is_empty());
}

#[test]
fn duplicates_are_routed_once_in_subscription_order() {
    let camera = camera();
    let av = select_av();
    let video_only = select_video();

    let routed = evaluate(
        SubscriptionMode::Streams,
        [
            (camera.as_slice(), &av as &dyn SourceSelector),
            (camera.as_slice(), &video_only as &dyn SourceSelector),
        ],
    );

    assert_eq!(routed.streams, camera);
}

#[test]
fn pins_are_merged_by_name() {
    let camera = camera();
    let browser = vec![video("browser", "default")];
    let background = video_to_pin("background");
    let overlay = video_to_pin("overlay");

    let routed = evaluate(
        SubscriptionMode::Pins,
        [
            (camera.as_slice(), &background as &dyn SourceSelector),
            (browser.as_slice(), &overlay as &dyn SourceSelector),
        ],
    );

    assert_eq!(routed.pin("background"), &[video("camera", "default")]);
    assert_eq!(routed.pin("overlay"), &[video("browser", "default")]);
    assert!(routed.streams.is_empty());
    assert!(routed.pin("missing").is_empty());
}

#[test]
fn mismatched_selection_shapes_are_ignored() {
    let camera = camera();
    let background = video_to_pin("background");
    let video_only = select_video();

    let streams = evaluate(
        SubscriptionMode::Streams,
        [(camera.as_slice(), &background as &dyn SourceSelector)],
    );
    let pins = evaluate(
        SubscriptionMode::Pins,
        [(camera.as_slice(), &video_only as &dyn SourceSelector)],
    );

    assert!(streams.is_empty());
    assert!(pins.is_empty());
}

#[test]
fn keys_which_are_not_announced_are_dropped() {
    let camera = camera();
    let ghost = selector_fn("ghost", |streams: &[StreamMetadata]| {
        let mut keys: Vec<StreamKey> = streams.iter().map(|s| s.key.clone()).collect();
        keys.push(StreamKey::new("ghost", 9));
        Selection::Keys(keys)
    });

    let routed = evaluate(
        SubscriptionMode::Streams,
        [(camera.as_slice(), &ghost as &dyn SourceSelector)],
    );

    assert_eq!(routed.streams, camera);
}

#[test]
fn evaluation_is_deterministic() {
    let ladder = ladder();
    let camera = camera();
    let high = ladder_item("high", 3);
    let audio_only = select_audio();
    let inputs = || {
        [
            (ladder.as_slice(), &high as &dyn SourceSelector),
            (camera.as_slice(), &audio_only as &dyn SourceSelector),
        ]
    };

    let first = evaluate(SubscriptionMode::Streams, inputs());
    let second = evaluate(SubscriptionMode::Streams, inputs());

    assert_eq!(first, second);
    assert_eq!(
        first.keys(),
        vec![
            StreamKey::new("ladder", 1).with_rendition("high"),
            StreamKey::new("camera", 2),
        ]
    );
}
