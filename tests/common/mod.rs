// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

#![allow(dead_code)]

use std::{
    future::Future,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    sync::{
        atomic::{self, AtomicBool},
        Arc, OnceLock,
    },
    time::Duration,
};

use media_pipelines::settings::{ScoreboardSettings, Settings};
use routing::{Client, ClientOptions};

use crate::common::logger::PanicLogger;

mod logger;

/// maximum time to wait for the router to settle
pub(crate) const TIMEOUT: Duration = Duration::from_secs(5);

static ERROR_OCCURRED: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Install the [`PanicLogger`] once per test binary.
pub(crate) fn init() {
    ERROR_OCCURRED.get_or_init(|| {
        let error_occurred = Arc::new(AtomicBool::new(false));
        if !PanicLogger::init(error_occurred.clone()) {
            eprintln!("a logger is already installed, errors are not tracked");
        }
        error_occurred
    });
}

/// Fail the test if anything in this binary logged an error so far.
pub(crate) fn assert_no_errors() {
    let error_occurred = ERROR_OCCURRED
        .get()
        .is_some_and(|flag| flag.load(atomic::Ordering::Relaxed));
    assert!(!error_occurred, "an error was logged");
}

/// static pages shipped with the crate
pub(crate) fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

/// Settings binding the scoreboard to a free local port.
pub(crate) fn settings() -> Settings {
    Settings {
        scoreboard: ScoreboardSettings {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            static_dir: static_dir(),
        },
        ..Settings::default()
    }
}

pub(crate) async fn client() -> Client {
    init();
    Client::connect(ClientOptions::default())
        .await
        .expect("client connects")
}

/// await `future` but fail the test after [`TIMEOUT`]
pub(crate) async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(TIMEOUT, future)
        .await
        .expect("did not settle in time")
}
