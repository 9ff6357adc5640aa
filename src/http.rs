// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

//! Scoreboard HTTP server read and written by the browser overlay.

use anyhow::{Context, Result};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tokio::{net::TcpListener, sync::watch, task::JoinHandle};
use tower_http::services::ServeDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub team1: Team,
    pub team2: Team,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            team1: Team {
                name: "Team1".to_owned(),
                score: 0,
            },
            team2: Team {
                name: "Team2".to_owned(),
                score: 0,
            },
        }
    }
}

/// Body of `POST /score`, as sent by the overlay UI form.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreUpdate {
    #[serde(rename = "team1-name")]
    pub team1_name: String,
    #[serde(rename = "team1-score", deserialize_with = "score")]
    pub team1_score: u32,
    #[serde(rename = "team2-name")]
    pub team2_name: String,
    #[serde(rename = "team2-score", deserialize_with = "score")]
    pub team2_score: u32,
}

impl Scoreboard {
    /// Overwrite all fields with `update`.
    pub fn apply(&mut self, update: ScoreUpdate) {
        self.team1 = Team {
            name: update.team1_name,
            score: update.team1_score,
        };
        self.team2 = Team {
            name: update.team2_name,
            score: update.team2_score,
        };
    }
}

/// Scores arrive as numbers or, from HTML inputs, as numeric strings.
fn score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(score) => Ok(score),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Scoreboard shared between the request handlers.
#[derive(Debug, Clone, Default)]
pub struct ScoreboardState(Arc<RwLock<Scoreboard>>);

impl ScoreboardState {
    #[must_use]
    pub fn snapshot(&self) -> Scoreboard {
        self.0.read().clone()
    }

    pub fn update(&self, update: ScoreUpdate) {
        self.0.write().apply(update);
    }
}

/// URL of `page` in the static directory of a server bound to `address`.
#[must_use]
pub fn static_url(address: SocketAddr, page: &str) -> String {
    format!("http://localhost:{}/static/{page}", address.port())
}

/// Routes of the scoreboard server.
pub fn router(state: ScoreboardState, static_dir: &Path) -> Router {
    Router::new()
        .route("/score", get(get_score).post(post_score))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

async fn get_score(State(state): State<ScoreboardState>) -> Json<Scoreboard> {
    Json(state.snapshot())
}

async fn post_score(
    State(state): State<ScoreboardState>,
    Json(update): Json<ScoreUpdate>,
) -> StatusCode {
    log::info!(
        "score update: {} {} - {} {}",
        update.team1_name,
        update.team1_score,
        update.team2_score,
        update.team2_name
    );
    state.update(update);

    StatusCode::OK
}

/// Bind `address` and serve the scoreboard until `shutdown` turns true.
///
/// Returns the bound address (useful with port 0) and the server task.
pub async fn start(
    address: SocketAddr,
    static_dir: &Path,
    state: ScoreboardState,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("unable to bind scoreboard server to {address}"))?;
    let local_addr = listener
        .local_addr()
        .context("unable to get local address of scoreboard server")?;

    let app = router(state, static_dir);
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                _ = shutdown.wait_for(|down| *down).await;
            })
            .await
            .context("scoreboard server failed")
    });

    log::info!("scoreboard running on {local_addr}");

    Ok((local_addr, task))
}
