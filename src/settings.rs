// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use config::{Config, ConfigError, Environment, File, FileFormat};
use routing::HlsSegmentSettings;
use serde::{Deserialize, Deserializer};
use std::{
    fmt::Display,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub rtmp: RtmpSettings,
    #[serde(default)]
    pub hls: HlsSettings,
    #[serde(default)]
    pub scoreboard: ScoreboardSettings,
}

/// Prefix of environment overrides, e.g. `MEDIA_PIPELINES__RTMP__PORT`.
pub const ENV_PREFIX: &str = "MEDIA_PIPELINES";

impl Settings {
    /// Read `file_name` (if present) and apply `MEDIA_PIPELINES__*` overrides.
    pub fn load(file_name: &str) -> Result<Self, ConfigError> {
        Self::load_with_prefix(file_name, ENV_PREFIX)
    }

    fn load_with_prefix(file_name: &str, env_prefix: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::new(file_name, FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(env_prefix).separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Deserialize)]
pub struct EngineSettings {
    /// base of all playlist and player URLs
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    routing::DEFAULT_BASE_URL.to_owned()
}

#[derive(Debug, Deserialize)]
pub struct RtmpSettings {
    #[serde(default = "default_rtmp_port", deserialize_with = "from_str")]
    pub port: u16,
}

impl Default for RtmpSettings {
    fn default() -> Self {
        Self {
            port: default_rtmp_port(),
        }
    }
}

fn default_rtmp_port() -> u16 {
    5001
}

#[derive(Debug, Deserialize)]
pub struct HlsSettings {
    #[serde(default = "default_part_duration", deserialize_with = "from_str")]
    pub part_duration_seconds: f64,
    #[serde(default = "default_segment_duration", deserialize_with = "from_str")]
    pub segment_duration_seconds: f64,
}

impl Default for HlsSettings {
    fn default() -> Self {
        Self {
            part_duration_seconds: default_part_duration(),
            segment_duration_seconds: default_segment_duration(),
        }
    }
}

impl HlsSettings {
    /// Segment settings for the media playlist output `id`.
    #[must_use]
    pub fn segments(&self, id: &str) -> HlsSegmentSettings {
        HlsSegmentSettings {
            id: id.into(),
            part_duration_seconds: self.part_duration_seconds,
            segment_duration_seconds: self.segment_duration_seconds,
        }
    }
}

fn default_part_duration() -> f64 {
    1.0
}

fn default_segment_duration() -> f64 {
    4.0
}

#[derive(Debug, Deserialize)]
pub struct ScoreboardSettings {
    #[serde(default = "default_address", deserialize_with = "from_str")]
    pub address: IpAddr,
    #[serde(default = "default_scoreboard_port", deserialize_with = "from_str")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ScoreboardSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_scoreboard_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ScoreboardSettings {
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_scoreboard_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

/// Accept values both typed (from TOML) and as strings (from the environment).
fn from_str<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Typed(T),
        Text(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Typed(value) => Ok(value),
        Raw::Text(text) => FromStr::from_str(&text).map_err(serde::de::Error::custom),
    }
}
