//! Centralized configuration management.
//!
//! Every setting is read once, up front, from environment variables. Missing
//! or malformed values fail early with [`PlaygenError::Config`] instead of
//! surfacing halfway through a run.

use chrono_tz::Tz;
use std::{collections::HashSet, time::Duration};
use tracing::warn;

use crate::{
    error::{PlaygenError, Result},
    pipeline::{GenerationRequest, Strategy, DEFAULT_WEEKDAY_ZONE},
};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1/";

#[derive(Debug, Clone)]
pub struct PlaygenConfig {
    /// Bearer token from a completed login (required)
    pub access_token: String,
    /// Catalog API base URL (default: Spotify Web API)
    pub api_url: String,
    /// Grouping strategy (default: artist)
    pub strategy: Strategy,
    /// K for the top-K strategies (default: 10)
    pub num_playlists: usize,
    pub banned_genres: HashSet<String>,
    pub input_playlists: Vec<String>,
    pub output_playlist: String,
    /// Report group sizes instead of writing (default: true)
    pub dry_run: bool,
    /// IANA zone name used by weekday grouping
    pub timezone: String,
    pub http_timeout: Duration,
}

impl PlaygenConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_token = var("SPOTIFY_ACCESS_TOKEN").ok_or_else(|| {
            PlaygenError::Config("missing required SPOTIFY_ACCESS_TOKEN".to_string())
        })?;

        let strategy = match var("PLAYGEN_STRATEGY") {
            Some(s) => s.parse()?,
            None => Strategy::Artist,
        };

        Ok(Self {
            access_token,
            api_url: var("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            strategy,
            num_playlists: parse_number("PLAYGEN_NUM_PLAYLISTS", var("PLAYGEN_NUM_PLAYLISTS"), 10)?,
            banned_genres: split_list(var("PLAYGEN_BANNED_GENRES")).into_iter().collect(),
            input_playlists: split_list(var("PLAYGEN_INPUT_PLAYLISTS")),
            output_playlist: var("PLAYGEN_OUTPUT_PLAYLIST").unwrap_or_default(),
            dry_run: parse_bool("PLAYGEN_DRY_RUN", var("PLAYGEN_DRY_RUN"), true)?,
            timezone: var("PLAYGEN_TIMEZONE")
                .unwrap_or_else(|| DEFAULT_WEEKDAY_ZONE.name().to_string()),
            http_timeout: Duration::from_secs(parse_number(
                "PLAYGEN_HTTP_TIMEOUT_SECS",
                var("PLAYGEN_HTTP_TIMEOUT_SECS"),
                30,
            )?),
        })
    }

    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            num_playlists: self.num_playlists,
            banned_genres: self.banned_genres.clone(),
            input_playlists: self.input_playlists.clone(),
            output_playlist: self.output_playlist.clone(),
        }
    }

    /// The weekday reference zone. An unknown name falls back to UTC.
    pub fn weekday_zone(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!("unknown time zone {:?}, falling back to UTC", self.timezone);
            Tz::UTC
        })
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| PlaygenError::Config(format!("{key} must be a number, got {v:?}"))),
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref().map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(PlaygenError::Config(format!(
                "{key} must be true or false, got {v:?}"
            ))),
        },
    }
}
