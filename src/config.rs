use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;

use crate::cache::DEFAULT_TTL_SECS;

pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Account session used for the watchlist. Passed explicitly to the handlers that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub session: Option<Session>,
    pub bind_addr: SocketAddr,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tmdb_api_key = get("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        let tmdb_base_url = get("TMDB_BASE_URL")
            .unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let session = match (get("TMDB_ACCOUNT_ID"), get("TMDB_SESSION_ID")) {
            (Some(account_id), Some(session_id)) => Some(Session {
                account_id,
                session_id,
            }),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "TMDB_ACCOUNT_ID and TMDB_SESSION_ID must be set together"
                ))
            }
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a valid socket address")?;

        let cache_ttl_secs = match get("CACHE_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("CACHE_TTL_SECS must be a non-negative integer")?,
            None => DEFAULT_TTL_SECS,
        };

        Ok(Self {
            tmdb_api_key,
            tmdb_base_url,
            session,
            bind_addr,
            cache_ttl_secs,
        })
    }
}
