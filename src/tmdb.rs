use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{response_cache, ResponseCache};
use crate::config::{Config, Session};
use crate::models::{
    Credits, ExternalIds, MediaType, MovieDetails, MovieList, MovieSummary, Paged, Review,
    TrendingPeriod, TvList, TvShowSummary,
};

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone, Error)]
pub enum TmdbError {
    #[error("TMDB rejected the credentials (401): {body}")]
    Unauthorized { body: String },
    #[error("TMDB resource not found")]
    NotFound,
    #[error("TMDB returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request to TMDB failed: {0}")]
    Network(String),
    #[error("TMDB JSON parse failed: {0}")]
    Parse(String),
}

impl TmdbError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TmdbError::Unauthorized { .. })
    }
}

pub type TmdbResult<T> = Result<T, TmdbError>;

/// One method per TMDB endpoint the pages render. Each is a single GET.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn trending_movies(&self, period: TrendingPeriod) -> TmdbResult<Vec<MovieSummary>>;
    async fn trending_tv(&self, period: TrendingPeriod) -> TmdbResult<Vec<TvShowSummary>>;
    async fn movie_list(&self, list: MovieList, page: u32) -> TmdbResult<Paged<MovieSummary>>;
    async fn tv_list(&self, list: TvList) -> TmdbResult<Vec<TvShowSummary>>;
    async fn movie_details(&self, id: u64) -> TmdbResult<MovieDetails>;
    async fn movie_credits(&self, id: u64) -> TmdbResult<Credits>;
    async fn movie_external_ids(&self, id: u64) -> TmdbResult<ExternalIds>;
    async fn movie_reviews(&self, id: u64) -> TmdbResult<Vec<Review>>;
    async fn watchlist_movies(&self, session: &Session) -> TmdbResult<Vec<MovieSummary>>;
    async fn watchlist_tv(&self, session: &Session) -> TmdbResult<Vec<TvShowSummary>>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    cache: ResponseCache,
}

impl TmdbClient {
    pub fn new(api_key: String, base_url: String, cache: ResponseCache) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tmdb_api_key.clone(),
            config.tmdb_base_url.clone(),
            response_cache(Duration::from_secs(config.cache_ttl_secs)),
        )
    }

    /// `path` is relative to the API root and may carry its own query string.
    /// Concurrent misses on the same path share one request; failures are not cached.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> TmdbResult<T> {
        let body = self
            .cache
            .try_get_with(path.to_string(), self.fetch(path))
            .await
            .map_err(|e| (*e).clone())?;
        match parse_body(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                self.cache.invalidate(path).await;
                Err(e)
            }
        }
    }

    async fn fetch(&self, path: &str) -> TmdbResult<String> {
        debug!(path = %path, "TMDB request");
        let url = request_url(&self.base_url, path, &self.api_key);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TmdbError::Network(e.without_url().to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| TmdbError::Network(e.without_url().to_string()))?;
        check_status(status, &text)?;
        Ok(text)
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn trending_movies(&self, period: TrendingPeriod) -> TmdbResult<Vec<MovieSummary>> {
        let path = format!("trending/{}/{}", MediaType::Movie.as_str(), period.as_str());
        let data: Paged<MovieSummary> = self.get_json(&path).await?;
        Ok(data.results)
    }

    async fn trending_tv(&self, period: TrendingPeriod) -> TmdbResult<Vec<TvShowSummary>> {
        let path = format!("trending/{}/{}", MediaType::Tv.as_str(), period.as_str());
        let data: Paged<TvShowSummary> = self.get_json(&path).await?;
        Ok(data.results)
    }

    async fn movie_list(&self, list: MovieList, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        let path = if page > 1 {
            format!("movie/{}?page={page}", list.as_str())
        } else {
            format!("movie/{}", list.as_str())
        };
        self.get_json(&path).await
    }

    async fn tv_list(&self, list: TvList) -> TmdbResult<Vec<TvShowSummary>> {
        let data: Paged<TvShowSummary> = self.get_json(&format!("tv/{}", list.as_str())).await?;
        Ok(data.results)
    }

    async fn movie_details(&self, id: u64) -> TmdbResult<MovieDetails> {
        self.get_json(&format!("movie/{id}")).await
    }

    async fn movie_credits(&self, id: u64) -> TmdbResult<Credits> {
        self.get_json(&format!("movie/{id}/credits")).await
    }

    async fn movie_external_ids(&self, id: u64) -> TmdbResult<ExternalIds> {
        self.get_json(&format!("movie/{id}/external_ids")).await
    }

    async fn movie_reviews(&self, id: u64) -> TmdbResult<Vec<Review>> {
        let data: Paged<Review> = self.get_json(&format!("movie/{id}/reviews")).await?;
        Ok(data.results)
    }

    async fn watchlist_movies(&self, session: &Session) -> TmdbResult<Vec<MovieSummary>> {
        let data: Paged<MovieSummary> = self
            .get_json(&watchlist_path(session, MediaType::Movie))
            .await?;
        Ok(data.results)
    }

    async fn watchlist_tv(&self, session: &Session) -> TmdbResult<Vec<TvShowSummary>> {
        let data: Paged<TvShowSummary> = self
            .get_json(&watchlist_path(session, MediaType::Tv))
            .await?;
        Ok(data.results)
    }
}

fn watchlist_path(session: &Session, media: MediaType) -> String {
    format!(
        "account/{}/watchlist/{}?session_id={}",
        urlencoding::encode(&session.account_id),
        media.watchlist_segment(),
        urlencoding::encode(&session.session_id)
    )
}

fn request_url(base: &str, path: &str, api_key: &str) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!(
        "{base}/{path}{sep}api_key={}",
        urlencoding::encode(api_key)
    )
}

fn check_status(status: StatusCode, body: &str) -> TmdbResult<()> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED => {
            warn!(status = status.as_u16(), info = %body, "TMDB request unauthorized");
            Err(TmdbError::Unauthorized {
                body: body.to_string(),
            })
        }
        StatusCode::NOT_FOUND => Err(TmdbError::NotFound),
        _ => Err(TmdbError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }),
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> TmdbResult<T> {
    serde_json::from_str(body).map_err(|e| TmdbError::Parse(e.to_string()))
}

/// CDN URL for an image path; `None` when TMDB gave no path.
pub fn image_url(size: &str, path: Option<&str>) -> Option<String> {
    path.map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.starts_with('/') {
                format!("{IMAGE_BASE}/{size}{p}")
            } else {
                format!("{IMAGE_BASE}/{size}/{p}")
            }
        })
}
