use crate::config::{Config, Session};
use crate::models::{
    MediaType, MovieList, TrendingPeriod, TvList, DETAIL_CAST_LIMIT, DETAIL_CREW_LIMIT,
    MAX_LIST_PAGE,
};
use crate::render::{self, Section, SectionBody, Watchlist};
use crate::tmdb::{TmdbApi, TmdbClient, TmdbError, TmdbResult};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

const PERIOD_OPTIONS: [&str; 2] = ["day", "week"];
const MOVIE_LIST_OPTIONS: [&str; 3] = ["popular", "top_rated", "upcoming"];
const TV_LIST_OPTIONS: [&str; 3] = ["popular", "top_rated", "on_the_air"];

#[derive(Clone)]
pub struct AppState {
    pub tmdb: Arc<dyn TmdbApi>,
    pub session: Option<Session>,
}

#[derive(Debug, Default, Deserialize)]
struct HomeQuery {
    trending_movie: Option<String>,
    trending_tv: Option<String>,
    movies: Option<String>,
    tv: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PeriodQuery {
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    list: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

pub async fn run_server(config: Config) -> Result<()> {
    let tmdb: Arc<dyn TmdbApi> = Arc::new(TmdbClient::from_config(&config));
    if config.session.is_some() {
        info!("Watchlist session configured");
    } else {
        info!("No TMDB session configured; watchlist pages will be empty");
    }

    let state = AppState {
        tmdb,
        session: config.session.clone(),
    };
    let app = build_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/sections/trending/:media", get(trending_fragment))
        .route("/sections/movies", get(movies_fragment))
        .route("/sections/tv", get(tv_fragment))
        .route("/movie/:id", get(movie_detail))
        .route("/movies/popular", get(popular_movies))
        .route("/watchlist/:media", get(watchlist))
        .route("/static/placeholder-poster.svg", get(placeholder_poster))
        .route("/static/placeholder-backdrop.svg", get(placeholder_backdrop))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(render::error_page("Not found", "There is nothing at this address.")),
    )
        .into_response()
}

async fn placeholder_poster() -> impl IntoResponse {
    svg(render::PLACEHOLDER_POSTER_SVG)
}

async fn placeholder_backdrop() -> impl IntoResponse {
    svg(render::PLACEHOLDER_BACKDROP_SVG)
}

fn svg(body: &'static str) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        body,
    )
}

async fn home(State(state): State<AppState>, Query(query): Query<HomeQuery>) -> Html<String> {
    let period_of = |raw: Option<&str>| {
        raw.and_then(TrendingPeriod::parse)
            .unwrap_or(TrendingPeriod::Day)
    };
    let movie_period = period_of(query.trending_movie.as_deref());
    let tv_period = period_of(query.trending_tv.as_deref());
    let movie_list = query
        .movies
        .as_deref()
        .and_then(MovieList::parse)
        .unwrap_or(MovieList::Popular);
    let tv_list = query
        .tv
        .as_deref()
        .and_then(TvList::parse)
        .unwrap_or(TvList::Popular);

    let (trending_movies, trending_tv, movies, tv) = tokio::join!(
        trending_movie_section(&state, movie_period),
        trending_tv_section(&state, tv_period),
        movie_list_section(&state, movie_list),
        tv_list_section(&state, tv_list),
    );
    Html(render::home_page(&[trending_movies, trending_tv, movies, tv]))
}

async fn trending_fragment(
    State(state): State<AppState>,
    Path(media): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let period = match query.period.as_deref() {
        None => TrendingPeriod::Day,
        Some(raw) => match TrendingPeriod::parse(raw) {
            Some(p) => p,
            None => return bad_toggle(raw),
        },
    };
    match MediaType::parse(&media) {
        Some(MediaType::Movie) => Html(trending_movie_section(&state, period).await).into_response(),
        Some(MediaType::Tv) => Html(trending_tv_section(&state, period).await).into_response(),
        None => not_found().await,
    }
}

async fn movies_fragment(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let list = match query.list.as_deref() {
        None => MovieList::Popular,
        Some(raw) => match MovieList::parse(raw) {
            Some(l) => l,
            None => return bad_toggle(raw),
        },
    };
    Html(movie_list_section(&state, list).await).into_response()
}

async fn tv_fragment(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let list = match query.list.as_deref() {
        None => TvList::Popular,
        Some(raw) => match TvList::parse(raw) {
            Some(l) => l,
            None => return bad_toggle(raw),
        },
    };
    Html(tv_list_section(&state, list).await).into_response()
}

fn bad_toggle(raw: &str) -> Response {
    warn!("Rejecting unknown toggle value {:?}", raw);
    (StatusCode::BAD_REQUEST, "unknown option").into_response()
}

async fn trending_movie_section(state: &AppState, period: TrendingPeriod) -> String {
    let body = section_body(
        "trending movies",
        state.tmdb.trending_movies(period).await,
        |movies| render::movie_carousel(&movies),
    );
    render::section(
        &Section {
            id: "trending-movie",
            title: "Trending movies",
            param: "trending_movie",
            fragment: "/sections/trending/movie?period=",
            options: &PERIOD_OPTIONS,
            current: period.as_str(),
        },
        body,
    )
}

async fn trending_tv_section(state: &AppState, period: TrendingPeriod) -> String {
    let body = section_body(
        "trending TV",
        state.tmdb.trending_tv(period).await,
        |shows| render::tv_carousel(&shows),
    );
    render::section(
        &Section {
            id: "trending-tv",
            title: "Trending TV",
            param: "trending_tv",
            fragment: "/sections/trending/tv?period=",
            options: &PERIOD_OPTIONS,
            current: period.as_str(),
        },
        body,
    )
}

async fn movie_list_section(state: &AppState, list: MovieList) -> String {
    let body = section_body(
        "movie list",
        state.tmdb.movie_list(list, 1).await,
        |page| render::movie_carousel(&page.results),
    );
    render::section(
        &Section {
            id: "movies",
            title: "Movies",
            param: "movies",
            fragment: "/sections/movies?list=",
            options: &MOVIE_LIST_OPTIONS,
            current: list.as_str(),
        },
        body,
    )
}

async fn tv_list_section(state: &AppState, list: TvList) -> String {
    let body = section_body(
        "TV list",
        state.tmdb.tv_list(list).await,
        |shows| render::tv_carousel(&shows),
    );
    render::section(
        &Section {
            id: "tv",
            title: "TV Shows",
            param: "tv",
            fragment: "/sections/tv?list=",
            options: &TV_LIST_OPTIONS,
            current: list.as_str(),
        },
        body,
    )
}

/// 401 keeps the section in its loading state; anything else is reported.
fn section_body<T>(
    what: &str,
    result: TmdbResult<T>,
    to_html: impl FnOnce(T) -> String,
) -> SectionBody {
    match result {
        Ok(data) => SectionBody::Ready(to_html(data)),
        Err(e) if e.is_unauthorized() => {
            debug!("Section '{}' left loading after 401", what);
            SectionBody::Loading
        }
        Err(e) => {
            error!("Failed to fetch {}: {}", what, e);
            SectionBody::Unavailable
        }
    }
}

async fn movie_detail(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let Ok(id) = raw_id.parse::<u64>() else {
        debug!("Non-numeric movie id {:?}", raw_id);
        return not_found().await;
    };

    let (details, credits, external_ids, reviews) = tokio::join!(
        state.tmdb.movie_details(id),
        state.tmdb.movie_credits(id),
        state.tmdb.movie_external_ids(id),
        state.tmdb.movie_reviews(id),
    );

    match (details, credits, external_ids, reviews) {
        (Ok(details), Ok(credits), Ok(external_ids), Ok(reviews)) => {
            let credits = credits.truncated(DETAIL_CAST_LIMIT, DETAIL_CREW_LIMIT);
            Html(render::movie_detail_page(
                &details,
                &credits,
                &external_ids,
                &reviews,
            ))
            .into_response()
        }
        (details, credits, external_ids, reviews) => {
            let errors: Vec<TmdbError> = [
                details.err(),
                credits.err(),
                external_ids.err(),
                reviews.err(),
            ]
            .into_iter()
            .flatten()
            .collect();
            fetch_failure(&format!("movie {id}"), &errors)
        }
    }
}

async fn popular_movies(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let page = query.page.unwrap_or(1).clamp(1, MAX_LIST_PAGE);
    match state.tmdb.movie_list(MovieList::Popular, page).await {
        Ok(movies) => Html(render::popular_page(&movies)).into_response(),
        Err(e) => fetch_failure("popular movies", &[e]),
    }
}

async fn watchlist(State(state): State<AppState>, Path(media): Path<String>) -> Response {
    let Some(media) = MediaType::parse(&media) else {
        return not_found().await;
    };
    let Some(session) = state.session.as_ref() else {
        return Html(render::watchlist_page(media, Watchlist::NoSession)).into_response();
    };

    match media {
        MediaType::Movie => match state.tmdb.watchlist_movies(session).await {
            Ok(movies) => {
                Html(render::watchlist_page(media, Watchlist::Movies(&movies))).into_response()
            }
            Err(e) => fetch_failure("movie watchlist", &[e]),
        },
        MediaType::Tv => match state.tmdb.watchlist_tv(session).await {
            Ok(shows) => Html(render::watchlist_page(media, Watchlist::Tv(&shows))).into_response(),
            Err(e) => fetch_failure("TV watchlist", &[e]),
        },
    }
}

/// Page-level fallback when required data is missing.
fn fetch_failure(what: &str, errors: &[TmdbError]) -> Response {
    if errors.iter().any(TmdbError::is_unauthorized) {
        warn!("TMDB unauthorized while loading {}; rendering loading state", what);
        return Html(render::loading_page()).into_response();
    }
    if errors.iter().any(|e| matches!(e, TmdbError::NotFound)) {
        info!("TMDB has no {}", what);
        return (
            StatusCode::NOT_FOUND,
            Html(render::error_page("Not found", "TMDB has no such title.")),
        )
            .into_response();
    }
    for e in errors {
        error!("Failed to load {}: {}", what, e);
    }
    (
        StatusCode::BAD_GATEWAY,
        Html(render::error_page(
            "Something went wrong",
            "The movie database could not be reached. Try again shortly.",
        )),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
