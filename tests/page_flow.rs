use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use moviedeck::app::{build_router, AppState};
use moviedeck::config::Session;
use moviedeck::models::{
    Actor, AuthorDetails, Credits, Crew, ExternalIds, Genre, MovieDetails, MovieList,
    MovieSummary, Paged, Review, TrendingPeriod, TvList, TvShowSummary,
};
use moviedeck::render::{PLACEHOLDER_BACKDROP, PLACEHOLDER_POSTER};
use moviedeck::tmdb::{TmdbApi, TmdbError, TmdbResult};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

#[derive(Clone, Copy, PartialEq)]
enum Upstream {
    Ok,
    Unauthorized,
    Broken,
    Missing,
}

struct FakeTmdb {
    upstream: Upstream,
    details: MovieDetails,
    credits: Credits,
    external_ids: ExternalIds,
    reviews: Vec<Review>,
    calls: Mutex<Vec<String>>,
}

impl FakeTmdb {
    fn new(upstream: Upstream) -> Self {
        Self {
            upstream,
            details: movie_details(),
            credits: credits(14, 8),
            external_ids: ExternalIds {
                facebook_id: Some("inceptionmovie".to_string()),
                instagram_id: None,
                twitter_id: Some("".to_string()),
                imdb_id: Some("tt1375666".to_string()),
            },
            reviews: vec![review()],
            calls: Mutex::new(Vec::new()),
        }
    }

    fn respond<T>(&self, call: String, value: T) -> TmdbResult<T> {
        self.calls.lock().unwrap().push(call);
        match self.upstream {
            Upstream::Ok => Ok(value),
            Upstream::Unauthorized => Err(TmdbError::Unauthorized {
                body: r#"{"status_code":7,"status_message":"Invalid API key"}"#.to_string(),
            }),
            Upstream::Broken => Err(TmdbError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
            Upstream::Missing => Err(TmdbError::NotFound),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn trending_movies(&self, period: TrendingPeriod) -> TmdbResult<Vec<MovieSummary>> {
        self.respond(
            format!("trending/movie/{}", period.as_str()),
            vec![movie_summary(1, &format!("Trending {}", period.as_str()))],
        )
    }

    async fn trending_tv(&self, period: TrendingPeriod) -> TmdbResult<Vec<TvShowSummary>> {
        self.respond(
            format!("trending/tv/{}", period.as_str()),
            vec![tv_summary(2, &format!("Show {}", period.as_str()))],
        )
    }

    async fn movie_list(&self, list: MovieList, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        self.respond(
            format!("movie/{}?page={page}", list.as_str()),
            Paged {
                page,
                results: vec![movie_summary(3, &format!("{} movie", list.as_str()))],
                total_pages: 4,
                total_results: 80,
            },
        )
    }

    async fn tv_list(&self, list: TvList) -> TmdbResult<Vec<TvShowSummary>> {
        self.respond(
            format!("tv/{}", list.as_str()),
            vec![tv_summary(4, &format!("{} show", list.as_str()))],
        )
    }

    async fn movie_details(&self, id: u64) -> TmdbResult<MovieDetails> {
        self.respond(format!("movie/{id}"), self.details.clone())
    }

    async fn movie_credits(&self, id: u64) -> TmdbResult<Credits> {
        self.respond(format!("movie/{id}/credits"), self.credits.clone())
    }

    async fn movie_external_ids(&self, id: u64) -> TmdbResult<ExternalIds> {
        self.respond(format!("movie/{id}/external_ids"), self.external_ids.clone())
    }

    async fn movie_reviews(&self, id: u64) -> TmdbResult<Vec<Review>> {
        self.respond(format!("movie/{id}/reviews"), self.reviews.clone())
    }

    async fn watchlist_movies(&self, session: &Session) -> TmdbResult<Vec<MovieSummary>> {
        self.respond(
            format!("account/{}/watchlist/movies", session.account_id),
            vec![movie_summary(5, "Saved movie")],
        )
    }

    async fn watchlist_tv(&self, session: &Session) -> TmdbResult<Vec<TvShowSummary>> {
        self.respond(format!("account/{}/watchlist/tv", session.account_id), vec![])
    }
}

fn movie_summary(id: u64, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        original_title: title.to_string(),
        backdrop_path: None,
        poster_path: Some(format!("/poster-{id}.jpg")),
        release_date: Some("2024-03-01".to_string()),
    }
}

fn tv_summary(id: u64, name: &str) -> TvShowSummary {
    TvShowSummary {
        id,
        name: name.to_string(),
        original_name: name.to_string(),
        backdrop_path: None,
        poster_path: None,
        first_air_date: Some("".to_string()),
    }
}

fn movie_details() -> MovieDetails {
    MovieDetails {
        id: 27205,
        title: "Inception".to_string(),
        original_title: "Inception".to_string(),
        tagline: Some("Your mind is the scene of the crime.".to_string()),
        genres: vec![
            Genre {
                id: 28,
                name: "Action".to_string(),
            },
            Genre {
                id: 878,
                name: "Science Fiction".to_string(),
            },
        ],
        runtime: Some(148),
        budget: 160_000_000,
        revenue: 825_532_764,
        vote_average: 8.369,
        vote_count: 35_000,
        overview: Some("Cobb, a skilled thief...".to_string()),
        status: Some("Released".to_string()),
        original_language: "en".to_string(),
        release_date: Some("2010-07-15".to_string()),
        backdrop_path: Some("/backdrop.jpg".to_string()),
        poster_path: Some("/poster.jpg".to_string()),
    }
}

fn credits(cast: u64, crew: u64) -> Credits {
    Credits {
        cast: (1..=cast)
            .map(|i| Actor {
                id: i,
                name: format!("Actor {i:02}"),
                original_name: format!("Actor {i:02}"),
                character: format!("Role {i:02}"),
                profile_path: None,
            })
            .collect(),
        crew: (1..=crew)
            .map(|i| Crew {
                id: 100 + i,
                name: format!("Crew {i:02}"),
                original_name: format!("Crew {i:02}"),
                job: "Writer".to_string(),
                profile_path: None,
            })
            .collect(),
    }
}

fn review() -> Review {
    Review {
        id: "58aa82f09251416f92006a3a".to_string(),
        author: "tanty".to_string(),
        author_details: AuthorDetails {
            rating: Some(9.0),
            avatar_path: Some("/https://secure.gravatar.com/avatar/abc.jpg".to_string()),
        },
        content: "A mind-bending <masterpiece>.".to_string(),
        created_at: "2017-02-20T05:47:28.449Z".to_string(),
    }
}

fn app_with(tmdb: FakeTmdb, session: Option<Session>) -> (Router, Arc<FakeTmdb>) {
    let tmdb = Arc::new(tmdb);
    let state = AppState {
        tmdb: tmdb.clone(),
        session,
    };
    (build_router(state), tmdb)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let res = app
        .oneshot(
            Request::get(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn home_renders_all_sections_with_defaults() {
    let (app, tmdb) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let (status, html) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Trending movies"));
    assert!(html.contains("Trending TV"));
    assert!(html.contains("Trending day"));
    assert!(html.contains("popular movie"));
    assert!(html.contains("popular show"));
    assert!(html.contains(r#"href="/movie/1""#));
    assert!(html.contains("https://image.tmdb.org/t/p/w342/poster-1.jpg"));
    // TV cards have no poster path and no valid air date.
    assert!(html.contains(PLACEHOLDER_POSTER));
    assert!(html.contains("No date"));
    assert!(html.contains("March 1, 2024"));

    let mut calls = tmdb.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "movie/popular?page=1",
            "trending/movie/day",
            "trending/tv/day",
            "tv/popular",
        ]
    );
}

#[tokio::test]
async fn home_honours_toggle_query() {
    let (app, tmdb) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let (status, html) = get(app, "/?trending_movie=week&movies=top_rated&tv=on_the_air&trending_tv=bogus").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Trending week"));
    assert!(html.contains("top_rated movie"));
    assert!(html.contains("on_the_air show"));
    assert!(html.contains(r#"<a class="on" href="/?movies=top_rated#movies""#));
    let calls = tmdb.calls();
    assert!(calls.contains(&"trending/tv/day".to_string()));
    assert!(calls.contains(&"trending/movie/week".to_string()));
}

#[tokio::test]
async fn section_fragments_swap_toggles() {
    let (app, _) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let (status, html) = get(app.clone(), "/sections/trending/tv?period=week").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.starts_with(r#"<section class="section" id="trending-tv">"#));
    assert!(html.contains("Show week"));
    assert!(!html.contains("<html"));

    let (status, html) = get(app.clone(), "/sections/movies?list=upcoming").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("upcoming movie"));

    let (status, _) = get(app.clone(), "/sections/tv?list=upcoming").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app, "/sections/trending/people?period=day").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn home_sections_stay_loading_on_unauthorized() {
    let (app, _) = app_with(FakeTmdb::new(Upstream::Unauthorized), None);
    let (status, html) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches(r#"aria-busy="true""#).count(), 4);
    assert!(!html.contains("unavailable"));
}

#[tokio::test]
async fn home_sections_report_other_failures() {
    let (app, _) = app_with(FakeTmdb::new(Upstream::Broken), None);
    let (status, html) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches("This list is unavailable right now.").count(), 4);
}

#[tokio::test]
async fn movie_detail_renders_everything() {
    let (app, tmdb) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let (status, html) = get(app, "/movie/27205").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>Inception</title>"));
    assert!(html.contains("https://image.tmdb.org/t/p/w1280/backdrop.jpg"));
    assert!(html.contains("https://image.tmdb.org/t/p/w780/poster.jpg"));
    assert!(html.contains("(2010)"));
    assert!(html.contains("148 min"));
    assert!(html.contains("8.37"));
    assert!(html.contains("35000 votes"));
    assert!(html.contains("$160,000,000.00"));
    assert!(html.contains("$825,532,764.00"));
    assert!(html.contains("English"));
    assert!(html.contains("Your mind is the scene of the crime."));
    assert!(html.contains(r#"href="https://www.facebook.com/inceptionmovie""#));
    assert_eq!(html.matches(r#"class="icon disabled""#).count(), 2);
    assert!(html.contains("A mind-bending &lt;masterpiece&gt;."));
    assert!(html.contains("February 20, 2017"));
    assert!(html.contains(r#"src="https://secure.gravatar.com/avatar/abc.jpg""#));

    let mut calls = tmdb.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "movie/27205",
            "movie/27205/credits",
            "movie/27205/external_ids",
            "movie/27205/reviews",
        ]
    );
}

#[tokio::test]
async fn movie_detail_truncates_cast_and_crew() {
    let (app, tmdb) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let (_, html) = get(app, "/movie/27205").await;
    assert!(html.contains("Actor 10"));
    assert!(!html.contains("Actor 11"));
    assert!(html.contains("Crew 05"));
    assert!(!html.contains("Crew 06"));
    // the fake's own credits are untouched
    assert_eq!(tmdb.credits.cast.len(), 14);
}

#[tokio::test]
async fn movie_detail_without_images_uses_placeholders() {
    let mut fake = FakeTmdb::new(Upstream::Ok);
    fake.details.backdrop_path = None;
    fake.details.poster_path = None;
    let (app, _) = app_with(fake, None);
    let (status, html) = get(app, "/movie/27205").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(&format!(r#"class="backdrop" src="{PLACEHOLDER_BACKDROP}""#)));
    assert!(html.contains(&format!(r#"class="poster" src="{PLACEHOLDER_POSTER}""#)));
    assert!(!html.contains("t/p/w1280"));
    assert!(!html.contains("t/p/w780"));
    assert!(!html.contains("undefined"));
    assert!(!html.contains("None"));
}

#[tokio::test]
async fn movie_detail_without_reviews_shows_empty_state() {
    let mut fake = FakeTmdb::new(Upstream::Ok);
    fake.reviews.clear();
    let (app, _) = app_with(fake, None);
    let (_, html) = get(app, "/movie/27205").await;
    assert!(html.contains("review-empty"));
    assert!(html.contains("There are no reviews yet!"));
    assert!(html.contains("(0)"));
    assert!(!html.contains(r#"<article class="review">"#));
}

#[tokio::test]
async fn movie_detail_zero_budget_renders_dash() {
    let mut fake = FakeTmdb::new(Upstream::Ok);
    fake.details.budget = 0;
    fake.details.revenue = 0;
    let (app, _) = app_with(fake, None);
    let (_, html) = get(app, "/movie/27205").await;
    assert!(html.contains("<h3>Budget</h3><span>-</span>"));
    assert!(html.contains("<h3>Revenue</h3><span>-</span>"));
    assert!(!html.contains("$0.00"));
}

#[tokio::test]
async fn movie_detail_stays_loading_on_unauthorized() {
    let (app, _) = app_with(FakeTmdb::new(Upstream::Unauthorized), None);
    let (status, html) = get(app, "/movie/27205").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"class="spinner""#));
    assert!(html.contains(r#"http-equiv="refresh""#));
    assert!(!html.contains("Inception"));
}

#[tokio::test]
async fn movie_detail_upstream_errors() {
    let (app, _) = app_with(FakeTmdb::new(Upstream::Missing), None);
    let (status, _) = get(app, "/movie/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (app, _) = app_with(FakeTmdb::new(Upstream::Broken), None);
    let (status, html) = get(app, "/movie/1").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(html.contains("Something went wrong"));
}

#[tokio::test]
async fn movie_detail_rejects_non_numeric_id() {
    let (app, tmdb) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let (status, _) = get(app, "/movie/inception").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(tmdb.calls().is_empty());
}

#[tokio::test]
async fn popular_listing_pages() {
    let (app, tmdb) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let (status, html) = get(app.clone(), "/movies/popular?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Popular movies"));
    assert!(html.contains("Page 2 of 4"));
    assert!(html.contains("/movies/popular?page=3"));

    let (_, _) = get(app, "/movies/popular?page=0").await;
    assert_eq!(
        tmdb.calls(),
        vec!["movie/popular?page=2", "movie/popular?page=1"]
    );
}

#[tokio::test]
async fn watchlist_requires_session() {
    let (app, tmdb) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let (status, html) = get(app, "/watchlist/movies").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No account session is configured"));
    assert!(tmdb.calls().is_empty());
}

#[tokio::test]
async fn watchlist_uses_explicit_session() {
    let session = Session {
        account_id: "42".to_string(),
        session_id: "sess".to_string(),
    };
    let (app, tmdb) = app_with(FakeTmdb::new(Upstream::Ok), Some(session));
    let (status, html) = get(app.clone(), "/watchlist/movies").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Saved movie"));

    let (status, html) = get(app.clone(), "/watchlist/tv").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("You haven&#39;t added any TV shows to your watchlist."));

    let (status, _) = get(app, "/watchlist/people").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        tmdb.calls(),
        vec!["account/42/watchlist/movies", "account/42/watchlist/tv"]
    );
}

#[tokio::test]
async fn serves_placeholders_and_health() {
    let (app, _) = app_with(FakeTmdb::new(Upstream::Ok), None);
    let res = app
        .clone()
        .oneshot(
            Request::get(PLACEHOLDER_POSTER)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "image/svg+xml"
    );

    let (status, body) = get(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, _) = get(app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
