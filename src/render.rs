//! Server-side HTML for every page and home-page fragment.
//!
//! Interpolated text is entity-encoded with `html_escape`: `text` for element
//! content, `attr` for double-quoted attribute values. Image URLs are only built
//! when TMDB returned a path; otherwise the bundled placeholders are used.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::format::{
    avatar_url, format_currency, format_date, format_label, format_vote_average, language_name,
    release_year,
};
use crate::models::{
    Credits, ExternalIds, MediaType, MovieDetails, MovieSummary, Paged, Review, TvShowSummary,
    MAX_LIST_PAGE,
};
use crate::tmdb::image_url;

pub const PLACEHOLDER_POSTER: &str = "/static/placeholder-poster.svg";
pub const PLACEHOLDER_BACKDROP: &str = "/static/placeholder-backdrop.svg";

pub const PLACEHOLDER_POSTER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="780" height="1170" viewBox="0 0 780 1170"><rect width="780" height="1170" fill="#404040"/><path d="M290 470h200v230H290z" fill="none" stroke="#a3a3a3" stroke-width="16"/><circle cx="350" cy="540" r="22" fill="#a3a3a3"/><path d="M300 690l70-90 50 55 30-35 30 70z" fill="#a3a3a3"/></svg>"##;
pub const PLACEHOLDER_BACKDROP_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="1280" height="720" viewBox="0 0 1280 720"><rect width="1280" height="720" fill="#262626"/><path d="M540 250h200v220H540z" fill="none" stroke="#525252" stroke-width="16"/><circle cx="600" cy="315" r="22" fill="#525252"/><path d="M550 460l70-90 50 55 30-35 30 70z" fill="#525252"/></svg>"##;

const STYLE: &str = r#"
body{margin:0;background:#171717;color:#f5f5f5;font-family:system-ui,sans-serif}
a{color:inherit}
header,footer{background:#262626;padding:12px 24px;display:flex;gap:16px;align-items:center}
footer{justify-content:center;color:#a3a3a3;margin-top:32px}
main{max-width:1024px;margin:0 auto;padding:16px 24px}
.section{margin-bottom:40px}
.section-head{display:flex;justify-content:space-between;align-items:center}
.toggle a{padding:4px 12px;border:1px solid #262626;background:#e5e5e5;color:#262626;text-decoration:none}
.toggle a.on{background:#10b981;color:#fafafa}
.carousel{display:flex;gap:8px;overflow-x:auto;padding-bottom:12px}
.card{min-width:150px;max-width:150px;text-decoration:none}
.card img{width:150px;border-radius:4px}
.card .date{color:#a3a3a3;font-size:.85em}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(150px,1fr));gap:12px}
.skeleton{height:225px;background:#404040;border-radius:4px;min-width:150px}
.notice{color:#a3a3a3}
.banner{position:relative}
.banner .backdrop{width:100%;opacity:.5}
.banner .overlay{position:absolute;inset:0;display:flex;gap:16px;align-items:center;padding:32px}
.banner .poster{width:240px;border:1px solid #d4d4d4;border-radius:4px}
.tagline{font-style:italic;color:#a3a3a3}
.crew{display:grid;grid-template-columns:repeat(3,1fr)}
.info{display:grid;grid-template-columns:1fr 1fr}
.review{background:#525252;border-radius:4px;padding:12px;margin-bottom:12px}
.review img{width:28px;height:28px;border-radius:50%}
.review .created{text-align:right;font-style:italic;color:#a3a3a3}
.icon.disabled{cursor:not-allowed;opacity:.4}
.empty{text-align:center;color:#d4d4d4}
.spinner{width:32px;height:32px;border:4px solid #525252;border-top-color:#f5f5f5;border-radius:50%;animation:spin 1s linear infinite;margin:40vh auto}
@keyframes spin{to{transform:rotate(360deg)}}
"#;

// Toggle links fall back to a full reload; with scripting they swap the section in place.
// Only the latest click per section may replace it.
const TOGGLE_SCRIPT: &str = r#"
var latest = {};
document.addEventListener('click', function (ev) {
  var link = ev.target.closest('a[data-fragment]');
  if (!link) return;
  ev.preventDefault();
  var id = link.dataset.section;
  var token = (latest[id] || 0) + 1;
  latest[id] = token;
  fetch(link.dataset.fragment).then(function (res) {
    if (!res.ok) throw new Error(res.status);
    return res.text();
  }).then(function (html) {
    if (latest[id] !== token) return;
    var section = document.getElementById(id);
    if (section) section.outerHTML = html;
  }).catch(function () {
    if (latest[id] === token) window.location = link.href;
  });
});
"#;

pub fn layout(title: &str, body: &str) -> String {
    layout_with_head(title, "", body)
}

fn layout_with_head(title: &str, head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
{head}<style>{STYLE}</style>
</head>
<body>
<header><a href="/"><strong>MovieDeck</strong></a><a href="/movies/popular">Popular</a><a href="/watchlist/movies">Watchlist</a></header>
{body}
<footer><span>Data provided by TMDB</span></footer>
<script>{TOGGLE_SCRIPT}</script>
</body>
</html>
"#,
        title = text(title),
    )
}

/// Shown while a page is missing data it needs. Re-requests itself.
pub fn loading_page() -> String {
    layout_with_head(
        "Loading",
        "<meta http-equiv=\"refresh\" content=\"5\">\n",
        r#"<div class="spinner" role="status" aria-label="Loading"></div>"#,
    )
}

pub fn error_page(title: &str, message: &str) -> String {
    layout(
        title,
        &format!(
            r#"<main><h1>{}</h1><p class="notice">{}</p><p><a href="/">Back home</a></p></main>"#,
            text(title),
            text(message)
        ),
    )
}

fn poster_src(path: Option<&str>, size: &str) -> String {
    image_url(size, path).unwrap_or_else(|| PLACEHOLDER_POSTER.to_string())
}

fn movie_card(movie: &MovieSummary) -> String {
    let date = movie.release_date.as_deref().unwrap_or_default();
    format!(
        r#"<a class="card" href="/movie/{id}"><img src="{src}" alt="" loading="lazy"><div class="title">{title}</div><div class="date">{date}</div></a>"#,
        id = movie.id,
        src = attr(&poster_src(movie.poster_path.as_deref(), "w342")),
        title = text(movie.display_title()),
        date = text(&format_date(date)),
    )
}

fn tv_card(show: &TvShowSummary) -> String {
    let date = show.first_air_date.as_deref().unwrap_or_default();
    format!(
        r#"<div class="card"><img src="{src}" alt="" loading="lazy"><div class="title">{name}</div><div class="date">{date}</div></div>"#,
        src = attr(&poster_src(show.poster_path.as_deref(), "w342")),
        name = text(show.display_name()),
        date = text(&format_date(date)),
    )
}

pub fn movie_carousel(movies: &[MovieSummary]) -> String {
    let cards: String = movies.iter().map(movie_card).collect();
    format!(r#"<div class="carousel">{cards}</div>"#)
}

pub fn tv_carousel(shows: &[TvShowSummary]) -> String {
    let cards: String = shows.iter().map(tv_card).collect();
    format!(r#"<div class="carousel">{cards}</div>"#)
}

/// What a home section currently has to show.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Ready(String),
    Loading,
    Unavailable,
}

/// A home-page section with a single-choice toggle group.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub id: &'a str,
    pub title: &'a str,
    /// Query parameter the home page reads for this section.
    pub param: &'a str,
    /// Fragment endpoint; the option is appended as `{fragment}{value}`.
    pub fragment: &'a str,
    pub options: &'a [&'static str],
    pub current: &'a str,
}

pub fn section(group: &Section<'_>, body: SectionBody) -> String {
    let mut toggles = String::new();
    for option in group.options {
        let class = if *option == group.current { "on" } else { "off" };
        let _ = write!(
            toggles,
            r#"<a class="{class}" href="/?{param}={value}#{id}" data-section="{id}" data-fragment="{fragment}{value}">{label}</a>"#,
            param = attr(group.param),
            value = attr(option),
            id = attr(group.id),
            fragment = attr(group.fragment),
            label = text(&format_label(option)),
        );
    }

    let content = match body {
        SectionBody::Ready(html) => html,
        SectionBody::Loading => {
            let tiles: String = (0..6).map(|_| r#"<div class="skeleton"></div>"#).collect();
            format!(r#"<div class="carousel" aria-busy="true">{tiles}</div>"#)
        }
        SectionBody::Unavailable => {
            r#"<p class="notice">This list is unavailable right now.</p>"#.to_string()
        }
    };

    format!(
        r#"<section class="section" id="{id}"><div class="section-head"><h2>{title}</h2><div class="toggle" role="group">{toggles}</div></div>{content}</section>"#,
        id = attr(group.id),
        title = text(group.title),
    )
}

pub fn home_page(sections: &[String]) -> String {
    layout("MovieDeck", &format!("<main>{}</main>", sections.concat()))
}

pub fn movie_detail_page(
    details: &MovieDetails,
    credits: &Credits,
    external_ids: &ExternalIds,
    reviews: &[Review],
) -> String {
    let mut body = String::from("<main>");
    body.push_str(&banner(details, credits));
    body.push_str(&cast_section(credits));
    body.push_str(&informations(details));
    body.push_str(&external_links(external_ids));
    body.push_str(&reviews_section(reviews));
    body.push_str("</main>");
    let title = if details.original_title.is_empty() {
        &details.title
    } else {
        &details.original_title
    };
    layout(title, &body)
}

fn banner(details: &MovieDetails, credits: &Credits) -> String {
    let backdrop = image_url("w1280", details.backdrop_path.as_deref())
        .unwrap_or_else(|| PLACEHOLDER_BACKDROP.to_string());
    let poster = poster_src(details.poster_path.as_deref(), "w780");
    let title = if details.original_title.is_empty() {
        &details.title
    } else {
        &details.original_title
    };
    let release = details.release_date.as_deref().unwrap_or_default();
    let year = release_year(release)
        .map(|y| format!(r#" <span class="notice">({y})</span>"#))
        .unwrap_or_default();
    let genres: String = details
        .genres
        .iter()
        .map(|g| format!("<u>{}</u> ", text(&g.name)))
        .collect();
    let runtime = details
        .runtime
        .map(|r| format!(" &middot; {r} min"))
        .unwrap_or_default();
    let tagline = details
        .tagline
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| format!(r#"<p class="tagline">{}</p>"#, text(t)))
        .unwrap_or_default();
    let overview = details
        .overview
        .as_deref()
        .filter(|o| !o.is_empty())
        .map(|o| format!("<p>{}</p>", text(o)))
        .unwrap_or_default();
    let crew: String = credits
        .crew
        .iter()
        .map(|c| {
            format!(
                r#"<div><div>{}</div><div class="notice">{}</div></div>"#,
                text(person_name(&c.original_name, &c.name)),
                text(&c.job)
            )
        })
        .collect();

    format!(
        r#"<section class="banner"><img class="backdrop" src="{backdrop}" alt=""><div class="overlay"><img class="poster" src="{poster}" alt=""><div><h1>{title}{year}</h1><div>{release} &middot; {genres}{runtime}</div><div class="votes">&#9733; {votes} &middot; {count} votes <span class="icon" title="Watchlist">&#128278;</span> <span class="icon" title="Favorite">&#9829;</span> <span class="icon" title="Rate">&#9733;</span></div>{tagline}<h2>Overview</h2>{overview}<div class="crew">{crew}</div></div></div></section>"#,
        backdrop = attr(&backdrop),
        poster = attr(&poster),
        title = text(title),
        release = text(release),
        votes = format_vote_average(details.vote_average),
        count = details.vote_count,
    )
}

fn person_name<'a>(original: &'a str, name: &'a str) -> &'a str {
    if original.is_empty() {
        name
    } else {
        original
    }
}

fn cast_section(credits: &Credits) -> String {
    let actors: String = credits
        .cast
        .iter()
        .map(|actor| {
            let name = person_name(&actor.original_name, &actor.name);
            format!(
                r#"<div class="card"><img src="{src}" alt=""><div title="{name}">{name}</div><div class="notice" title="{character}">{character}</div></div>"#,
                src = attr(&poster_src(actor.profile_path.as_deref(), "w185")),
                name = attr(name),
                character = attr(&actor.character),
            )
        })
        .collect();
    format!(r#"<section class="section"><h2>Cast</h2><div class="carousel">{actors}</div></section>"#)
}

fn informations(details: &MovieDetails) -> String {
    let money = |value: u64| {
        if value == 0 {
            "-".to_string()
        } else {
            format_currency(value)
        }
    };
    format!(
        r#"<section class="section"><h2>Informations</h2><div class="info"><div><h3>Status</h3><span>{status}</span></div><div><h3>Original Language</h3><span>{language}</span></div><div><h3>Budget</h3><span>{budget}</span></div><div><h3>Revenue</h3><span>{revenue}</span></div></div></section>"#,
        status = text(details.status.as_deref().unwrap_or("-")),
        language = text(&language_name(&details.original_language)),
        budget = money(details.budget),
        revenue = money(details.revenue),
    )
}

fn external_links(ids: &ExternalIds) -> String {
    let icons: String = ids
        .social_links()
        .into_iter()
        .map(|(network, link)| match link {
            Some(href) => format!(
                r#"<a class="icon" target="_blank" rel="noopener" href="{}">{}</a> "#,
                attr(&href),
                network.label()
            ),
            None => format!(
                r#"<span class="icon disabled" aria-disabled="true">{}</span> "#,
                network.label()
            ),
        })
        .collect();
    format!(r#"<section class="section"><h2>External Links</h2><div>{icons}</div></section>"#)
}

fn reviews_section(reviews: &[Review]) -> String {
    let content = if reviews.is_empty() {
        r#"<div class="empty"><div class="icon review-empty">&#128221;</div><p><strong>There are no reviews yet!</strong></p></div>"#.to_string()
    } else {
        reviews.iter().map(review).collect()
    };
    format!(
        r#"<section class="section" id="reviews"><h2>Reviews <span class="notice">({count})</span></h2>{content}</section>"#,
        count = reviews.len(),
    )
}

fn review(review: &Review) -> String {
    let avatar = avatar_url(review.author_details.avatar_path.as_deref())
        .map(|src| format!(r#"<img src="{}" alt="">"#, attr(&src)))
        .unwrap_or_default();
    let rating = review
        .author_details
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let created = review.created_at.get(..10).unwrap_or(&review.created_at);
    format!(
        r#"<article class="review"><div class="section-head"><div>{avatar} <strong>{author}</strong></div><div>&#9733; {rating}</div></div><p>{content}</p><div class="created">{created}</div></article>"#,
        author = text(&review.author),
        content = text(&review.content),
        created = text(&format_date(created)),
    )
}

pub fn popular_page(movies: &Paged<MovieSummary>) -> String {
    let cards: String = movies.results.iter().map(movie_card).collect();
    let mut pager = String::new();
    if movies.page > 1 {
        let _ = write!(
            pager,
            r#"<a href="/movies/popular?page={}">Previous</a> "#,
            movies.page - 1
        );
    }
    let last = movies.total_pages.min(MAX_LIST_PAGE).max(movies.page);
    let _ = write!(
        pager,
        r#"<span class="notice">Page {} of {}</span>"#,
        movies.page, last
    );
    if movies.page < last {
        let _ = write!(
            pager,
            r#" <a href="/movies/popular?page={}">Next</a>"#,
            movies.page + 1
        );
    }
    layout(
        "Popular movies",
        &format!(
            r#"<main><h1>Popular movies</h1><div class="grid">{cards}</div><nav class="pager">{pager}</nav></main>"#
        ),
    )
}

/// Watchlist content for one media type.
#[derive(Debug, Clone, Copy)]
pub enum Watchlist<'a> {
    NoSession,
    Movies(&'a [MovieSummary]),
    Tv(&'a [TvShowSummary]),
}

pub fn watchlist_page(media: MediaType, list: Watchlist<'_>) -> String {
    let noun = match media {
        MediaType::Movie => "movies",
        MediaType::Tv => "TV shows",
    };
    let tabs = format!(
        r#"<div class="toggle"><a class="{}" href="/watchlist/movies">Movies</a><a class="{}" href="/watchlist/tv">TV Shows</a></div>"#,
        if media == MediaType::Movie { "on" } else { "off" },
        if media == MediaType::Tv { "on" } else { "off" },
    );
    let content = match list {
        Watchlist::NoSession => r#"<p class="empty">No account session is configured, so there is no watchlist to show.</p>"#.to_string(),
        Watchlist::Movies(movies) if !movies.is_empty() => {
            format!(r#"<div class="grid">{}</div>"#, movies.iter().map(movie_card).collect::<String>())
        }
        Watchlist::Tv(shows) if !shows.is_empty() => {
            format!(r#"<div class="grid">{}</div>"#, shows.iter().map(tv_card).collect::<String>())
        }
        _ => format!(
            r#"<div class="empty"><div class="icon">&#128203;</div><h2>You haven&#39;t added any {noun} to your watchlist.</h2></div>"#
        ),
    };
    layout(
        "Watchlist",
        &format!(r#"<main><div class="section-head"><h1>Watchlist</h1>{tabs}</div>{content}</main>"#),
    )
}
