//! Fetch what the movie detail page would show for one TMDB id and print it.
//! Usage:
//!   cargo run --bin tmdb_probe -- movie <tmdb_id>
//!   cargo run --bin tmdb_probe -- trending <movie|tv> <day|week>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use moviedeck::config::Config;
use moviedeck::format::{format_currency, format_date, language_name};
use moviedeck::models::{MediaType, TrendingPeriod, DETAIL_CAST_LIMIT, DETAIL_CREW_LIMIT};
use moviedeck::tmdb::{image_url, TmdbApi, TmdbClient};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: cargo run --bin tmdb_probe -- movie <tmdb_id>");
        eprintln!("       cargo run --bin tmdb_probe -- trending <movie|tv> <day|week>");
        std::process::exit(1);
    }

    let config = Config::from_env()?;
    let client = TmdbClient::from_config(&config);

    match args[1].as_str() {
        "movie" => {
            let id: u64 = args[2].parse().context("tmdb_id must be an integer")?;
            probe_movie(&client, id).await
        }
        "trending" => {
            let media = MediaType::parse(&args[2])
                .ok_or_else(|| anyhow!("media must be 'movie' or 'tv'"))?;
            let period = args
                .get(3)
                .map(String::as_str)
                .map(|p| TrendingPeriod::parse(p).ok_or_else(|| anyhow!("period must be 'day' or 'week'")))
                .transpose()?
                .unwrap_or(TrendingPeriod::Day);
            probe_trending(&client, media, period).await
        }
        other => Err(anyhow!("unknown command '{}'", other)),
    }
}

async fn probe_movie(client: &TmdbClient, id: u64) -> Result<()> {
    let (details, credits, external_ids, reviews) = tokio::try_join!(
        client.movie_details(id),
        client.movie_credits(id),
        client.movie_external_ids(id),
        client.movie_reviews(id),
    )?;
    let credits = credits.truncated(DETAIL_CAST_LIMIT, DETAIL_CREW_LIMIT);

    println!("{} ({})", details.title, details.id);
    println!(
        "  released: {}",
        format_date(details.release_date.as_deref().unwrap_or_default())
    );
    println!("  language: {}", language_name(&details.original_language));
    println!("  budget:   {}", format_currency(details.budget));
    println!("  revenue:  {}", format_currency(details.revenue));
    println!(
        "  poster:   {}",
        image_url("w780", details.poster_path.as_deref()).unwrap_or_else(|| "<placeholder>".into())
    );
    println!(
        "  backdrop: {}",
        image_url("w1280", details.backdrop_path.as_deref()).unwrap_or_else(|| "<placeholder>".into())
    );
    for crew in &credits.crew {
        println!("  crew: {} - {}", crew.name, crew.job);
    }
    for actor in &credits.cast {
        println!("  cast: {} as {}", actor.name, actor.character);
    }
    for (network, link) in external_ids.social_links() {
        println!("  {}: {}", network.label(), link.unwrap_or_else(|| "-".into()));
    }
    println!("  reviews: {}", reviews.len());
    Ok(())
}

async fn probe_trending(client: &TmdbClient, media: MediaType, period: TrendingPeriod) -> Result<()> {
    match media {
        MediaType::Movie => {
            for movie in client.trending_movies(period).await? {
                println!("{:>8}  {}", movie.id, movie.display_title());
            }
        }
        MediaType::Tv => {
            for show in client.trending_tv(period).await? {
                println!("{:>8}  {}", show.id, show.display_name());
            }
        }
    }
    Ok(())
}
