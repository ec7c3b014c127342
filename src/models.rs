use serde::Deserialize;

/// Cast and crew counts shown on the movie detail page.
pub const DETAIL_CAST_LIMIT: usize = 10;
pub const DETAIL_CREW_LIMIT: usize = 5;

// TMDB refuses list pages past 500.
pub const MAX_LIST_PAGE: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" | "movies" => Some(MediaType::Movie),
            "tv" => Some(MediaType::Tv),
            _ => None,
        }
    }

    /// Path segment used by the account watchlist endpoint.
    pub fn watchlist_segment(self) -> &'static str {
        match self {
            MediaType::Movie => "movies",
            MediaType::Tv => "tv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingPeriod {
    Day,
    Week,
}

impl TrendingPeriod {
    pub const ALL: [TrendingPeriod; 2] = [TrendingPeriod::Day, TrendingPeriod::Week];

    pub fn as_str(self) -> &'static str {
        match self {
            TrendingPeriod::Day => "day",
            TrendingPeriod::Week => "week",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieList {
    Popular,
    TopRated,
    Upcoming,
}

impl MovieList {
    pub const ALL: [MovieList; 3] = [MovieList::Popular, MovieList::TopRated, MovieList::Upcoming];

    pub fn as_str(self) -> &'static str {
        match self {
            MovieList::Popular => "popular",
            MovieList::TopRated => "top_rated",
            MovieList::Upcoming => "upcoming",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvList {
    Popular,
    TopRated,
    OnTheAir,
}

impl TvList {
    pub const ALL: [TvList; 3] = [TvList::Popular, TvList::TopRated, TvList::OnTheAir];

    pub fn as_str(self) -> &'static str {
        match self {
            TvList::Popular => "popular",
            TvList::TopRated => "top_rated",
            TvList::OnTheAir => "on_the_air",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == s)
    }
}

/// One page of a TMDB list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
}

impl MovieSummary {
    pub fn display_title(&self) -> &str {
        if self.original_title.is_empty() {
            &self.title
        } else {
            &self.original_title
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TvShowSummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    pub first_air_date: Option<String>,
}

impl TvShowSummary {
    pub fn display_name(&self) -> &str {
        if self.original_name.is_empty() {
            &self.name
        } else {
            &self.original_name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    pub tagline: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    pub overview: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub original_language: String,
    pub release_date: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Actor {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Crew {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub job: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<Actor>,
    #[serde(default)]
    pub crew: Vec<Crew>,
}

impl Credits {
    /// Copy of the first `cast` actors and `crew` members, leaving `self` untouched.
    pub fn truncated(&self, cast: usize, crew: usize) -> Credits {
        Credits {
            cast: self.cast.iter().take(cast).cloned().collect(),
            crew: self.crew.iter().take(crew).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthorDetails {
    pub rating: Option<f64>,
    pub avatar_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_details: AuthorDetails,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialNetwork {
    Facebook,
    Instagram,
    Twitter,
}

impl SocialNetwork {
    pub fn label(self) -> &'static str {
        match self {
            SocialNetwork::Facebook => "Facebook",
            SocialNetwork::Instagram => "Instagram",
            SocialNetwork::Twitter => "Twitter",
        }
    }

    fn profile_base(self) -> &'static str {
        match self {
            SocialNetwork::Facebook => "https://www.facebook.com/",
            SocialNetwork::Instagram => "https://www.instagram.com/",
            SocialNetwork::Twitter => "https://www.twitter.com/",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExternalIds {
    pub facebook_id: Option<String>,
    pub instagram_id: Option<String>,
    pub twitter_id: Option<String>,
    pub imdb_id: Option<String>,
}

impl ExternalIds {
    /// Outbound profile link per network; `None` when the id is missing or blank.
    pub fn social_links(&self) -> Vec<(SocialNetwork, Option<String>)> {
        [
            (SocialNetwork::Facebook, &self.facebook_id),
            (SocialNetwork::Instagram, &self.instagram_id),
            (SocialNetwork::Twitter, &self.twitter_id),
        ]
        .into_iter()
        .map(|(network, id)| {
            let link = id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| format!("{}{}", network.profile_base(), id));
            (network, link)
        })
        .collect()
    }
}
