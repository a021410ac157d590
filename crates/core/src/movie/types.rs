//! Types for movies, favorites and cache entries.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Size token embedded in artwork URL templates.
const ARTWORK_SIZE_TOKEN: &str = "100x100";

/// Format of release dates as returned by the remote search endpoint.
const RAW_RELEASE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A movie as presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Movie identifier (remote track id).
    pub id: i64,
    /// Title.
    pub name: String,
    /// Artwork URL template containing a `100x100` size token.
    pub image_url: String,
    /// Price, absent for free titles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub currency: String,
    pub genre: String,
    pub long_description: String,
    /// Duration in milliseconds.
    pub duration_ms: i64,
    /// Release date in the remote's raw `YYYY-MM-DDTHH:MM:SSZ` form.
    pub release_date: String,
    /// Whether the movie is in the user's favorites.
    ///
    /// Only ever set by the feed; never read back from input.
    #[serde(default, skip_deserializing)]
    pub is_favorite: bool,
}

impl Movie {
    /// Price as displayed, `"FREE"` when the movie has no price.
    ///
    /// Amounts always carry two decimals, so `10.0` shows as `AUD 10.00`.
    pub fn display_price(&self) -> String {
        match self.price {
            None => "FREE".to_string(),
            Some(price) => format!("{} {:.2}", self.currency.to_uppercase(), price),
        }
    }

    /// Duration in whole minutes.
    pub fn minutes(&self) -> i64 {
        self.duration_ms / 60_000
    }

    /// Release date as `YYYY-MM-DD`.
    ///
    /// Falls back to the raw string when it doesn't parse.
    pub fn normalized_release_date(&self) -> String {
        NaiveDateTime::parse_from_str(&self.release_date, RAW_RELEASE_DATE_FORMAT)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.release_date.clone())
    }

    /// Artwork URL resolved for a square image of `px` pixels.
    pub fn image_url_for(&self, px: u32) -> String {
        self.image_url
            .replace(ARTWORK_SIZE_TOKEN, &format!("{}x{}", px, px))
    }

    /// Copy of this movie with the favorite annotation set.
    pub fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }
}

/// A persisted favorite (one row per movie id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub currency: String,
    pub genre: String,
    pub long_description: String,
    pub duration_ms: i64,
    pub release_date: String,
}

impl Favorite {
    pub fn to_movie(&self) -> Movie {
        Movie {
            id: self.id,
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            currency: self.currency.clone(),
            genre: self.genre.clone(),
            long_description: self.long_description.clone(),
            duration_ms: self.duration_ms,
            release_date: self.release_date.clone(),
            is_favorite: false,
        }
    }
}

impl From<&Movie> for Favorite {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            name: movie.name.clone(),
            image_url: movie.image_url.clone(),
            price: movie.price,
            currency: movie.currency.clone(),
            genre: movie.genre.clone(),
            long_description: movie.long_description.clone(),
            duration_ms: movie.duration_ms,
            release_date: movie.release_date.clone(),
        }
    }
}

/// A persisted cache row: a search result or a mirrored favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub currency: String,
    pub genre: String,
    pub long_description: String,
    pub duration_ms: i64,
    pub release_date: String,
    /// Whether this row is the one currently shown in detail.
    #[serde(default)]
    pub displayed: bool,
    /// Search term that produced this row, empty when seeded from favorites.
    #[serde(default)]
    pub keyword: String,
    /// When the row was written.
    pub saved_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build a cache row for `movie` tagged with `keyword`.
    pub fn from_movie(movie: &Movie, keyword: &str) -> Self {
        Self {
            id: movie.id,
            name: movie.name.clone(),
            image_url: movie.image_url.clone(),
            price: movie.price,
            currency: movie.currency.clone(),
            genre: movie.genre.clone(),
            long_description: movie.long_description.clone(),
            duration_ms: movie.duration_ms,
            release_date: movie.release_date.clone(),
            displayed: false,
            keyword: keyword.to_string(),
            saved_at: Utc::now(),
        }
    }

    pub fn to_movie(&self) -> Movie {
        Movie {
            id: self.id,
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
            currency: self.currency.clone(),
            genre: self.genre.clone(),
            long_description: self.long_description.clone(),
            duration_ms: self.duration_ms,
            release_date: self.release_date.clone(),
            is_favorite: false,
        }
    }
}

/// A single result as returned by the remote search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResult {
    pub track_id: i64,
    pub track_name: String,
    #[serde(rename = "artworkUrl100", default)]
    pub artwork_url: String,
    #[serde(default)]
    pub track_price: Option<f64>,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub primary_genre_name: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub track_time_millis: i64,
    #[serde(default)]
    pub release_date: String,
}

impl From<RawResult> for Movie {
    fn from(raw: RawResult) -> Self {
        Self {
            id: raw.track_id,
            name: raw.track_name,
            image_url: raw.artwork_url,
            price: raw.track_price,
            currency: raw.currency,
            genre: raw.primary_genre_name,
            long_description: raw.long_description,
            duration_ms: raw.track_time_millis,
            release_date: raw.release_date,
            is_favorite: false,
        }
    }
}
