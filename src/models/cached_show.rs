use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::genres::{decode_genres, encode_genres};
use super::{ImageUrl, Rating, Show, ShowId};

/// Local projection of a catalog show, keyed by `show_id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedShow {
    pub show_id: ShowId,
    pub name: String,
    pub language: Option<String>,
    /// Comma-joined genre list
    pub genres: Option<String>,
    pub status: Option<String>,
    pub premiered: Option<String>,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
    pub summary: Option<String>,
    pub cached_at: DateTime<Utc>,
}

impl CachedShow {
    pub fn from_show(show: &Show, cached_at: DateTime<Utc>) -> Self {
        Self {
            show_id: show.id,
            name: show.name.clone(),
            language: show.language.clone(),
            genres: encode_genres(show.genres.as_deref()),
            status: show.status.clone(),
            premiered: show.premiered.clone(),
            rating: show.average_rating(),
            image_url: show.medium_image().map(str::to_string),
            summary: show.summary.clone(),
            cached_at,
        }
    }
}

/// Only one image URL is cached, so it fills both size slots
impl From<CachedShow> for Show {
    fn from(cached: CachedShow) -> Self {
        Show {
            id: cached.show_id,
            name: cached.name,
            language: cached.language,
            genres: decode_genres(cached.genres.as_deref()),
            status: cached.status,
            premiered: cached.premiered,
            rating: cached.rating.map(|average| Rating {
                average: Some(average),
            }),
            image: cached.image_url.map(|url| ImageUrl {
                medium: Some(url.clone()),
                original: Some(url),
            }),
            summary: cached.summary,
        }
    }
}
