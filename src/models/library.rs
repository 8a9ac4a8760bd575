use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::genres::encode_genres;
use super::{Show, ShowId, UserId};

/// A user's saved show, with display data frozen at favoriting time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub id: i64,
    pub user_id: UserId,
    pub show_id: ShowId,
    pub show_name: String,
    pub image_url: Option<String>,
    /// Comma-joined genre list
    pub genres: Option<String>,
    pub rating: Option<f64>,
    pub added_at: DateTime<Utc>,
}

/// Favorite row before it is written
#[derive(Debug, Clone, PartialEq)]
pub struct NewFavorite {
    pub user_id: UserId,
    pub show_id: ShowId,
    pub show_name: String,
    pub image_url: Option<String>,
    pub genres: Option<String>,
    pub rating: Option<f64>,
    pub added_at: DateTime<Utc>,
}

impl NewFavorite {
    /// Copies the show's current display data into a favorite row
    pub fn snapshot(user_id: UserId, show: &Show, added_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            show_id: show.id,
            show_name: show.name.clone(),
            image_url: show.medium_image().map(str::to_string),
            genres: encode_genres(show.genres.as_deref()),
            rating: show.average_rating(),
            added_at,
        }
    }
}

/// One recorded search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHistoryEntry {
    pub id: i64,
    pub user_id: UserId,
    pub query: String,
    pub timestamp: DateTime<Utc>,
}
