use serde::{Deserialize, Serialize};

pub mod cached_show;
pub mod genres;
pub mod library;
pub mod user;

pub use cached_show::CachedShow;
pub use library::{Favorite, NewFavorite, SearchHistoryEntry};
pub use user::{NewUser, User, UserResponse};

/// Stable catalog identity of a show
pub type ShowId = i64;

/// Local user identity
pub type UserId = i64;

/// A show as returned by the remote catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Show {
    pub id: ShowId,
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub premiered: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub image: Option<ImageUrl>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Show {
    /// Average rating on a 0.0 - 10.0 scale, when the catalog has one
    pub fn average_rating(&self) -> Option<f64> {
        self.rating.as_ref().and_then(|r| r.average)
    }

    /// The image URL kept for local snapshots
    pub fn medium_image(&self) -> Option<&str> {
        self.image.as_ref().and_then(|i| i.medium.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    #[serde(default)]
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

/// One hit from a catalog text search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowSearchResult {
    pub score: f64,
    pub show: Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_deserialization_ignores_unknown_fields() {
        let json = r#"{
            "id": 169,
            "url": "https://www.tvmaze.com/shows/169/breaking-bad",
            "name": "Breaking Bad",
            "type": "Scripted",
            "language": "English",
            "genres": ["Drama", "Crime", "Thriller"],
            "status": "Ended",
            "premiered": "2008-01-20",
            "rating": { "average": 9.2 },
            "image": {
                "medium": "https://static.tvmaze.com/medium/501.jpg",
                "original": "https://static.tvmaze.com/original/501.jpg"
            },
            "summary": "<p>A chemistry teacher.</p>"
        }"#;

        let show: Show = serde_json::from_str(json).unwrap();
        assert_eq!(show.id, 169);
        assert_eq!(show.name, "Breaking Bad");
        assert_eq!(
            show.genres,
            Some(vec![
                "Drama".to_string(),
                "Crime".to_string(),
                "Thriller".to_string()
            ])
        );
        assert_eq!(show.average_rating(), Some(9.2));
        assert_eq!(
            show.medium_image(),
            Some("https://static.tvmaze.com/medium/501.jpg")
        );
    }

    #[test]
    fn test_show_deserialization_with_nulls() {
        let json = r#"{
            "id": 1,
            "name": "Obscure Pilot",
            "language": null,
            "genres": [],
            "rating": { "average": null },
            "image": null
        }"#;

        let show: Show = serde_json::from_str(json).unwrap();
        assert_eq!(show.average_rating(), None);
        assert_eq!(show.medium_image(), None);
        assert_eq!(show.genres, Some(vec![]));
        assert_eq!(show.status, None);
    }

    #[test]
    fn test_search_result_deserialization() {
        let json = r#"[{ "score": 0.91, "show": { "id": 169, "name": "Breaking Bad" } }]"#;
        let results: Vec<ShowSearchResult> = serde_json::from_str(json).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].show.id, 169);
    }
}
