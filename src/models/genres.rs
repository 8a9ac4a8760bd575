//! Genre lists are persisted as a single comma-joined string.
//!
//! The encoding is reversible as long as no genre name contains the delimiter
//! and no name is empty. Empty names carry nothing and are dropped when encoding,
//! so `[""]` is stored like `[]`. `None` stays `None`, and an empty list is stored
//! as an empty string.

pub const GENRE_DELIMITER: char = ',';

/// Joins a genre list into its stored form, skipping empty names
pub fn encode_genres(genres: Option<&[String]>) -> Option<String> {
    genres.map(|g| {
        g.iter()
            .filter(|name| !name.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(GENRE_DELIMITER.to_string().as_str())
    })
}

/// Splits a stored genre string back into the original ordered list
pub fn decode_genres(encoded: Option<&str>) -> Option<Vec<String>> {
    encoded.map(|s| {
        if s.is_empty() {
            Vec::new()
        } else {
            s.split(GENRE_DELIMITER).map(str::to_string).collect()
        }
    })
}

/// Trimmed, non-empty genre tokens of a stored genre string
pub fn genre_tokens(encoded: &str) -> impl Iterator<Item = &str> {
    encoded
        .split(GENRE_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
