//! TVMaze catalog client
//!
//! API Flow:
//! 1. Search: /search/shows?q={query} → scored show hits
//! 2. Details: /shows/{id} → single show
//! 3. Index: /shows?page={n} → 250 shows per page, ordered by id
//!
//! Timeouts are enforced by the HTTP client; a timed-out request is an ordinary error.

use std::time::Duration;

use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{Show, ShowId, ShowSearchResult},
    services::catalog::CatalogClient,
};

#[derive(Clone)]
pub struct TvMazeClient {
    http_client: HttpClient,
    api_url: String,
}

impl TvMazeClient {
    pub fn new(
        api_url: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.catalog_api_url.clone(),
            config.catalog_connect_timeout(),
            config.catalog_read_timeout(),
        )
    }

    /// Rejects non-2xx responses, then decodes the body
    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TVMaze API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to deserialize TVMaze response");
            AppError::ExternalApi(format!("Failed to parse TVMaze response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl CatalogClient for TvMazeClient {
    async fn search(&self, query: &str) -> AppResult<Vec<ShowSearchResult>> {
        let url = format!("{}/search/shows", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?;

        let results: Vec<ShowSearchResult> = Self::decode(response).await?;

        tracing::info!(
            query = %query,
            results = results.len(),
            provider = self.name(),
            "Catalog search completed"
        );

        Ok(results)
    }

    async fn fetch_by_id(&self, show_id: ShowId) -> AppResult<Show> {
        let url = format!("{}/shows/{}", self.api_url, show_id);

        let response = self.http_client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Show {} not in catalog", show_id)));
        }

        Self::decode(response).await
    }

    async fn list_page(&self, page: u32) -> AppResult<Vec<Show>> {
        let url = format!("{}/shows", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("page", page)])
            .send()
            .await?;

        let shows: Vec<Show> = Self::decode(response).await?;

        tracing::debug!(page, shows = shows.len(), provider = self.name(), "Catalog page fetched");

        Ok(shows)
    }

    fn name(&self) -> &'static str {
        "tvmaze"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TvMazeClient {
        TvMazeClient::new(
            server.uri(),
            Duration::from_secs(2),
            Duration::from_millis(500),
        )
        .unwrap()
    }

    fn show_json(id: i64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "language": "English",
            "genres": ["Drama"],
            "rating": { "average": 8.1 },
            "image": { "medium": "https://img/m.jpg", "original": "https://img/o.jpg" }
        })
    }

    #[tokio::test]
    async fn test_search_sends_query_and_decodes_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/shows"))
            .and(query_param("q", "girls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "score": 0.9, "show": show_json(139, "Girls") },
                { "score": 0.4, "show": show_json(23542, "Good Girls") }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server).search("girls").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].show.name, "Girls");
        assert_eq!(results[1].score, 0.4);
    }

    #[tokio::test]
    async fn test_search_non_success_is_external_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/shows"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("girls").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(ref msg) if msg.contains("503")));
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_malformed_body_is_external_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/shows"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("girls").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_stalled_response_hits_read_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/shows"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).search("girls").await.unwrap_err();
        assert!(matches!(err, AppError::HttpClient(_)));
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn test_fetch_by_id_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shows/999999"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_by_id(999999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_by_id_decodes_show() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shows/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(show_json(1, "Under the Dome")))
            .mount(&server)
            .await;

        let show = client_for(&server).fetch_by_id(1).await.unwrap();
        assert_eq!(show.name, "Under the Dome");
        assert_eq!(show.average_rating(), Some(8.1));
    }

    #[tokio::test]
    async fn test_list_page_passes_page_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shows"))
            .and(query_param("page", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                show_json(1, "Under the Dome"),
                show_json(2, "Person of Interest")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let shows = client_for(&server).list_page(0).await.unwrap();
        assert_eq!(shows.len(), 2);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = TvMazeClient::new(
            "https://api.tvmaze.com/",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.api_url, "https://api.tvmaze.com");
    }
}
