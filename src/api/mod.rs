pub mod films;
pub mod people;
pub mod types;

use std::future::Future;
use std::time::Duration;

use reqwest::Response;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::types::{Page, PageBody};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (status {status}): {detail}")]
    ApiError { status: u16, detail: String },
    #[error("deserialization error: {0}")]
    Deserialize(String),
}

// ---------------------------------------------------------------------------
// Fetcher contract
// ---------------------------------------------------------------------------

/// Anything that can resolve a collection or entity URL into typed data.
///
/// The list and detail controllers only ever talk to this trait, so tests can
/// hand them canned pages instead of a live server.
pub trait EntityFetcher {
    fn fetch_page<T>(&self, url: &str) -> impl Future<Output = Result<Page<T>, ApiClientError>> + Send
    where
        T: DeserializeOwned + Send;

    fn fetch_entity<T>(&self, url: &str) -> impl Future<Output = Result<T, ApiClientError>> + Send
    where
        T: DeserializeOwned + Send;
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://swapi.info/api";

/// Collections exposed by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Films,
    People,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Films => "films",
            Resource::People => "people",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwapiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SwapiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("holocron/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the first page of a collection (e.g. "<base>/films/").
    pub fn collection_url(&self, resource: Resource) -> String {
        format!("{}/{}/", self.base_url, resource.path())
    }

    /// URL of a single entity (e.g. "<base>/people/1").
    pub fn entity_url(&self, resource: Resource, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, resource.path(), id)
    }

    /// Issue a GET request and deserialize the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiClientError> {
        tracing::debug!(%url, "GET");
        let resp = self.http_client.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// Check status and deserialize the body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: Response,
    ) -> Result<T, ApiClientError> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiClientError::ApiError {
                status: status.as_u16(),
                detail: body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str::<T>(&body)
            .map_err(|e| ApiClientError::Deserialize(format!("{e}: {body}")))
    }
}

impl EntityFetcher for SwapiClient {
    async fn fetch_page<T>(&self, url: &str) -> Result<Page<T>, ApiClientError>
    where
        T: DeserializeOwned + Send,
    {
        let body: PageBody<T> = self.get_json(url).await?;
        Ok(body.into())
    }

    async fn fetch_entity<T>(&self, url: &str) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Film;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SwapiClient {
        SwapiClient::new(&format!("{}/api/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn builds_urls_without_double_slashes() {
        let client = SwapiClient::new("https://swapi.info/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://swapi.info/api");
        assert_eq!(
            client.collection_url(Resource::People),
            "https://swapi.info/api/people/"
        );
        assert_eq!(
            client.entity_url(Resource::Films, "3"),
            "https://swapi.info/api/films/3"
        );
    }

    #[tokio::test]
    async fn fetch_page_reads_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/films/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{ "episode_id": 4, "title": "A New Hope" }]
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let page: Page<Film> = client
            .fetch_page(&client.collection_url(Resource::Films))
            .await
            .unwrap();
        assert_eq!(page.results[0].title, "A New Hope");
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/films/99"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client
            .fetch_entity::<Film>(&client.entity_url(Resource::Films, "99"))
            .await
            .unwrap_err();
        match err {
            ApiClientError::ApiError { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_deserialize_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/people/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client
            .fetch_page::<Film>(&client.collection_url(Resource::People))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiClientError::Deserialize(_)));
    }
}
