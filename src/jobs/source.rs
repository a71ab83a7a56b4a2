use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use super::models::{RawListing, SearchResponse};

const SEARCH_URL: &str = "https://jsearch.p.rapidapi.com/search";
const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";

/// Upper bound for one search request, so a cycle cannot hang on the provider
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(reqwest::Error),
}

/// Source of raw listings for one cycle
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawListing>, FetchError>;
}

/// JSearch (RapidAPI) client issuing a single-page search
pub struct JSearchSource {
    client: reqwest::Client,
    search_url: String,
    api_key: String,
    query: String,
}

impl JSearchSource {
    pub fn new(api_key: String, query: String) -> Result<Self, FetchError> {
        Self::with_endpoint(api_key, query, SEARCH_URL, FETCH_TIMEOUT)
    }

    /// Client for a specific search endpoint and request timeout
    pub fn with_endpoint(
        api_key: String,
        query: String,
        search_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            search_url: search_url.into(),
            api_key,
            query,
        })
    }
}

#[async_trait]
impl ListingSource for JSearchSource {
    async fn fetch(&self) -> Result<Vec<RawListing>, FetchError> {
        debug!("Searching JSearch for query={:?}", self.query);

        let resp = self
            .client
            .get(&self.search_url)
            .query(&[("query", self.query.as_str()), ("num_pages", "1")])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: SearchResponse = resp.json().await.map_err(FetchError::Decode)?;
        info!("Found {} jobs from API", response.data.len());
        Ok(response.data)
    }
}
