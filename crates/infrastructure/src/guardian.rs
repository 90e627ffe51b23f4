//! Guardian Content API source

use async_trait::async_trait;
use paperboy_core::config::SourceConfig;
use paperboy_core::models::{Article, FilterParams};
use paperboy_core::traits::ContentSource;
use paperboy_core::{PaperboyError, PaperboyResult};
use serde::Deserialize;
use tracing::{debug, error, instrument};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Vec<Article>,
}

/// `ContentSource` over the `/search` endpoint of the Guardian Content API
pub struct GuardianSource {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GuardianSource {
    pub fn new(config: &SourceConfig) -> PaperboyResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PaperboyError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self::with_client(http_client, config))
    }

    pub fn with_client(http_client: reqwest::Client, config: &SourceConfig) -> Self {
        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    /// Decode a `/search` response body into its result list
    pub fn parse_response(body: &str) -> PaperboyResult<Vec<Article>> {
        let envelope: SearchEnvelope = serde_json::from_str(body)
            .map_err(|e| PaperboyError::fetch(format!("malformed response: {e}")))?;

        let response = envelope.response;
        if response.status != "ok" {
            return Err(PaperboyError::fetch(format!(
                "API status {}: {}",
                response.status,
                response.message.unwrap_or_default()
            )));
        }

        Ok(response.results)
    }
}

#[async_trait]
impl ContentSource for GuardianSource {
    #[instrument(skip(self, params), fields(section = ?params.get("section")))]
    async fn fetch(&self, params: &FilterParams) -> PaperboyResult<Vec<Article>> {
        let url = self.search_url();
        debug!("Fetching articles from {}", url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api-key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach content source: {}", e);
                PaperboyError::fetch(format!("connection error: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaperboyError::fetch(format!("reading body: {e}")))?;

        if !status.is_success() {
            error!("Content source returned HTTP {}", status);
            return Err(PaperboyError::fetch(format!("HTTP {status}")));
        }

        let articles = Self::parse_response(&body)?;
        debug!("Fetched {} articles", articles.len());
        Ok(articles)
    }
}
