use crate::core::{normalize_body, FetchError, SearchProvider, SearchRequest, VideoRecord};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

/// Video search against the Pexels API.
pub struct PexelsProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl PexelsProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            api_key,
        })
    }

    /// `<base>/videos/search?query=..&per_page=..`
    pub fn search_url(&self, request: &SearchRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["videos", "search"]);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("query", &request.query)
            .append_pair("per_page", &request.page_size.to_string());
        url
    }
}

#[async_trait]
impl SearchProvider for PexelsProvider {
    fn name(&self) -> &'static str {
        "pexels"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<VideoRecord>, FetchError> {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;
        let url = self.search_url(request);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("Authorization", api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        tracing::debug!("Response body length: {}", body.len());
        normalize_body(&body)
    }
}
