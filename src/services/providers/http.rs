use reqwest::{Client as HttpClient, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{AnalyticsStats, CatalogEntry, TimelinePoint, TimelineResponse, Viewer},
    services::providers::CatalogApi,
};

/// `CatalogApi` backed by the upstream REST service
#[derive(Clone)]
pub struct HttpCatalogApi {
    http_client: HttpClient,
    api_url: String,
    token: Option<String>,
}

impl HttpCatalogApi {
    pub fn new(api_url: String, token: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Appends each segment to the base URL, percent-encoding it as a single
    /// path segment
    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| AppError::Internal(format!("Invalid upstream URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal(format!("Upstream URL cannot be a base: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues an authenticated GET and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.url(segments)?;
        let path = url.path().to_string();
        let mut request = self.http_client.get(url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = %status, "Upstream request failed");
            return Err(AppError::ExternalApi(format!(
                "Upstream API returned status {} for {}: {}",
                status, path, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn fetch_catalog(&self) -> AppResult<Value> {
        self.get_json(&["content"], &[]).await
    }

    async fn fetch_recommendations(&self) -> AppResult<Value> {
        self.get_json(&["recommendations"], &[]).await
    }

    async fn fetch_viewer(&self) -> AppResult<Viewer> {
        self.get_json(&["auth", "me"], &[]).await
    }

    async fn fetch_entry(&self, id: &str) -> AppResult<CatalogEntry> {
        // Dot segments would be dropped from the path rather than encoded
        if id.trim().is_empty() || id == "." || id == ".." {
            return Err(AppError::InvalidInput(format!("Invalid content id: {:?}", id)));
        }

        let entry: CatalogEntry = self.get_json(&["content", id], &[]).await?;
        Ok(entry.canonicalize())
    }

    async fn fetch_analytics(&self) -> AppResult<AnalyticsStats> {
        self.get_json(&["admin", "analytics"], &[]).await
    }

    async fn fetch_timeline(&self, days: u32) -> AppResult<Vec<TimelinePoint>> {
        let response: TimelineResponse = self
            .get_json(
                &["admin", "analytics", "users-timeline"],
                &[("days", days.to_string())],
            )
            .await?;

        let points = response.into_points();
        tracing::debug!(days, points = points.len(), "Fetched signup timeline");
        Ok(points)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
