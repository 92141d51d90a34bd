//! Upstream catalog API abstraction
//!
//! Every network call the front end makes goes through `CatalogApi`. The HTTP
//! implementation attaches the bearer token and owns transport errors; the core
//! components only ever see already-resolved data.
use serde_json::Value;

use crate::{
    error::AppResult,
    models::{AnalyticsStats, CatalogEntry, TimelinePoint, Viewer},
};

pub mod http;

pub use http::HttpCatalogApi;

/// Trait for the upstream catalog service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /content`; the payload may take any of the shapes the normalizer accepts
    async fn fetch_catalog(&self) -> AppResult<Value>;

    /// `GET /recommendations`; same payload shapes as the catalog
    async fn fetch_recommendations(&self) -> AppResult<Value>;

    /// `GET /auth/me`
    async fn fetch_viewer(&self) -> AppResult<Viewer>;

    /// `GET /content/:id`
    async fn fetch_entry(&self, id: &str) -> AppResult<CatalogEntry>;

    /// `GET /admin/analytics`
    async fn fetch_analytics(&self) -> AppResult<AnalyticsStats>;

    /// `GET /admin/analytics/users-timeline?days=N`
    async fn fetch_timeline(&self, days: u32) -> AppResult<Vec<TimelinePoint>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
