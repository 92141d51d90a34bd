use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    error::AppResult,
    models::{placeholder_catalog, AnalyticsStats, CatalogEntry, TimelinePoint, Viewer, ViewerContext},
    services::{normalizer, providers::CatalogApi, recommendations},
};

/// Liveness flag of a long-lived consuming view.
///
/// Results that arrive after teardown are dropped instead of applied. HTTP
/// handlers do not need one: dropping the request future cancels the fetches.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn teardown(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Passes `value` through only while the view is still alive
    pub fn guard<T>(&self, value: T) -> Option<T> {
        if self.is_live() {
            Some(value)
        } else {
            tracing::debug!("View torn down, discarding late result");
            None
        }
    }

    /// Handle that tears the view down when dropped
    pub fn view_guard(&self) -> ViewGuard {
        ViewGuard(self.clone())
    }
}

/// Tears down its view on drop
#[derive(Debug)]
pub struct ViewGuard(Liveness);

impl Drop for ViewGuard {
    fn drop(&mut self) {
        self.0.teardown();
    }
}

/// Everything the browse view needs, with failed fetches already defaulted
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseData {
    pub catalog: Vec<CatalogEntry>,
    pub recommendations: Vec<CatalogEntry>,
    pub viewer: Option<Viewer>,
    /// The catalog fetch failed and placeholders are shown instead
    pub catalog_fallback: bool,
}

impl BrowseData {
    pub fn viewer_context(&self) -> ViewerContext {
        ViewerContext::from(self.viewer.as_ref())
    }
}

/// Fetches catalog, recommendations and viewer concurrently.
///
/// Each fetch defaults independently on failure: placeholders for the
/// catalog, nothing for recommendations, no viewer.
pub async fn load_browse_data(api: &dyn CatalogApi) -> BrowseData {
    let (catalog, recommendations, viewer) = tokio::join!(
        api.fetch_catalog(),
        api.fetch_recommendations(),
        api.fetch_viewer()
    );

    let (catalog, catalog_fallback) = match catalog {
        Ok(payload) => (normalizer::normalize_entries(&payload), false),
        Err(e) => {
            tracing::warn!(error = %e, "Catalog fetch failed, using placeholder catalog");
            (placeholder_catalog(), true)
        }
    };

    let viewer = viewer
        .map_err(|e| tracing::warn!(error = %e, "Viewer fetch failed, continuing anonymously"))
        .ok();

    let watched = ViewerContext::from(viewer.as_ref()).watched;
    let recommendations = match recommendations {
        Ok(payload) => recommendations::get_recommendations(&payload, &watched),
        Err(e) => {
            tracing::warn!(error = %e, "Recommendations fetch failed, showing none");
            Vec::new()
        }
    };

    tracing::info!(
        catalog = catalog.len(),
        recommendations = recommendations.len(),
        has_viewer = viewer.is_some(),
        catalog_fallback,
        "Browse data loaded"
    );

    BrowseData {
        catalog,
        recommendations,
        viewer,
        catalog_fallback,
    }
}

/// `load_browse_data`, discarding the result if the view went away meanwhile
pub async fn load_browse_data_guarded(
    api: &dyn CatalogApi,
    liveness: &Liveness,
) -> Option<BrowseData> {
    let data = load_browse_data(api).await;
    liveness.guard(data)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsData {
    pub stats: AnalyticsStats,
    pub timeline: Vec<TimelinePoint>,
}

/// Fetches aggregate stats and the signup timeline concurrently.
///
/// The stats are required; a failed timeline degrades to an empty one.
pub async fn load_analytics(api: &dyn CatalogApi, days: u32) -> AppResult<AnalyticsData> {
    let (stats, timeline) = tokio::join!(api.fetch_analytics(), api.fetch_timeline(days));

    let stats = stats?;
    let timeline = timeline.unwrap_or_else(|e| {
        tracing::warn!(error = %e, days, "Timeline fetch failed, omitting line chart");
        Vec::new()
    });

    Ok(AnalyticsData { stats, timeline })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, services::providers::MockCatalogApi};
    use serde_json::json;

    fn ids(entries: &[CatalogEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.canonical_id().unwrap_or_default())
            .collect()
    }

    fn viewer_with_history() -> Viewer {
        serde_json::from_value(json!({
            "role": "viewer",
            "subscription": { "status": "active" },
            "watchHistory": [{ "content": "1" }, { "content": { "_id": "3" } }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_all_fetches_succeed() {
        let mut api = MockCatalogApi::new();
        api.expect_fetch_catalog().returning(|| {
            Ok(json!({ "content": [
                { "_id": "10", "title": "Film", "type": "movie" },
                { "_id": "11", "title": "Show", "type": "series" }
            ]}))
        });
        api.expect_fetch_recommendations().returning(|| {
            Ok(json!([{ "_id": "1" }, { "_id": "2" }, { "_id": "3" }, { "_id": "4" }]))
        });
        api.expect_fetch_viewer()
            .returning(|| Ok(viewer_with_history()));

        let data = load_browse_data(&api).await;
        assert!(!data.catalog_fallback);
        assert_eq!(ids(&data.catalog), vec!["10", "11"]);
        assert_eq!(ids(&data.recommendations), vec!["2", "4"]);
        assert!(data.viewer_context().is_subscriber);
    }

    #[tokio::test]
    async fn test_catalog_failure_uses_placeholders_and_still_filters() {
        let mut api = MockCatalogApi::new();
        api.expect_fetch_catalog()
            .returning(|| Err(AppError::ExternalApi("down".to_string())));
        api.expect_fetch_recommendations().returning(|| {
            Ok(json!({ "results": [{ "_id": "1" }, { "_id": "2" }] }))
        });
        api.expect_fetch_viewer()
            .returning(|| Ok(viewer_with_history()));

        let data = load_browse_data(&api).await;
        assert!(data.catalog_fallback);
        assert_eq!(ids(&data.catalog), vec!["1", "2"]);
        assert_eq!(ids(&data.recommendations), vec!["2"]);
    }

    #[tokio::test]
    async fn test_recommendation_and_viewer_failures_default() {
        let mut api = MockCatalogApi::new();
        api.expect_fetch_catalog()
            .returning(|| Ok(json!([{ "_id": "10", "type": "movie" }])));
        api.expect_fetch_recommendations()
            .returning(|| Err(AppError::ExternalApi("down".to_string())));
        api.expect_fetch_viewer()
            .returning(|| Err(AppError::ExternalApi("unauthorized".to_string())));

        let data = load_browse_data(&api).await;
        assert_eq!(data.catalog.len(), 1);
        assert!(data.recommendations.is_empty());
        assert!(data.viewer.is_none());
        assert!(!data.viewer_context().is_admin);
    }

    #[tokio::test]
    async fn test_result_dropped_after_teardown() {
        let mut api = MockCatalogApi::new();
        api.expect_fetch_catalog().returning(|| Ok(json!([])));
        api.expect_fetch_recommendations().returning(|| Ok(json!([])));
        api.expect_fetch_viewer().returning(|| Ok(Viewer::default()));

        let liveness = Liveness::new();
        let guard = liveness.view_guard();
        drop(guard);

        assert!(!liveness.is_live());
        assert!(load_browse_data_guarded(&api, &liveness).await.is_none());
    }

    #[tokio::test]
    async fn test_result_applied_while_live() {
        let mut api = MockCatalogApi::new();
        api.expect_fetch_catalog().returning(|| Ok(json!([])));
        api.expect_fetch_recommendations().returning(|| Ok(json!([])));
        api.expect_fetch_viewer().returning(|| Ok(Viewer::default()));

        let liveness = Liveness::new();
        let _guard = liveness.view_guard();

        let data = load_browse_data_guarded(&api, &liveness).await.unwrap();
        assert!(data.catalog.is_empty());
    }

    #[tokio::test]
    async fn test_analytics_timeline_failure_degrades() {
        let mut api = MockCatalogApi::new();
        api.expect_fetch_analytics().returning(|| {
            Ok(AnalyticsStats {
                total_users: 3,
                ..Default::default()
            })
        });
        api.expect_fetch_timeline()
            .withf(|days| *days == 30)
            .returning(|_| Err(AppError::ExternalApi("timeout".to_string())));

        let data = load_analytics(&api, 30).await.unwrap();
        assert_eq!(data.stats.total_users, 3);
        assert!(data.timeline.is_empty());
    }

    #[tokio::test]
    async fn test_analytics_stats_failure_propagates() {
        let mut api = MockCatalogApi::new();
        api.expect_fetch_analytics()
            .returning(|| Err(AppError::ExternalApi("forbidden".to_string())));
        api.expect_fetch_timeline().returning(|_| Ok(Vec::new()));

        assert!(load_analytics(&api, 30).await.is_err());
    }
}
