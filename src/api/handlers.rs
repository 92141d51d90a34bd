use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{AnalyticsStats, CatalogEntry, PieSegment, WatchTarget},
    services::{
        charts::{self, LineChart, PieChart},
        layout::{self, BrowseLayout, Section, SectionAction, SectionState, SortMode},
        loader,
        playback::{LoadOutcome, PlaybackEvent, PlaybackSession, PlaybackState},
    },
};

use super::AppState;

/// Header image used when a series has no thumbnail
const SERIES_HEADER_PLACEHOLDER: &str = "https://via.placeholder.com/1200x400";

const MAX_TIMELINE_DAYS: u32 = 365;

// Request/Response types

#[derive(Debug, Deserialize, Default)]
pub struct BrowseQuery {
    pub search: Option<String>,
    pub sort: Option<SortMode>,
    /// Comma-separated list of expanded sections
    pub expand: Option<String>,
}

impl BrowseQuery {
    /// Folds the query into a section state through the reducer
    pub fn into_state(self) -> AppResult<SectionState> {
        let mut actions = Vec::new();

        if let Some(search) = self.search {
            actions.push(SectionAction::SetSearch(search));
        }
        if let Some(sort) = self.sort {
            actions.push(SectionAction::SetSort(sort));
        }
        for name in self.expand.iter().flat_map(|list| list.split(',')) {
            if name.trim().is_empty() {
                continue;
            }
            let section = Section::parse(name)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown section: {}", name)))?;
            actions.push(SectionAction::Expand(section));
        }

        Ok(SectionState::default().reduce_all(actions))
    }
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub state: SectionState,
    #[serde(flatten)]
    pub layout: BrowseLayout,
    pub is_subscriber: bool,
    pub is_admin: bool,
    pub catalog_fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct PlaybackView {
    pub content_id: String,
    #[serde(flatten)]
    pub state: PlaybackState,
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub episode_index: Option<usize>,
    pub episode_title: Option<String>,
    pub episode_count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next: Option<WatchTarget>,
    pub previous: Option<WatchTarget>,
    /// Back link to the episode list for series
    pub series_path: Option<String>,
}

impl PlaybackView {
    fn new(session: &PlaybackSession, entry: Option<&CatalogEntry>) -> Self {
        let is_series = entry.is_some_and(CatalogEntry::is_series);
        Self {
            content_id: session.content_id().to_string(),
            state: session.state(),
            title: entry.and_then(|e| e.display_title().map(str::to_string)),
            description: entry.and_then(|e| e.description.clone()),
            video_url: session.video_url().map(str::to_string),
            episode_index: session.episode_index(),
            episode_title: session.current_episode().and_then(|ep| ep.title.clone()),
            episode_count: session.episode_count(),
            has_next: session.has_next(),
            has_previous: session.has_previous(),
            next: session.next_target(),
            previous: session.previous_target(),
            series_path: is_series.then(|| format!("/series/{}", session.content_id())),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WatchResponse {
    Playback(PlaybackView),
    Redirect { redirect: String },
}

#[derive(Debug, Deserialize)]
pub struct PlaybackEventRequest {
    pub event: PlaybackEvent,
}

#[derive(Debug, Serialize)]
pub struct PlaybackEventResponse {
    /// `None` when the requested move is unavailable
    pub target: Option<WatchTarget>,
}

#[derive(Debug, Serialize)]
pub struct EpisodeView {
    pub index: usize,
    pub number: usize,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub duration_minutes: Option<u64>,
    pub target: WatchTarget,
}

#[derive(Debug, Serialize)]
pub struct SeriesDetailView {
    pub content_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: String,
    pub release_year: Option<i32>,
    pub genres: Vec<String>,
    pub premium: bool,
    pub episodes: Vec<EpisodeView>,
}

impl SeriesDetailView {
    fn new(content_id: &str, entry: &CatalogEntry) -> Self {
        let episodes = entry
            .episodes
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, episode)| EpisodeView {
                index,
                number: index + 1,
                title: episode
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "Untitled".to_string()),
                thumbnail_url: episode
                    .thumbnail_url
                    .clone()
                    .or_else(|| entry.thumbnail_url.clone()),
                duration_minutes: episode.duration_minutes(),
                target: WatchTarget::episode(content_id, index),
            })
            .collect();

        Self {
            content_id: content_id.to_string(),
            title: entry.display_title().map(str::to_string),
            description: entry.description.clone(),
            thumbnail_url: entry
                .thumbnail_url
                .clone()
                .unwrap_or_else(|| SERIES_HEADER_PLACEHOLDER.to_string()),
            release_year: entry.release_year,
            genres: entry.genre.clone(),
            premium: entry.is_paid(),
            episodes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartsQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct StatCards {
    pub total_users: u64,
    pub active_subs: u64,
    pub revenue_monthly_estimate: f64,
    pub total_content: u64,
}

impl From<&AnalyticsStats> for StatCards {
    fn from(stats: &AnalyticsStats) -> Self {
        Self {
            total_users: stats.total_users,
            active_subs: stats.active_subs,
            revenue_monthly_estimate: stats.revenue_monthly_estimate,
            total_content: stats.total_content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub percent: f64,
    pub count: u64,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct PieView {
    #[serde(flatten)]
    pub chart: PieChart,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsView {
    pub cards: StatCards,
    pub days: u32,
    pub line_chart: Option<LineChart>,
    pub gender: Option<PieView>,
    pub age: Option<PieView>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Browse page: recommended, movies and series sections
pub async fn browse(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<BrowseResponse>> {
    let section_state = query.into_state()?;

    let data = loader::load_browse_data(state.api.as_ref()).await;

    let viewer = data.viewer_context();
    let layout = layout::layout_sections(
        &data.catalog,
        &data.recommendations,
        &section_state,
        &viewer,
    );

    tracing::info!(
        request_id = %request_id,
        movies = layout.movies.total,
        series = layout.series.total,
        no_content = layout.no_content,
        "Browse layout computed"
    );

    Ok(Json(BrowseResponse {
        state: section_state,
        layout,
        is_subscriber: viewer.is_subscriber,
        is_admin: viewer.is_admin,
        catalog_fallback: data.catalog_fallback,
    }))
}

/// Loads the entry and resolves a playback session.
///
/// A failed fetch degrades to an unresolved session with no video.
async fn resolve_session(
    state: &AppState,
    content_id: &str,
    episode_index: Option<usize>,
) -> (LoadOutcome, Option<CatalogEntry>) {
    match state.api.fetch_entry(content_id).await {
        Ok(entry) => {
            let outcome = PlaybackSession::load(
                &entry,
                content_id,
                episode_index,
                &state.config.stream_path_prefix,
            );
            (outcome, Some(entry))
        }
        Err(e) => {
            tracing::warn!(content_id = %content_id, error = %e, "Failed to load content for playback");
            (LoadOutcome::Ready(PlaybackSession::unresolved(content_id)), None)
        }
    }
}

async fn watch_response(
    state: &AppState,
    content_id: &str,
    episode_index: Option<usize>,
) -> Json<WatchResponse> {
    let (outcome, entry) = resolve_session(state, content_id, episode_index).await;

    Json(match outcome {
        LoadOutcome::Ready(session) => {
            WatchResponse::Playback(PlaybackView::new(&session, entry.as_ref()))
        }
        LoadOutcome::SeriesOverview { content_id } => WatchResponse::Redirect {
            redirect: format!("/series/{}", content_id),
        },
    })
}

/// Watch a movie, or get redirected to a series' episode list
pub async fn watch(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> Json<WatchResponse> {
    watch_response(&state, &content_id, None).await
}

/// Watch one episode of a series
pub async fn watch_episode(
    State(state): State<AppState>,
    Path((content_id, episode_index)): Path<(String, usize)>,
) -> Json<WatchResponse> {
    watch_response(&state, &content_id, Some(episode_index)).await
}

async fn playback_event_response(
    state: &AppState,
    content_id: &str,
    episode_index: Option<usize>,
    event: PlaybackEvent,
) -> Json<PlaybackEventResponse> {
    let target = match resolve_session(state, content_id, episode_index).await.0 {
        LoadOutcome::Ready(mut session) => session.handle(event),
        LoadOutcome::SeriesOverview { .. } => None,
    };

    Json(PlaybackEventResponse { target })
}

/// Next / previous / ended for a movie; always inert
pub async fn movie_event(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
    Json(request): Json<PlaybackEventRequest>,
) -> Json<PlaybackEventResponse> {
    playback_event_response(&state, &content_id, None, request.event).await
}

/// Next / previous / ended for an episode
pub async fn episode_event(
    State(state): State<AppState>,
    Path((content_id, episode_index)): Path<(String, usize)>,
    Json(request): Json<PlaybackEventRequest>,
) -> Json<PlaybackEventResponse> {
    playback_event_response(&state, &content_id, Some(episode_index), request.event).await
}

/// Series detail page with the episode list
pub async fn series_detail(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> AppResult<Json<SeriesDetailView>> {
    let entry = state.api.fetch_entry(&content_id).await.map_err(|e| {
        tracing::warn!(content_id = %content_id, error = %e, "Failed to load series");
        AppError::NotFound(format!("Series not found: {}", content_id))
    })?;

    Ok(Json(SeriesDetailView::new(&content_id, &entry)))
}

/// Admin analytics: stat cards, signup line chart and demographic pies
pub async fn analytics_charts(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ChartsQuery>,
) -> AppResult<Json<AnalyticsView>> {
    let days = query.days.unwrap_or(state.config.timeline_days);
    if days == 0 || days > MAX_TIMELINE_DAYS {
        return Err(AppError::InvalidInput(format!(
            "days must be between 1 and {}",
            MAX_TIMELINE_DAYS
        )));
    }

    let data = loader::load_analytics(state.api.as_ref(), days).await?;
    let stats = &data.stats;

    let mut cache = state.charts.lock().await;
    let line_chart = cache.line_chart(&data.timeline);

    let gender = stats.demographics.as_ref().map(|demographics| {
        let segments = charts::gender_segments(demographics);
        let counts = [demographics.male.count, demographics.female.count];
        PieView {
            legend: legend(&segments, &counts),
            chart: cache.gender_pie(&segments),
        }
    });

    let age = stats.age_groups.as_ref().map(|groups| {
        let segments = charts::age_segments(groups);
        let counts = [groups.kids.count, groups.teens.count, groups.adults.count];
        PieView {
            legend: legend(&segments, &counts),
            chart: cache.age_pie(&segments),
        }
    });
    drop(cache);

    tracing::info!(
        request_id = %request_id,
        days,
        timeline_points = data.timeline.len(),
        "Analytics charts computed"
    );

    Ok(Json(AnalyticsView {
        cards: StatCards::from(stats),
        days,
        line_chart,
        gender,
        age,
    }))
}

fn legend(segments: &[PieSegment], counts: &[u64]) -> Vec<LegendEntry> {
    segments
        .iter()
        .zip(counts)
        .map(|(segment, count)| LegendEntry {
            label: segment.label.clone(),
            percent: segment.value,
            count: *count,
            color: segment.color.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_query_into_state() {
        let query = BrowseQuery {
            search: Some("night".to_string()),
            sort: Some(SortMode::TitleDesc),
            expand: Some("movies, series".to_string()),
        };
        let state = query.into_state().unwrap();

        assert_eq!(state.search, "night");
        assert_eq!(state.sort, SortMode::TitleDesc);
        assert!(state.expanded.movies);
        assert!(state.expanded.series);
        assert!(!state.expanded.recommended);
    }

    #[test]
    fn test_browse_query_rejects_unknown_section() {
        let query = BrowseQuery {
            expand: Some("movies,music".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_state(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_expand_list_is_default_state() {
        let query = BrowseQuery {
            expand: Some(",".to_string()),
            ..Default::default()
        };
        assert_eq!(query.into_state().unwrap(), SectionState::default());
    }

    #[test]
    fn test_series_detail_view() {
        let entry: CatalogEntry = serde_json::from_value(serde_json::json!({
            "_id": "s1",
            "title": "Show",
            "type": "series",
            "access": "paid",
            "thumbnailUrl": "/t/show.jpg",
            "episodes": [
                { "title": "Pilot", "duration": 1830 },
                { "title": "", "thumbnailUrl": "/t/ep2.jpg" }
            ]
        }))
        .unwrap();

        let view = SeriesDetailView::new("s1", &entry);
        assert!(view.premium);
        assert_eq!(view.episodes.len(), 2);
        assert_eq!(view.episodes[0].number, 1);
        assert_eq!(view.episodes[0].duration_minutes, Some(30));
        assert_eq!(view.episodes[0].thumbnail_url.as_deref(), Some("/t/show.jpg"));
        assert_eq!(view.episodes[1].title, "Untitled");
        assert_eq!(view.episodes[1].thumbnail_url.as_deref(), Some("/t/ep2.jpg"));
        assert_eq!(view.episodes[1].target, WatchTarget::episode("s1", 1));
    }

    #[test]
    fn test_series_detail_placeholder_header() {
        let entry = CatalogEntry::default();
        let view = SeriesDetailView::new("x", &entry);
        assert_eq!(view.thumbnail_url, SERIES_HEADER_PLACEHOLDER);
        assert!(view.episodes.is_empty());
    }
}
