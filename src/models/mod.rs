use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod analytics;
pub mod catalog;
pub mod viewer;

pub use analytics::{
    AgeGroups, AnalyticsStats, Demographics, GroupShare, LabeledGroupShare, PieSegment,
    TimelinePoint, TimelineResponse,
};
pub use catalog::{
    canonical_id, placeholder_catalog, AccessTier, CatalogEntry, ContentKind, Episode,
};
pub use viewer::{Subscription, Viewer, ViewerContext, WatchHistoryEntry};

// ============================================================================
// Navigation Types
// ============================================================================

/// A (content id, optional episode index) pair the client should navigate to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchTarget {
    pub content_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_index: Option<usize>,
}

impl WatchTarget {
    pub fn movie(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            episode_index: None,
        }
    }

    pub fn episode(content_id: impl Into<String>, index: usize) -> Self {
        Self {
            content_id: content_id.into(),
            episode_index: Some(index),
        }
    }

    /// Client route for this target
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl Display for WatchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.episode_index {
            Some(index) => write!(f, "/watch/{}/episode/{}", self.content_id, index),
            None => write!(f, "/watch/{}", self.content_id),
        }
    }
}

/// Where selecting a catalog card leads
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavTarget {
    /// Paid content selected by a non-subscriber
    Subscribe,
    SeriesDetail { content_id: String },
    Watch { content_id: String },
}

impl NavTarget {
    pub fn path(&self) -> String {
        match self {
            NavTarget::Subscribe => "/subscribe".to_string(),
            NavTarget::SeriesDetail { content_id } => format!("/series/{}", content_id),
            NavTarget::Watch { content_id } => WatchTarget::movie(content_id.as_str()).path(),
        }
    }
}
