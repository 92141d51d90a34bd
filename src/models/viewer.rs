use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::canonical_id;

/// One entry of a viewer's watch history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WatchHistoryEntry {
    /// Either a plain content id or a nested content reference
    #[serde(default)]
    pub content: Option<Value>,
}

impl WatchHistoryEntry {
    pub fn canonical_id(&self) -> Option<String> {
        self.content.as_ref().and_then(canonical_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Subscription {
    #[serde(default)]
    pub status: Option<String>,
}

/// The signed-in viewer as reported by `/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub subscription: Option<Subscription>,
    #[serde(default)]
    pub watch_history: Option<Vec<WatchHistoryEntry>>,
}

impl Viewer {
    pub fn is_subscriber(&self) -> bool {
        self.subscription
            .as_ref()
            .and_then(|s| s.status.as_deref())
            == Some("active")
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    /// Set of canonical ids already watched.
    ///
    /// History entries without a resolvable id are skipped.
    pub fn watched_ids(&self) -> HashSet<String> {
        self.watch_history
            .iter()
            .flatten()
            .filter_map(WatchHistoryEntry::canonical_id)
            .collect()
    }
}

/// Explicit viewer context handed to the layout and dedup components
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerContext {
    pub is_subscriber: bool,
    pub is_admin: bool,
    pub watched: HashSet<String>,
}

impl From<Option<&Viewer>> for ViewerContext {
    fn from(viewer: Option<&Viewer>) -> Self {
        match viewer {
            Some(viewer) => Self {
                is_subscriber: viewer.is_subscriber(),
                is_admin: viewer.is_admin(),
                watched: viewer.watched_ids(),
            },
            None => Self::default(),
        }
    }
}
