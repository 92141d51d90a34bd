use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Thumbnail used by the built-in placeholder entries
pub const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/320x180";

/// Kind of a catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
    /// Any kind this front end does not know how to display
    #[serde(other)]
    Other,
}

/// Access tier of a catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    #[default]
    Free,
    Paid,
    #[serde(other)]
    Unknown,
}

/// A single episode of a series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub video_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail_url: Option<String>,
    /// Duration in seconds
    #[serde(default, deserialize_with = "lenient_number")]
    pub duration: Option<f64>,
}

impl Episode {
    /// Whole minutes of playback, if the duration is known and positive
    pub fn duration_minutes(&self) -> Option<u64> {
        self.duration
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| (secs / 60.0).floor() as u64)
    }
}

/// A playable catalog entry (movie or series) as delivered by upstream.
///
/// Upstream payloads are loosely shaped, so every field is optional and the
/// identifier is kept as raw JSON until it is canonicalized. A field of the
/// wrong type decodes as absent instead of rejecting the whole entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<ContentKind>,
    #[serde(rename = "access", default, deserialize_with = "lenient")]
    pub access: Option<AccessTier>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub genre: Vec<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub release_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub target_age_group: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub target_gender: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_episodes",
        skip_serializing_if = "Option::is_none"
    )]
    pub episodes: Option<Vec<Episode>>,
}

impl CatalogEntry {
    /// Canonical string id: `_id` first, then `id`
    pub fn canonical_id(&self) -> Option<String> {
        self.key
            .as_ref()
            .and_then(canonical_id)
            .or_else(|| self.id.as_ref().and_then(canonical_id))
    }

    /// Title used for searching and display, falling back to `name`
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }

    pub fn is_series(&self) -> bool {
        self.kind == Some(ContentKind::Series)
    }

    pub fn is_movie(&self) -> bool {
        self.kind == Some(ContentKind::Movie)
    }

    pub fn is_paid(&self) -> bool {
        self.access == Some(AccessTier::Paid)
    }

    /// Number of episodes; zero for anything that is not a series
    pub fn episode_count(&self) -> usize {
        self.episodes.as_ref().map_or(0, Vec::len)
    }

    pub fn episode(&self, index: usize) -> Option<&Episode> {
        self.episodes.as_ref().and_then(|episodes| episodes.get(index))
    }

    /// Series always carry an episode sequence; movies never do.
    pub fn canonicalize(mut self) -> Self {
        match self.kind {
            Some(ContentKind::Series) => {
                self.episodes.get_or_insert_with(Vec::new);
            }
            Some(ContentKind::Movie) => self.episodes = None,
            _ => {}
        }
        self
    }

    /// Built-in entry shown when the catalog cannot be loaded
    pub fn placeholder(id: &str, title: &str, kind: ContentKind) -> Self {
        Self {
            key: Some(Value::String(id.to_string())),
            title: Some(title.to_string()),
            description: Some("Demo description".to_string()),
            kind: Some(kind),
            thumbnail_url: Some(PLACEHOLDER_THUMBNAIL.to_string()),
            ..Default::default()
        }
        .canonicalize()
    }
}

/// The two placeholder entries used as the catalog fallback
pub fn placeholder_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::placeholder("1", "Demo Movie", ContentKind::Movie),
        CatalogEntry::placeholder("2", "Demo Series", ContentKind::Series),
    ]
}

/// Resolves the canonical string form of an identifier.
///
/// Plain strings and numbers are used directly; a nested reference resolves
/// through its own `_id` (or `id`, or `$oid`) field.
pub fn canonical_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => ["_id", "id", "$oid"]
            .iter()
            .find_map(|field| map.get(*field).and_then(canonical_id)),
        _ => None,
    }
}

/// Decodes the field if it has the expected type, otherwise treats it as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Accepts a number or a string holding one
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromStr,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().parse().ok(),
        other => serde_json::from_value(other).ok(),
    })
}

/// Accepts a single string or a list; non-string genres are skipped
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(genre) => vec![genre],
        Value::Array(genres) => genres
            .into_iter()
            .filter_map(|genre| match genre {
                Value::String(genre) => Some(genre),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Keeps the episodes that are records; anything but a list is absent
fn lenient_episodes<'de, D>(deserializer: D) -> Result<Option<Vec<Episode>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(episodes) => Some(
            episodes
                .into_iter()
                .filter_map(|episode| serde_json::from_value(episode).ok())
                .collect(),
        ),
        _ => None,
    })
}
