use serde_json::Value;
use std::collections::HashSet;

use crate::{models::CatalogEntry, services::normalizer};

/// Removes recommendations the viewer has already watched.
///
/// Relative order is preserved. A recommendation without a resolvable id is
/// kept, since nothing proves it was seen.
pub fn filter_watched(
    recommendations: Vec<CatalogEntry>,
    watched: &HashSet<String>,
) -> Vec<CatalogEntry> {
    if watched.is_empty() {
        return recommendations;
    }

    let before = recommendations.len();
    let remaining: Vec<CatalogEntry> = recommendations
        .into_iter()
        .filter(|entry| match entry.canonical_id() {
            Some(id) => !watched.contains(&id),
            None => true,
        })
        .collect();

    tracing::debug!(
        removed = before - remaining.len(),
        remaining = remaining.len(),
        "Filtered watched recommendations"
    );

    remaining
}

/// Generates the personalized recommendation list
///
/// Normalizes the raw recommendation payload, then drops everything already
/// present in the viewer's watch history.
pub fn get_recommendations(payload: &Value, watched: &HashSet<String>) -> Vec<CatalogEntry> {
    filter_watched(normalizer::normalize_entries(payload), watched)
}
