use serde_json::Value;

use crate::models::CatalogEntry;

/// Pulls the entry sequence out of one known payload shape
type ShapeExtractor = fn(&Value) -> Option<Vec<Value>>;

/// Known payload shapes, tried in order; the first match wins
const SHAPES: &[(&str, ShapeExtractor)] = &[
    ("sequence", bare_sequence),
    ("results", results_field),
    ("content", content_field),
    ("items", items_field),
    ("mapping", mapping_values),
];

fn bare_sequence(payload: &Value) -> Option<Vec<Value>> {
    payload.as_array().cloned()
}

fn field_sequence(payload: &Value, field: &str) -> Option<Vec<Value>> {
    payload.get(field).and_then(Value::as_array).cloned()
}

fn results_field(payload: &Value) -> Option<Vec<Value>> {
    field_sequence(payload, "results")
}

fn content_field(payload: &Value) -> Option<Vec<Value>> {
    field_sequence(payload, "content")
}

fn items_field(payload: &Value) -> Option<Vec<Value>> {
    field_sequence(payload, "items")
}

/// First sequence-valued entry of a mapping, else the mapping's values
fn mapping_values(payload: &Value) -> Option<Vec<Value>> {
    let map = payload.as_object()?;

    let first_sequence = map.values().find_map(Value::as_array);
    Some(match first_sequence {
        Some(sequence) => sequence.clone(),
        None => map.values().cloned().collect(),
    })
}

/// Reconciles a response payload of unknown shape into a sequence of raw entries.
///
/// Null, scalars and anything else unrecognised resolve to an empty sequence.
pub fn normalize_response(payload: &Value) -> Vec<Value> {
    for (shape, extract) in SHAPES {
        if let Some(entries) = extract(payload) {
            tracing::trace!(shape = %shape, count = entries.len(), "Payload shape matched");
            return entries;
        }
    }

    if !payload.is_null() {
        tracing::debug!("Payload matched no known shape, treating as empty");
    }
    Vec::new()
}

/// Normalizes a payload and decodes its elements as catalog entries.
///
/// Elements that are not entry records (scalars, nulls) are skipped. Records
/// with mistyped fields are kept, with those fields left empty.
pub fn normalize_entries(payload: &Value) -> Vec<CatalogEntry> {
    let raw = normalize_response(payload);
    let total = raw.len();

    let entries: Vec<CatalogEntry> = raw
        .into_iter()
        .filter_map(|value| serde_json::from_value::<CatalogEntry>(value).ok())
        .map(CatalogEntry::canonicalize)
        .collect();

    if entries.len() < total {
        tracing::debug!(
            skipped = total - entries.len(),
            kept = entries.len(),
            "Skipped payload elements that are not catalog entries"
        );
    }

    entries
}
