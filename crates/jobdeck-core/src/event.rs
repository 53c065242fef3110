//! Broadcast change events, decoded once at the transport boundary.
//!
//! The wire payload is shape-sniffed exactly here; everything downstream
//! matches on the exhaustive [`ChangeEvent`] sum type, so a new event
//! shape cannot silently fall through a default branch.

use serde_json::Value;
use tracing::warn;

use crate::row::RawJob;

/// A change notification from the backing store.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
  /// A newly inserted row, carried in full.
  Insert { row: RawJob },
  /// An updated row, carried in full.
  Update { row: RawJob },
  /// A hard deletion; only the old record's id survives.
  Delete { id: String },
  /// Fallback shape: the event names a row but carries no usable
  /// record. The row must be re-fetched by id and merged.
  Touched { id: String },
}

impl ChangeEvent {
  /// Decode a wire payload (`eventType` plus `new`/`old` objects).
  ///
  /// Returns `None` (after a log line) when the payload carries no
  /// identifying id or an unrecognized tag. Callers skip such events;
  /// decoding never panics.
  pub fn decode(payload: &Value) -> Option<Self> {
    let tag = payload
      .get("eventType")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_ascii_uppercase();

    let decoded = match tag.as_str() {
      "INSERT" | "UPDATE" => {
        // Prefer the new record; fall back to the old one.
        record(payload, "new")
          .or_else(|| record(payload, "old"))
          .and_then(|row| row.provider_message_id.clone().map(|id| (row, id)))
          .map(|(row, id)| {
            if !row.has_record_fields() {
              ChangeEvent::Touched { id }
            } else if tag == "INSERT" {
              ChangeEvent::Insert { row }
            } else {
              ChangeEvent::Update { row }
            }
          })
      }
      "DELETE" => record(payload, "old")
        .and_then(|row| row.provider_message_id)
        .map(|id| ChangeEvent::Delete { id }),
      other => {
        warn!(tag = other, "unrecognized change event tag, ignoring");
        return None;
      }
    };

    if decoded.is_none() {
      warn!(tag = %tag, "change event carries no row id, ignoring");
    }
    decoded
  }
}

fn record(payload: &Value, key: &str) -> Option<RawJob> {
  let value = payload.get(key)?;
  if !value.is_object() {
    return None;
  }
  serde_json::from_value(value.clone()).ok()
}
