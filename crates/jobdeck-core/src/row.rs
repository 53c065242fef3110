//! Wire-level job rows, deserialized leniently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A raw job-application row as the backend sends it. The bulk-fetch
/// shape and the embedded record of a broadcast event are the same.
///
/// Every field tolerates absence, and the id and timestamp fields accept
/// either JSON strings or numbers — ids arrive as differing primitive
/// types across transports.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawJob {
  #[serde(default, alias = "id", deserialize_with = "loose_string")]
  pub provider_message_id: Option<String>,
  #[serde(default)]
  pub title:               Option<String>,
  #[serde(default)]
  pub company_name:        Option<String>,
  #[serde(default)]
  pub app_stage:           Option<String>,
  #[serde(default, deserialize_with = "loose_string")]
  pub received_at:         Option<String>,
  #[serde(default, deserialize_with = "loose_bool")]
  pub is_archived:         Option<bool>,
  #[serde(default, deserialize_with = "loose_bool")]
  pub is_deleted:          Option<bool>,
  #[serde(default, deserialize_with = "loose_bool")]
  pub review_needed:       Option<bool>,
  #[serde(default)]
  pub application_stage:   Option<String>,
}

impl RawJob {
  /// Whether this row carries any usable record content beyond an id.
  /// Events whose payload fails this check need a point re-fetch.
  pub fn has_record_fields(&self) -> bool {
    self.title.is_some() || self.app_stage.is_some() || self.received_at.is_some()
  }
}

fn loose_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(de)?;
  Ok(value.and_then(|v| match v {
    Value::String(s) => Some(s),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }))
}

fn loose_bool<'de, D>(de: D) -> Result<Option<bool>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(de)?;
  Ok(value.and_then(|v| match v {
    Value::Bool(b) => Some(b),
    Value::Number(n) => n.as_i64().map(|i| i != 0),
    Value::String(s) => match s.to_ascii_lowercase().as_str() {
      "true" | "t" => Some(true),
      "false" | "f" => Some(false),
      _ => None,
    },
    _ => None,
  }))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn numeric_id_and_timestamp_normalize_to_strings() {
    let row: RawJob = serde_json::from_value(json!({
      "provider_message_id": 18734,
      "received_at": 1704067200000_i64,
    }))
    .unwrap();
    assert_eq!(row.provider_message_id.as_deref(), Some("18734"));
    assert_eq!(row.received_at.as_deref(), Some("1704067200000"));
  }

  #[test]
  fn id_alias_accepted() {
    let row: RawJob = serde_json::from_value(json!({ "id": "abc" })).unwrap();
    assert_eq!(row.provider_message_id.as_deref(), Some("abc"));
    assert!(!row.has_record_fields());
  }

  #[test]
  fn empty_object_is_all_defaults() {
    let row: RawJob = serde_json::from_value(json!({})).unwrap();
    assert_eq!(row, RawJob::default());
  }

  #[test]
  fn loose_bool_forms() {
    let row: RawJob = serde_json::from_value(json!({
      "is_archived": "t",
      "is_deleted": 1,
      "review_needed": false,
    }))
    .unwrap();
    assert_eq!(row.is_archived, Some(true));
    assert_eq!(row.is_deleted, Some(true));
    assert_eq!(row.review_needed, Some(false));
  }
}
