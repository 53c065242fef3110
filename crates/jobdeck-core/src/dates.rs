//! Timestamp parsing and display formatting shared by ingest and sorting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a raw received-at value: either a 13-digit millisecond epoch
/// numeral or a date string in one of the formats the backends emit.
pub fn parse_received(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  // Provider message timestamps arrive as millisecond numerals.
  if raw.len() == 13 && raw.bytes().all(|b| b.is_ascii_digit()) {
    let millis: i64 = raw.parse().ok()?;
    return DateTime::<Utc>::from_timestamp_millis(millis);
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  // Postgres text form: `2025-03-05 12:30:00[.ssssss]`.
  if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
    return Some(naive.and_utc());
  }
  if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
  }
  None
}

/// Epoch milliseconds of a raw timestamp, for sorting.
pub fn received_millis(raw: Option<&str>) -> Option<i64> {
  raw.and_then(parse_received).map(|dt| dt.timestamp_millis())
}

/// Format a timestamp the way the board displays it: `Mar 5, 2025`.
pub fn display_date(dt: DateTime<Utc>) -> String {
  dt.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn millisecond_numeral() {
    // 2024-01-01T00:00:00Z
    let dt = parse_received("1704067200000").unwrap();
    assert_eq!(display_date(dt), "Jan 1, 2024");
  }

  #[test]
  fn rfc3339_string() {
    let dt = parse_received("2025-03-05T12:30:00Z").unwrap();
    assert_eq!(display_date(dt), "Mar 5, 2025");
  }

  #[test]
  fn postgres_text_form() {
    let dt = parse_received("2025-03-05 12:30:00.123456").unwrap();
    assert_eq!(display_date(dt), "Mar 5, 2025");
  }

  #[test]
  fn bare_date() {
    let dt = parse_received("2023-11-30").unwrap();
    assert_eq!(display_date(dt), "Nov 30, 2023");
  }

  #[test]
  fn garbage_yields_none() {
    assert!(parse_received("").is_none());
    assert!(parse_received("not a date").is_none());
    // 12 digits: neither a millisecond numeral nor a date string.
    assert!(parse_received("170406720000").is_none());
  }

  #[test]
  fn received_millis_orders_chronologically() {
    let a = received_millis(Some("2023-01-01")).unwrap();
    let b = received_millis(Some("2024-01-01")).unwrap();
    assert!(a < b);
    assert_eq!(received_millis(None), None);
    assert_eq!(received_millis(Some("junk")), None);
  }
}
