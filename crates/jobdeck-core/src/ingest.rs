//! Record normalization: wire rows → canonical [`JobCard`]s.
//!
//! Total by construction: malformed input degrades to defaults, never
//! to an error. A bad payload must not be able to break the realtime
//! pipeline.

use crate::{
  card::{JobCard, Stage},
  dates,
  row::RawJob,
};

/// Placeholder title for rows that arrive without one.
pub const NO_TITLE: &str = "No Title";

/// Map a raw row to its canonical card.
///
/// Missing title → [`NO_TITLE`]; missing or unknown stage → `Applied`;
/// an unparseable timestamp leaves `date` empty but keeps the raw value
/// for later comparisons.
pub fn card_from_row(row: &RawJob) -> JobCard {
  let received_at_raw = row.received_at.clone();
  let date = received_at_raw
    .as_deref()
    .and_then(dates::parse_received)
    .map(dates::display_date);

  JobCard {
    id:                row.provider_message_id.clone().unwrap_or_default(),
    title:             row
      .title
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(ToOwned::to_owned)
      .unwrap_or_else(|| NO_TITLE.to_owned()),
    company:           row.company_name.clone(),
    stage:             Stage::parse(row.app_stage.as_deref().unwrap_or_default()),
    date,
    received_at_raw,
    is_archived:       row.is_archived.unwrap_or(false),
    is_deleted:        row.is_deleted.unwrap_or(false),
    review_needed:     row.review_needed,
    application_stage: row.application_stage.clone(),
  }
}
