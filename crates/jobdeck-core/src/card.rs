//! The canonical board model: [`Stage`] columns and [`JobCard`] entries.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Stage ───────────────────────────────────────────────────────────────────

/// A board column.
///
/// Wire values are matched case-insensitively (the backend capitalizes
/// stages on write); anything unrecognized falls back to `Applied`, so a
/// card always lands in a concrete column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
  Applied,
  Interview,
  Offer,
  Accepted,
  /// Transient: the ingestion pipeline is still classifying this
  /// message. Its board column exists only while some card holds it.
  Staging,
}

impl Stage {
  /// The four permanent board columns, in board order.
  pub const BOARD: [Stage; 4] = [
    Stage::Applied,
    Stage::Interview,
    Stage::Offer,
    Stage::Accepted,
  ];

  /// Parse a wire stage value. Unknown or empty input maps to `Applied`.
  pub fn parse(raw: &str) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "interview" => Stage::Interview,
      "offer" => Stage::Offer,
      "accepted" => Stage::Accepted,
      "staging" => Stage::Staging,
      _ => Stage::Applied,
    }
  }

  /// The lowercase wire label, as sent in stage-update commands.
  pub fn label(self) -> &'static str {
    match self {
      Stage::Applied => "applied",
      Stage::Interview => "interview",
      Stage::Offer => "offer",
      Stage::Accepted => "accepted",
      Stage::Staging => "staging",
    }
  }

  /// Human-facing column title.
  pub fn display_name(self) -> &'static str {
    match self {
      Stage::Applied => "Applied",
      Stage::Interview => "Interview",
      Stage::Offer => "Offer",
      Stage::Accepted => "Accepted",
      Stage::Staging => "Processing",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

// ─── JobCard ─────────────────────────────────────────────────────────────────

/// One tracked application, keyed by the provider-assigned message id.
///
/// Cards are value types: every mutation of the collection produces a
/// fresh `Vec<JobCard>`, never an in-place edit a consumer could observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCard {
  /// Provider-assigned message id. Stable; never regenerated here.
  pub id:                String,
  pub title:             String,
  pub company:           Option<String>,
  pub stage:             Stage,
  /// Localized display date (`"Mar 5, 2025"`); `None` when the raw
  /// timestamp is absent or unparseable.
  pub date:              Option<String>,
  /// The raw source timestamp, kept verbatim. Ordering comparisons use
  /// this, never the display string.
  pub received_at_raw:   Option<String>,
  /// Archived cards stay in the collection; the renderer filters them.
  pub is_archived:       bool,
  /// Soft-delete flag. Hard removal happens only via a `DELETE` event.
  pub is_deleted:        bool,
  pub review_needed:     Option<bool>,
  pub application_stage: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_is_case_insensitive() {
    assert_eq!(Stage::parse("Interview"), Stage::Interview);
    assert_eq!(Stage::parse("OFFER"), Stage::Offer);
    assert_eq!(Stage::parse("accepted"), Stage::Accepted);
  }

  #[test]
  fn parse_unknown_defaults_to_applied() {
    assert_eq!(Stage::parse(""), Stage::Applied);
    assert_eq!(Stage::parse("rejected"), Stage::Applied);
    assert_eq!(Stage::parse("  "), Stage::Applied);
  }

  #[test]
  fn staging_has_its_own_display_name() {
    assert_eq!(Stage::Staging.display_name(), "Processing");
    assert_eq!(Stage::Staging.label(), "staging");
  }
}
