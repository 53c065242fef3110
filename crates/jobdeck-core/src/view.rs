//! Derived views: sorting, fuzzy search, and per-column grouping.
//!
//! Everything here is a pure projection of the canonical collection,
//! safe to recompute on every input change. Search reorders and dims —
//! it never removes a card from the board.

use std::{cmp::Reverse, collections::HashMap};

use strsim::jaro_winkler;

use crate::{
  card::{JobCard, Stage},
  dates,
};

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// User-selected sort order. Wire names follow the control-bar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  /// Preserve collection order.
  #[default]
  Default,
  NewestFirst,
  OldestFirst,
  TitleAsc,
  TitleDesc,
}

impl SortKey {
  /// Parse a control-bar value (`new`, `old`, `az`, `za`); anything else
  /// is the no-op default.
  pub fn parse(raw: &str) -> Self {
    match raw {
      "new" => SortKey::NewestFirst,
      "old" => SortKey::OldestFirst,
      "az" => SortKey::TitleAsc,
      "za" => SortKey::TitleDesc,
      _ => SortKey::Default,
    }
  }
}

/// A totally ordered copy of the collection.
///
/// `new`/`old` compare the raw received timestamp (never the localized
/// display string), and cards without a parseable timestamp sort last.
/// `az`/`za` compare titles case-insensitively.
pub fn sorted(cards: &[JobCard], key: SortKey) -> Vec<JobCard> {
  let mut out = cards.to_vec();
  match key {
    SortKey::Default => {}
    SortKey::NewestFirst => out.sort_by_cached_key(|c| {
      let millis = dates::received_millis(c.received_at_raw.as_deref());
      (millis.is_none(), Reverse(millis.unwrap_or(i64::MIN)))
    }),
    SortKey::OldestFirst => out.sort_by_cached_key(|c| {
      let millis = dates::received_millis(c.received_at_raw.as_deref());
      (millis.is_none(), millis.unwrap_or(i64::MAX))
    }),
    SortKey::TitleAsc => out.sort_by_cached_key(|c| c.title.to_lowercase()),
    SortKey::TitleDesc => {
      out.sort_by_cached_key(|c| Reverse(c.title.to_lowercase()))
    }
  }
  out
}

// ─── Fuzzy search ────────────────────────────────────────────────────────────

/// Distance a field must stay under to count as a match
/// (0 = exact, 1 = unrelated).
pub const MATCH_THRESHOLD: f64 = 0.1;
/// Upper bound applied to result scores after matching.
pub const SCORE_CUTOFF: f64 = 0.4;

/// One fuzzy match, in rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
  pub id:    String,
  pub score: f64,
}

/// Score a field against the query: 0 for substring containment,
/// otherwise the Jaro-Winkler distance of the lowercased pair.
fn field_score(field: &str, query: &str) -> f64 {
  let field = field.to_lowercase();
  if field.contains(query) {
    return 0.0;
  }
  1.0 - jaro_winkler(&field, query)
}

fn card_score(card: &JobCard, query: &str) -> f64 {
  field_score(&card.title, query)
    .min(field_score(card.stage.label(), query))
    .min(field_score(card.date.as_deref().unwrap_or_default(), query))
}

/// Fuzzy-match `query` over title, stage, and display date.
///
/// An empty query matches everything with a zero score. Hits are ranked
/// by score, stable on the incoming order for ties.
pub fn search(cards: &[JobCard], query: &str) -> Vec<SearchHit> {
  let query = query.trim().to_lowercase();
  if query.is_empty() {
    return cards
      .iter()
      .map(|c| SearchHit { id: c.id.clone(), score: 0.0 })
      .collect();
  }

  let mut hits: Vec<SearchHit> = cards
    .iter()
    .filter_map(|c| {
      let score = card_score(c, &query);
      (score <= MATCH_THRESHOLD).then(|| SearchHit { id: c.id.clone(), score })
    })
    .collect();
  hits.sort_by(|a, b| a.score.total_cmp(&b.score));
  hits.retain(|h| h.score <= SCORE_CUTOFF);
  hits
}

// ─── Board view ──────────────────────────────────────────────────────────────

/// One rendered card: the canonical value plus its de-emphasis flag.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
  pub card:   JobCard,
  /// True when an active search did not match this card. Dimmed cards
  /// are de-prioritized in their column, never dropped.
  pub dimmed: bool,
}

/// One rendered column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
  pub stage: Stage,
  pub cards: Vec<CardView>,
}

/// The full render-ready board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
  pub columns: Vec<ColumnView>,
}

impl BoardView {
  /// Total cards across all columns; always equals the collection size.
  pub fn card_count(&self) -> usize {
    self.columns.iter().map(|col| col.cards.len()).sum()
  }
}

/// Project the collection into per-column lists.
///
/// The four primary columns are always present; the `staging`
/// ("Processing") column only while some card holds it. Within a column,
/// matched cards lead in match-rank order; unmatched cards follow in
/// sorted order, flagged dimmed.
pub fn board_view(cards: &[JobCard], key: SortKey, query: &str) -> BoardView {
  let ordered = sorted(cards, key);
  let hits = search(&ordered, query);
  let rank: HashMap<&str, usize> = hits
    .iter()
    .enumerate()
    .map(|(i, hit)| (hit.id.as_str(), i))
    .collect();

  let mut stages: Vec<Stage> = Stage::BOARD.to_vec();
  if ordered.iter().any(|c| c.stage == Stage::Staging) {
    stages.push(Stage::Staging);
  }

  let columns = stages
    .into_iter()
    .map(|stage| {
      let mut matched: Vec<(usize, &JobCard)> = ordered
        .iter()
        .filter(|c| c.stage == stage)
        .filter_map(|c| rank.get(c.id.as_str()).map(|r| (*r, c)))
        .collect();
      matched.sort_by_key(|(r, _)| *r);

      let unmatched = ordered
        .iter()
        .filter(|c| c.stage == stage && !rank.contains_key(c.id.as_str()));

      let cards = matched
        .into_iter()
        .map(|(_, c)| CardView { card: c.clone(), dimmed: false })
        .chain(unmatched.map(|c| CardView { card: c.clone(), dimmed: true }))
        .collect();
      ColumnView { stage, cards }
    })
    .collect();

  BoardView { columns }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn card(id: &str, title: &str, stage: Stage, raw: Option<&str>) -> JobCard {
    let date = raw
      .and_then(dates::parse_received)
      .map(dates::display_date);
    JobCard {
      id:                id.to_owned(),
      title:             title.to_owned(),
      company:           None,
      stage,
      date,
      received_at_raw:   raw.map(ToOwned::to_owned),
      is_archived:       false,
      is_deleted:        false,
      review_needed:     None,
      application_stage: None,
    }
  }

  #[test]
  fn newest_first_uses_raw_timestamps() {
    let cards = vec![
      card("a", "A", Stage::Applied, Some("2024-01-01")),
      card("b", "B", Stage::Applied, Some("2023-01-01")),
      card("c", "C", Stage::Applied, Some("2025-01-01")),
    ];
    let ids: Vec<String> = sorted(&cards, SortKey::NewestFirst)
      .into_iter()
      .map(|c| c.id)
      .collect();
    assert_eq!(ids, ["c", "a", "b"]);
  }

  #[test]
  fn oldest_first_reverses() {
    let cards = vec![
      card("a", "A", Stage::Applied, Some("2024-01-01")),
      card("b", "B", Stage::Applied, Some("2023-01-01")),
      card("c", "C", Stage::Applied, Some("2025-01-01")),
    ];
    let out = sorted(&cards, SortKey::OldestFirst);
    assert_eq!(out[0].id, "b");
    assert_eq!(out[2].id, "c");
  }

  #[test]
  fn missing_timestamps_sort_last() {
    let cards = vec![
      card("a", "A", Stage::Applied, None),
      card("b", "B", Stage::Applied, Some("2024-06-01")),
    ];
    assert_eq!(sorted(&cards, SortKey::NewestFirst)[0].id, "b");
    assert_eq!(sorted(&cards, SortKey::OldestFirst)[0].id, "b");
  }

  #[test]
  fn title_sort_is_case_normalized() {
    let cards = vec![
      card("1", "Banana", Stage::Applied, None),
      card("2", "apple", Stage::Applied, None),
      card("3", "Cherry", Stage::Applied, None),
    ];
    let titles: Vec<String> = sorted(&cards, SortKey::TitleAsc)
      .into_iter()
      .map(|c| c.title)
      .collect();
    assert_eq!(titles, ["apple", "Banana", "Cherry"]);

    let titles: Vec<String> = sorted(&cards, SortKey::TitleDesc)
      .into_iter()
      .map(|c| c.title)
      .collect();
    assert_eq!(titles, ["Cherry", "Banana", "apple"]);
  }

  #[test]
  fn default_preserves_collection_order() {
    let cards = vec![
      card("z", "Zeta", Stage::Applied, None),
      card("a", "Alpha", Stage::Applied, None),
    ];
    let out = sorted(&cards, SortKey::Default);
    assert_eq!(out[0].id, "z");
  }

  #[test]
  fn empty_query_matches_everything() {
    let cards = vec![
      card("1", "Backend", Stage::Applied, None),
      card("2", "Frontend", Stage::Offer, None),
    ];
    let hits = search(&cards, "  ");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.score == 0.0));
  }

  #[test]
  fn substring_match_scores_zero() {
    let cards = vec![card("1", "Senior Backend Engineer", Stage::Applied, None)];
    let hits = search(&cards, "backend");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].score, 0.0);
  }

  #[test]
  fn near_miss_typo_still_matches() {
    let cards = vec![card("1", "Google", Stage::Applied, None)];
    let hits = search(&cards, "gogle");
    assert_eq!(hits.len(), 1);
    assert!(hits[0].score > 0.0 && hits[0].score <= MATCH_THRESHOLD);
  }

  #[test]
  fn unrelated_query_matches_nothing() {
    let cards = vec![card("1", "Frontend Engineer", Stage::Applied, None)];
    assert!(search(&cards, "zzzqqq").is_empty());
  }

  #[test]
  fn stage_label_and_date_are_searchable() {
    let cards = vec![
      card("1", "A", Stage::Interview, Some("2025-03-05")),
      card("2", "B", Stage::Applied, None),
    ];
    let by_stage = search(&cards, "interview");
    assert_eq!(by_stage.len(), 1);
    assert_eq!(by_stage[0].id, "1");

    let by_date = search(&cards, "mar 5");
    assert_eq!(by_date.len(), 1);
    assert_eq!(by_date[0].id, "1");
  }

  #[test]
  fn board_always_has_four_primary_columns() {
    let view = board_view(&[], SortKey::Default, "");
    let stages: Vec<Stage> = view.columns.iter().map(|c| c.stage).collect();
    assert_eq!(stages, Stage::BOARD);
  }

  #[test]
  fn staging_column_appears_iff_occupied() {
    let mut cards = vec![card("1", "A", Stage::Staging, None)];
    let view = board_view(&cards, SortKey::Default, "");
    assert_eq!(view.columns.len(), 5);
    assert_eq!(view.columns[4].stage, Stage::Staging);

    cards.clear();
    let view = board_view(&cards, SortKey::Default, "");
    assert_eq!(view.columns.len(), 4);
  }

  #[test]
  fn search_never_drops_cards_from_the_board() {
    let cards = vec![
      card("1", "Backend Engineer", Stage::Applied, None),
      card("2", "Frontend Engineer", Stage::Applied, None),
      card("3", "Data Scientist", Stage::Interview, None),
      card("4", "Chef", Stage::Offer, None),
    ];
    for query in ["", "engineer", "zzzqqq", "chef"] {
      let view = board_view(&cards, SortKey::Default, query);
      assert_eq!(view.card_count(), cards.len(), "query = {query:?}");
    }
  }

  #[test]
  fn matched_cards_lead_their_column_and_others_dim() {
    let cards = vec![
      card("1", "Chef", Stage::Applied, None),
      card("2", "Backend Engineer", Stage::Applied, None),
    ];
    let view = board_view(&cards, SortKey::Default, "engineer");
    let applied = &view.columns[0];
    assert_eq!(applied.cards[0].card.id, "2");
    assert!(!applied.cards[0].dimmed);
    assert_eq!(applied.cards[1].card.id, "1");
    assert!(applied.cards[1].dimmed);
  }

  #[test]
  fn empty_query_dims_nothing() {
    let cards = vec![
      card("1", "A", Stage::Applied, None),
      card("2", "B", Stage::Interview, None),
    ];
    let view = board_view(&cards, SortKey::Default, "");
    assert!(view
      .columns
      .iter()
      .flat_map(|c| c.cards.iter())
      .all(|cv| !cv.dimmed));
  }
}
