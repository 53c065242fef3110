//! Change application: one incoming event against the canonical
//! collection, producing the next collection.
//!
//! Every function here is replace-whole-collection: callers receive a
//! fresh `Vec<JobCard>` and the previous value is never touched, which
//! keeps change detection in the consumer trivial. Out-of-order or
//! redelivered events degrade to logged no-ops; collection integrity
//! wins over completeness.

use tracing::{debug, warn};

use crate::{
  card::{JobCard, Stage},
  event::ChangeEvent,
  ingest::card_from_row,
};

/// Apply one change event to the collection.
pub fn apply(cards: &[JobCard], event: &ChangeEvent) -> Vec<JobCard> {
  match event {
    ChangeEvent::Insert { row } => upsert(cards, card_from_row(row)),
    ChangeEvent::Update { row } => {
      let card = card_from_row(row);
      if !cards.iter().any(|c| c.id == card.id) {
        // Update delivered ahead of its insert; tolerated, not fatal.
        warn!(id = %card.id, "update for a card not in the collection, ignoring");
        return cards.to_vec();
      }
      replace(cards, card)
    }
    ChangeEvent::Delete { id } => {
      if !cards.iter().any(|c| &c.id == id) {
        debug!(%id, "delete for a card not in the collection");
        return cards.to_vec();
      }
      cards.iter().filter(|c| &c.id != id).cloned().collect()
    }
    ChangeEvent::Touched { id } => {
      // Needs a point re-fetch; the subscription handler resolves this
      // variant into an upsert before calling `apply`.
      warn!(%id, "unresolved row-touch event, ignoring");
      cards.to_vec()
    }
  }
}

/// Insert-or-replace by id. A redelivered insert replaces in place
/// instead of duplicating; a genuinely new card is prepended.
pub fn upsert(cards: &[JobCard], card: JobCard) -> Vec<JobCard> {
  if cards.iter().any(|c| c.id == card.id) {
    replace(cards, card)
  } else {
    let mut next = Vec::with_capacity(cards.len() + 1);
    next.push(card);
    next.extend(cards.iter().cloned());
    next
  }
}

fn replace(cards: &[JobCard], card: JobCard) -> Vec<JobCard> {
  cards
    .iter()
    .map(|c| if c.id == card.id { card.clone() } else { c.clone() })
    .collect()
}

// ─── Optimistic rewrites ─────────────────────────────────────────────────────

/// Rewrite the stage of every card in `ids`.
pub fn with_stage(cards: &[JobCard], ids: &[String], stage: Stage) -> Vec<JobCard> {
  rewrite(cards, ids, |card| card.stage = stage)
}

/// Flag every card in `ids` as archived.
pub fn with_archived(cards: &[JobCard], ids: &[String]) -> Vec<JobCard> {
  rewrite(cards, ids, |card| card.is_archived = true)
}

/// Flag every card in `ids` as soft-deleted. Hard removal happens only
/// when the corresponding `DELETE` event comes back over the channel.
pub fn with_deleted(cards: &[JobCard], ids: &[String]) -> Vec<JobCard> {
  rewrite(cards, ids, |card| card.is_deleted = true)
}

fn rewrite(
  cards: &[JobCard],
  ids: &[String],
  edit: impl Fn(&mut JobCard),
) -> Vec<JobCard> {
  cards
    .iter()
    .map(|c| {
      let mut card = c.clone();
      if ids.iter().any(|id| id == &card.id) {
        edit(&mut card);
      }
      card
    })
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
