//! The board controller — the single owner of the canonical collection.
//!
//! Every write path converges here: the initial bulk load, realtime
//! change events, and the optimistic gesture handlers. The collection is
//! only ever replaced wholesale, and backend command failures are logged
//! without rolling back optimistic state.

use jobdeck_core::{
  JobCard,
  card::Stage,
  event::ChangeEvent,
  gateway::JobGateway,
  ingest::card_from_row,
  reconcile,
  select::Selection,
  view::{self, BoardView, SortKey},
};
use tracing::{info, warn};

/// Explicit identity context. The controller never reads ambient auth
/// state; whoever constructs it decides who is signed in.
#[derive(Debug, Clone)]
pub struct AuthContext {
  pub user_id: String,
  /// Identity bearer token for the command API.
  pub bearer:  String,
}

pub struct BoardController<G: JobGateway> {
  gateway:   G,
  auth:      AuthContext,
  cards:     Vec<JobCard>,
  sort:      SortKey,
  query:     String,
  selection: Selection,
}

impl<G: JobGateway> BoardController<G> {
  pub fn new(gateway: G, auth: AuthContext) -> Self {
    Self {
      gateway,
      auth,
      cards: Vec::new(),
      sort: SortKey::default(),
      query: String::new(),
      selection: Selection::default(),
    }
  }

  // ── Loading and events ────────────────────────────────────────────────────

  /// Bulk-fetch and replace the collection. A failed fetch is logged and
  /// leaves the last-known-good collection in place (empty on first
  /// load), so the board renders an empty state instead of crashing.
  pub async fn load(&mut self) {
    match self.gateway.fetch_jobs(&self.auth.bearer).await {
      Ok(rows) => {
        self.cards = rows.iter().map(card_from_row).collect();
        info!(count = self.cards.len(), "loaded job applications");
      }
      Err(error) => warn!(%error, "bulk fetch failed"),
    }
  }

  /// Apply one realtime event. Id-only events are resolved with a point
  /// re-fetch and merged as an upsert; a failed re-fetch is a logged
  /// no-op.
  pub async fn handle_event(&mut self, event: ChangeEvent) {
    match event {
      ChangeEvent::Touched { id } => {
        match self.gateway.fetch_job(&self.auth.bearer, &id).await {
          Ok(Some(row)) => {
            self.cards = reconcile::upsert(&self.cards, card_from_row(&row));
          }
          Ok(None) => warn!(%id, "touched row no longer exists"),
          Err(error) => warn!(%id, %error, "point re-fetch failed"),
        }
      }
      other => self.cards = reconcile::apply(&self.cards, &other),
    }
  }

  // ── Gestures ──────────────────────────────────────────────────────────────

  /// Drop a dragged card onto `target`. No-op when the card already sits
  /// there; otherwise the collection is rewritten immediately and one
  /// stage-update command goes out. A command failure is logged only —
  /// the optimistic state stands.
  pub async fn drop_card(&mut self, id: &str, target: Stage) {
    let Some(card) = self.cards.iter().find(|c| c.id == id) else {
      warn!(%id, "dropped card not in the collection");
      return;
    };
    if card.stage == target {
      return;
    }
    let ids = vec![id.to_owned()];
    self.cards = reconcile::with_stage(&self.cards, &ids, target);
    if let Err(error) =
      self.gateway.update_stage(&self.auth.bearer, &ids, target).await
    {
      warn!(%id, stage = %target, %error, "stage update failed, keeping optimistic state");
    }
  }

  // ── Multi-select ──────────────────────────────────────────────────────────

  pub fn set_multi_select(&mut self, on: bool) {
    self.selection.set_active(on);
  }

  pub fn toggle_selected(&mut self, id: &str) {
    self.selection.toggle(id);
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  /// Move every selected card to `stage`. One optimistic rewrite, one
  /// command for the whole batch; success clears the selection and
  /// leaves multi-select mode.
  pub async fn bulk_move(&mut self, stage: Stage) {
    let ids = self.selection.ids();
    if ids.is_empty() {
      return;
    }
    self.cards = reconcile::with_stage(&self.cards, &ids, stage);
    match self.gateway.update_stage(&self.auth.bearer, &ids, stage).await {
      Ok(()) => self.selection.set_active(false),
      Err(error) => warn!(count = ids.len(), %error, "bulk move failed"),
    }
  }

  /// Archive every selected card.
  pub async fn bulk_archive(&mut self) {
    let ids = self.selection.ids();
    if ids.is_empty() {
      return;
    }
    self.cards = reconcile::with_archived(&self.cards, &ids);
    match self.gateway.archive(&self.auth.bearer, &ids).await {
      Ok(()) => self.selection.set_active(false),
      Err(error) => warn!(count = ids.len(), %error, "bulk archive failed"),
    }
  }

  /// Soft-delete every selected card. Hard removal follows when the
  /// backend's `DELETE` events arrive over the channel.
  pub async fn bulk_delete(&mut self) {
    let ids = self.selection.ids();
    if ids.is_empty() {
      return;
    }
    self.cards = reconcile::with_deleted(&self.cards, &ids);
    match self.gateway.delete(&self.auth.bearer, &ids).await {
      Ok(()) => self.selection.set_active(false),
      Err(error) => warn!(count = ids.len(), %error, "bulk delete failed"),
    }
  }

  // ── Derived state ─────────────────────────────────────────────────────────

  pub fn set_sort(&mut self, sort: SortKey) {
    self.sort = sort;
  }

  pub fn set_query(&mut self, query: impl Into<String>) {
    self.query = query.into();
  }

  /// The render-ready projection for the current sort and query.
  pub fn view(&self) -> BoardView {
    view::board_view(&self.cards, self.sort, &self.query)
  }

  pub fn cards(&self) -> &[JobCard] {
    &self.cards
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
