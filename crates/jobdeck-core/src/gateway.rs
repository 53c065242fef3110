//! The backend command API, abstracted so the reconciliation core and
//! its tests never touch HTTP.
//!
//! Implemented by `jobdeck-client` over the JSON API. The bearer token
//! is always an explicit argument — nothing here reads ambient auth
//! state, which keeps the controller independently testable.
//!
//! All methods return `Send` futures so the trait can be used from
//! multi-threaded async runtimes.

use std::future::Future;

use crate::{card::Stage, row::RawJob};

pub trait JobGateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Bulk-fetch the user's job applications.
  fn fetch_jobs<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Vec<RawJob>, Self::Error>> + Send + 'a;

  /// Point re-fetch of a single row, used to resolve events that carry
  /// only an id. `None` when the row no longer exists.
  fn fetch_job<'a>(
    &'a self,
    token: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<RawJob>, Self::Error>> + Send + 'a;

  /// Move every id in the batch to `stage`.
  fn update_stage<'a>(
    &'a self,
    token: &'a str,
    ids: &'a [String],
    stage: Stage,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn archive<'a>(
    &'a self,
    token: &'a str,
    ids: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Request hard deletion. The local collection only drops the cards
  /// when the resulting `DELETE` events come back over the channel.
  fn delete<'a>(
    &'a self,
    token: &'a str,
    ids: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Mint a scoped, short-lived credential for the realtime channel
  /// (validity window is roughly 30 minutes).
  fn mint_realtime_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
