//! The credential-rotation loop.
//!
//! The realtime channel authenticates with a scoped, short-lived token;
//! this loop keeps a valid one available for as long as a user is
//! present, refreshing well inside the validity window.

use std::{future::Future, time::Duration};

use tokio::{
  sync::watch,
  time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

/// Mints scoped realtime credentials. Implemented over the command API
/// by the embedding application.
pub trait TokenMinter: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn mint<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

/// Refresh cadence. The scoped credential is valid for roughly thirty
/// minutes; refreshing at twenty-five keeps a healthy margin.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(25 * 60);

/// Keep a fresh credential in `token_tx` while a user is present.
///
/// An immediate mint on user arrival, then one per `interval` tick. A
/// tick is skipped entirely while the client is hidden; it is retried
/// on the next tick, not immediately. A failed mint is logged as a warning and
/// the previous credential stays in place, so the subscription may ride
/// a stale token until a refresh succeeds; that is accepted degradation.
///
/// Returns when the user sender goes away.
pub async fn run<M>(
  minter: M,
  interval: Duration,
  mut user: watch::Receiver<String>,
  visible: watch::Receiver<bool>,
  token_tx: watch::Sender<Option<String>>,
) where
  M: TokenMinter,
{
  loop {
    let uid = user.borrow_and_update().clone();
    if uid.is_empty() {
      // Signed out: drop any stored credential and wait.
      token_tx.send_replace(None);
      if user.changed().await.is_err() {
        return;
      }
      continue;
    }

    mint_once(&minter, &uid, &token_tx).await;

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await; // the first tick completes immediately

    loop {
      tokio::select! {
        changed = user.changed() => {
          if changed.is_err() {
            return;
          }
          // User switched or signed out; restart the outer loop.
          break;
        }
        _ = ticker.tick() => {
          if !*visible.borrow() {
            debug!("client hidden, skipping credential refresh");
            continue;
          }
          mint_once(&minter, &uid, &token_tx).await;
        }
      }
    }
  }
}

async fn mint_once<M: TokenMinter>(
  minter: &M,
  uid: &str,
  token_tx: &watch::Sender<Option<String>>,
) {
  match minter.mint(uid).await {
    Ok(token) => {
      debug!(user = uid, "scoped realtime credential refreshed");
      token_tx.send_replace(Some(token));
    }
    Err(error) => {
      warn!(user = uid, %error, "credential refresh failed, keeping previous token");
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("mint refused")]
  struct MintError;

  #[derive(Clone, Default)]
  struct CountingMinter {
    calls:   Arc<AtomicUsize>,
    fail_on: Option<usize>,
  }

  impl TokenMinter for CountingMinter {
    type Error = MintError;

    async fn mint(&self, _user_id: &str) -> Result<String, MintError> {
      let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
      if self.fail_on == Some(n) {
        return Err(MintError);
      }
      Ok(format!("tok-{n}"))
    }
  }

  const INTERVAL: Duration = Duration::from_secs(25 * 60);

  #[tokio::test(start_paused = true)]
  async fn mints_immediately_and_on_cadence() {
    let minter = CountingMinter::default();
    let calls = minter.calls.clone();
    let (_user_tx, user_rx) = watch::channel("u1".to_owned());
    let (_visible_tx, visible_rx) = watch::channel(true);
    let (token_tx, mut token_rx) = watch::channel(None::<String>);

    let handle =
      tokio::spawn(run(minter, INTERVAL, user_rx, visible_rx, token_tx));

    token_rx.changed().await.unwrap();
    assert_eq!(token_rx.borrow().as_deref(), Some("tok-1"));

    let start = time::Instant::now();
    token_rx.changed().await.unwrap();
    assert_eq!(token_rx.borrow().as_deref(), Some("tok-2"));
    assert!(start.elapsed() >= INTERVAL);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    handle.abort();
  }

  #[tokio::test(start_paused = true)]
  async fn hidden_client_skips_refresh_cycles() {
    let minter = CountingMinter::default();
    let calls = minter.calls.clone();
    let (_user_tx, user_rx) = watch::channel("u1".to_owned());
    let (visible_tx, visible_rx) = watch::channel(true);
    let (token_tx, mut token_rx) = watch::channel(None::<String>);

    let handle =
      tokio::spawn(run(minter, INTERVAL, user_rx, visible_rx, token_tx));

    token_rx.changed().await.unwrap();
    visible_tx.send(false).unwrap();

    // Several intervals pass without a mint.
    let waited =
      time::timeout(INTERVAL * 3, token_rx.changed()).await;
    assert!(waited.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Visible again: the next tick refreshes.
    visible_tx.send(true).unwrap();
    token_rx.changed().await.unwrap();
    assert_eq!(token_rx.borrow().as_deref(), Some("tok-2"));
    handle.abort();
  }

  #[tokio::test(start_paused = true)]
  async fn failed_refresh_keeps_previous_token() {
    let minter = CountingMinter {
      fail_on: Some(2),
      ..CountingMinter::default()
    };
    let calls = minter.calls.clone();
    let (_user_tx, user_rx) = watch::channel("u1".to_owned());
    let (_visible_tx, visible_rx) = watch::channel(true);
    let (token_tx, mut token_rx) = watch::channel(None::<String>);

    let handle =
      tokio::spawn(run(minter, INTERVAL, user_rx, visible_rx, token_tx));

    token_rx.changed().await.unwrap();
    assert_eq!(token_rx.borrow().as_deref(), Some("tok-1"));

    // The second mint fails silently; the third replaces the token on
    // the unchanged schedule.
    token_rx.changed().await.unwrap();
    assert_eq!(token_rx.borrow().as_deref(), Some("tok-3"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    handle.abort();
  }

  #[tokio::test(start_paused = true)]
  async fn signing_out_clears_the_token() {
    let minter = CountingMinter::default();
    let (user_tx, user_rx) = watch::channel("u1".to_owned());
    let (_visible_tx, visible_rx) = watch::channel(true);
    let (token_tx, mut token_rx) = watch::channel(None::<String>);

    let handle =
      tokio::spawn(run(minter, INTERVAL, user_rx, visible_rx, token_tx));

    token_rx.changed().await.unwrap();
    assert!(token_rx.borrow().is_some());

    user_tx.send(String::new()).unwrap();
    token_rx.changed().await.unwrap();
    assert!(token_rx.borrow().is_none());
    handle.abort();
  }
}
