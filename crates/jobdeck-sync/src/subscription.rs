//! The realtime subscription manager.
//!
//! Maintains at most one live push channel per manager, keyed by the
//! (user id, scoped credential) pair. Reconnection is deliberately not
//! handled here: a dead channel stays down until the next credential
//! rotation or user change re-triggers a rebuild.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use jobdeck_core::ChangeEvent;

use crate::channel::{ChannelFactory, ChannelMessage, ChannelStatus, PushChannel};

/// What the pump loop decided after one wakeup.
enum Pump {
  Continue,
  /// The channel reported a terminal status or its stream ended.
  ChannelDown,
  /// An input changed; `true` while the senders are still alive.
  Inputs(bool),
  /// The event sink was dropped; the consumer is gone.
  SinkGone,
}

/// Drive the push-channel lifecycle for one user session.
///
/// Whenever the user id or credential changes, the current channel is
/// closed before a replacement opens. An empty user id or a missing
/// credential means "stay disconnected". Every received event is
/// forwarded unmodified into `events`.
///
/// Returns when an input sender or the event receiver goes away; any
/// open channel is closed on the way out.
pub async fn run<F>(
  factory: F,
  mut user: watch::Receiver<String>,
  mut token: watch::Receiver<Option<String>>,
  events: mpsc::Sender<ChangeEvent>,
) where
  F: ChannelFactory,
{
  loop {
    let current_user = user.borrow_and_update().clone();
    let current_token = token.borrow_and_update().clone();

    let mut channel = match (current_user.as_str(), current_token.as_deref()) {
      ("", _) | (_, None) => None,
      (uid, Some(tok)) => match factory.open(uid, tok).await {
        Ok(ch) => {
          info!(user = uid, "realtime channel open");
          Some(ch)
        }
        Err(error) => {
          warn!(user = uid, %error, "failed to open realtime channel");
          None
        }
      },
    };

    // Pump messages (or just wait, when disconnected) until an input
    // change forces a rebuild.
    let alive = loop {
      let pump = match channel.as_mut() {
        Some(ch) => {
          tokio::select! {
            changed = user.changed() => Pump::Inputs(changed.is_ok()),
            changed = token.changed() => Pump::Inputs(changed.is_ok()),
            msg = ch.recv() => match msg {
              Some(ChannelMessage::Event(event)) => {
                if events.send(event).await.is_err() {
                  Pump::SinkGone
                } else {
                  Pump::Continue
                }
              }
              Some(ChannelMessage::Status(ChannelStatus::Subscribed)) => {
                debug!("realtime channel subscribed");
                Pump::Continue
              }
              Some(ChannelMessage::Status(status)) => {
                warn!(?status, "realtime channel down, awaiting next credential");
                Pump::ChannelDown
              }
              None => {
                warn!("realtime channel stream ended");
                Pump::ChannelDown
              }
            },
          }
        }
        None => tokio::select! {
          changed = user.changed() => Pump::Inputs(changed.is_ok()),
          changed = token.changed() => Pump::Inputs(changed.is_ok()),
        },
      };

      match pump {
        Pump::Continue => {}
        Pump::ChannelDown => {
          if let Some(ch) = channel.take() {
            ch.close().await;
          }
        }
        Pump::Inputs(alive) => break alive,
        Pump::SinkGone => {
          if let Some(ch) = channel.take() {
            ch.close().await;
          }
          return;
        }
      }
    };

    // Close the outgoing channel before the next cycle can open a
    // successor.
    if let Some(ch) = channel.take() {
      ch.close().await;
    }
    if !alive {
      return;
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
