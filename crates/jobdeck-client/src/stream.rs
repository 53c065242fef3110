//! NDJSON event-stream transport for the push channel.
//!
//! The backend exposes its change feed as a long-lived HTTP response of
//! newline-delimited JSON payloads, one broadcast event per line. Blank
//! lines are keep-alives. Undecodable lines are logged and skipped —
//! one bad payload must not take the channel down.

use std::{collections::VecDeque, time::Duration};

use jobdeck_core::ChangeEvent;
use jobdeck_sync::{ChannelFactory, ChannelMessage, ChannelStatus, PushChannel};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::error::Error;

// ─── Factory ─────────────────────────────────────────────────────────────────

/// Opens NDJSON event streams scoped to a (user, credential) pair.
#[derive(Clone)]
pub struct EventStreamFactory {
  client:   Client,
  base_url: String,
}

impl EventStreamFactory {
  /// The streaming client has a connect timeout but no overall request
  /// timeout — the response is expected to stay open indefinitely.
  pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(10))
      .build()?;
    Ok(Self { client, base_url: base_url.into() })
  }
}

impl ChannelFactory for EventStreamFactory {
  type Channel = EventStream;
  type Error = Error;

  /// `GET /realtime/stream`, authenticated with the scoped credential.
  async fn open(&self, user_id: &str, token: &str) -> Result<EventStream, Error> {
    let url = format!(
      "{}/realtime/stream",
      self.base_url.trim_end_matches('/')
    );
    let resp = self
      .client
      .get(url)
      .query(&[("user_id", user_id)])
      .bearer_auth(token)
      .send()
      .await?;
    match resp.status() {
      status if status.is_success() => Ok(EventStream {
        resp:    Some(resp),
        buf:     Vec::new(),
        pending: VecDeque::from([ChannelMessage::Status(
          ChannelStatus::Subscribed,
        )]),
      }),
      status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
        Err(Error::NotAuthorized { endpoint: "/realtime/stream", status })
      }
      status => Err(Error::Status { endpoint: "/realtime/stream", status }),
    }
  }
}

// ─── Stream ──────────────────────────────────────────────────────────────────

/// A live NDJSON event stream.
pub struct EventStream {
  resp:    Option<Response>,
  buf:     Vec<u8>,
  pending: VecDeque<ChannelMessage>,
}

impl PushChannel for EventStream {
  async fn recv(&mut self) -> Option<ChannelMessage> {
    loop {
      if let Some(msg) = self.pending.pop_front() {
        return Some(msg);
      }
      let resp = self.resp.as_mut()?;
      match resp.chunk().await {
        Ok(Some(chunk)) => {
          self.buf.extend_from_slice(&chunk);
          for line in drain_lines(&mut self.buf) {
            if let Some(msg) = decode_line(&line) {
              self.pending.push_back(msg);
            }
          }
        }
        Ok(None) => {
          debug!("event stream ended");
          self.resp = None;
          self
            .pending
            .push_back(ChannelMessage::Status(ChannelStatus::Closed));
        }
        Err(error) => {
          let status = if error.is_timeout() {
            ChannelStatus::TimedOut
          } else {
            ChannelStatus::Errored(error.to_string())
          };
          self.resp = None;
          self.pending.push_back(ChannelMessage::Status(status));
        }
      }
    }
  }

  async fn close(self) {
    // Dropping the response tears down the HTTP stream.
  }
}

/// Split completed lines out of `buf`, leaving any partial tail in
/// place for the next chunk.
fn drain_lines(buf: &mut Vec<u8>) -> Vec<String> {
  let mut lines = Vec::new();
  while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
    let line: Vec<u8> = buf.drain(..=pos).collect();
    lines.push(String::from_utf8_lossy(&line[..line.len() - 1]).into_owned());
  }
  lines
}

fn decode_line(line: &str) -> Option<ChannelMessage> {
  let line = line.trim();
  if line.is_empty() {
    // Keep-alive.
    return None;
  }
  match serde_json::from_str::<serde_json::Value>(line) {
    Ok(payload) => ChangeEvent::decode(&payload).map(ChannelMessage::Event),
    Err(error) => {
      warn!(%error, "undecodable event line, skipping");
      None
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
