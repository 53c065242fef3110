//! The push-channel contract.

use std::future::Future;

use jobdeck_core::ChangeEvent;

/// Lifecycle signals a channel can report alongside events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
  Subscribed,
  Closed,
  TimedOut,
  Errored(String),
}

/// One message off the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
  Event(ChangeEvent),
  Status(ChannelStatus),
}

/// A live push channel, scoped to one (user, credential) pair.
pub trait PushChannel: Send {
  /// The next message; `None` once the underlying stream is exhausted.
  fn recv(
    &mut self,
  ) -> impl Future<Output = Option<ChannelMessage>> + Send + '_;

  /// Explicitly close the channel. Must complete before a successor
  /// opens — the subscription manager relies on this ordering.
  fn close(self) -> impl Future<Output = ()> + Send;
}

/// Opens channels. Implemented by the transport (`jobdeck-client`) and
/// by in-memory fakes in tests.
pub trait ChannelFactory: Send + Sync {
  type Channel: PushChannel;
  type Error: std::error::Error + Send + Sync + 'static;

  fn open<'a>(
    &'a self,
    user_id: &'a str,
    token: &'a str,
  ) -> impl Future<Output = Result<Self::Channel, Self::Error>> + Send + 'a;
}
