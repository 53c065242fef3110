//! Realtime plumbing for the jobdeck board: the push-channel contract,
//! the subscription manager, and the credential-rotation loop.
//!
//! Transports are supplied by the embedder through [`ChannelFactory`];
//! this crate owns lifecycles, not wire formats.

pub mod channel;
pub mod rotation;
pub mod subscription;

pub use channel::{ChannelFactory, ChannelMessage, ChannelStatus, PushChannel};
pub use rotation::TokenMinter;
