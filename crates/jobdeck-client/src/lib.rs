//! HTTP transport for jobdeck: the JSON command API client and the
//! NDJSON event-stream channel.

pub mod api;
pub mod error;
pub mod stream;

pub use api::{ApiClient, ApiConfig};
pub use error::{Error, Result};
pub use stream::EventStreamFactory;
