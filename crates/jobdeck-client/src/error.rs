//! Error types for `jobdeck-client`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// A privileged endpoint was reached without the right grant. Handled
  /// by the immediate caller; never propagated into the reconciliation
  /// core.
  #[error("not authorized for {endpoint} ({status})")]
  NotAuthorized {
    endpoint: &'static str,
    status:   StatusCode,
  },

  #[error("unexpected status {status} from {endpoint}")]
  Status {
    endpoint: &'static str,
    status:   StatusCode,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
