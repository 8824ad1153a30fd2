//! Error type for `compass-gateway`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
  /// A required setting (usually the API key) is missing. Raised when the
  /// gateway is constructed, never per request.
  #[error("gateway configuration error: {0}")]
  Config(String),

  #[error("upstream did not respond within {0:?}")]
  Timeout(Duration),

  #[error("completion call was cancelled")]
  Cancelled,

  /// The upstream answered with a non-2xx status.
  #[error("upstream returned HTTP {status}")]
  Upstream { status: u16 },

  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),
}
