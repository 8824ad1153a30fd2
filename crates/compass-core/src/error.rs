//! Error types for `compass-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("a profile already exists for {0}")]
  ProfileExists(Uuid),

  #[error("mentor not found: {0}")]
  MentorNotFound(Uuid),

  #[error("support resource not found: {0}")]
  ResourceNotFound(Uuid),

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
