//! Mentor and support-resource directory.
//!
//! Directory entries are independent of any student. They are matched to a
//! student at query time by comparing location fields; there is no stored
//! relation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
  pub mentor_id:    Uuid,
  pub name:         String,
  /// Area of expertise, e.g. "Mathematics" or "Career guidance".
  pub expertise:    String,
  pub location:     String,
  pub municipality: Option<String>,
  /// Email address or phone number.
  pub contact:      String,
  pub available:    bool,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResource {
  pub resource_id:  Uuid,
  pub name:         String,
  /// e.g. "Counseling", "Tutoring", "Library".
  pub category:     String,
  pub description:  Option<String>,
  pub location:     String,
  pub municipality: Option<String>,
  pub contact:      String,
  pub available:    bool,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMentor {
  pub name:         String,
  pub expertise:    String,
  #[serde(default)]
  pub location:     String,
  pub municipality: Option<String>,
  #[serde(default)]
  pub contact:      String,
  #[serde(default = "default_available")]
  pub available:    bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSupportResource {
  pub name:         String,
  pub category:     String,
  pub description:  Option<String>,
  #[serde(default)]
  pub location:     String,
  pub municipality: Option<String>,
  #[serde(default)]
  pub contact:      String,
  #[serde(default = "default_available")]
  pub available:    bool,
}

fn default_available() -> bool { true }

impl NewMentor {
  pub fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    require("expertise", &self.expertise)
  }
}

impl NewSupportResource {
  pub fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    require("category", &self.category)
  }
}

fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} must not be empty")));
  }
  Ok(())
}

/// Parameters for directory lookups. Location matching is case-insensitive
/// equality on each field that is set.
#[derive(Debug, Clone, Default)]
pub struct DirectoryQuery {
  pub municipality:   Option<String>,
  pub location:       Option<String>,
  /// If `true`, only entries with `available = true` are returned.
  pub available_only: bool,
  pub limit:          Option<usize>,
}

impl DirectoryQuery {
  /// Available entries in `municipality`, capped at `limit` if given.
  pub fn available_in(municipality: impl Into<String>, limit: Option<usize>) -> Self {
    Self {
      municipality: Some(municipality.into()),
      location: None,
      available_only: true,
      limit,
    }
  }
}
