//! Student profiles: one row per identity, created at signup.
//!
//! The profile id is the identity id handed out by the authentication
//! provider; the store never invents one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A student's profile as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
  pub student_id:   Uuid,
  pub full_name:    String,
  /// Free-text location, e.g. a town or suburb.
  pub location:     String,
  pub municipality: Option<String>,
  /// School grade level, if the student supplied one.
  pub grade:        Option<u8>,
  pub school:       Option<String>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input to [`StudentStore::create_profile`](crate::store::StudentStore::create_profile).
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
  pub student_id:   Uuid,
  pub full_name:    String,
  #[serde(default)]
  pub location:     String,
  pub municipality: Option<String>,
  pub grade:        Option<u8>,
  pub school:       Option<String>,
}

impl NewProfile {
  pub fn new(student_id: Uuid, full_name: impl Into<String>) -> Self {
    Self {
      student_id,
      full_name: full_name.into(),
      location: String::new(),
      municipality: None,
      grade: None,
      school: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.full_name.trim().is_empty() {
      return Err(Error::Validation("full_name must not be empty".into()));
    }
    Ok(())
  }
}

/// A partial update; `None` leaves the stored value untouched.
///
/// Optional profile fields can be cleared by sending an empty string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub full_name:    Option<String>,
  pub location:     Option<String>,
  pub municipality: Option<String>,
  pub grade:        Option<u8>,
  pub school:       Option<String>,
}

impl ProfileUpdate {
  /// Apply this update to `profile` in place. `updated_at` is the caller's
  /// responsibility.
  pub fn apply(self, profile: &mut StudentProfile) -> Result<()> {
    if let Some(name) = self.full_name {
      if name.trim().is_empty() {
        return Err(Error::Validation("full_name must not be empty".into()));
      }
      profile.full_name = name;
    }
    if let Some(location) = self.location {
      profile.location = location;
    }
    if let Some(municipality) = self.municipality {
      profile.municipality = non_empty(municipality);
    }
    if let Some(grade) = self.grade {
      profile.grade = Some(grade);
    }
    if let Some(school) = self.school {
      profile.school = non_empty(school);
    }
    Ok(())
  }
}

fn non_empty(s: String) -> Option<String> {
  if s.trim().is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile() -> StudentProfile {
    let now = Utc::now();
    StudentProfile {
      student_id:   Uuid::new_v4(),
      full_name:    "Thandi Mokoena".into(),
      location:     "Seshego".into(),
      municipality: Some("Polokwane".into()),
      grade:        Some(10),
      school:       None,
      created_at:   now,
      updated_at:   now,
    }
  }

  #[test]
  fn update_touches_only_given_fields() {
    let mut p = profile();
    ProfileUpdate {
      school: Some("Capricorn High".into()),
      ..Default::default()
    }
    .apply(&mut p)
    .unwrap();

    assert_eq!(p.school.as_deref(), Some("Capricorn High"));
    assert_eq!(p.full_name, "Thandi Mokoena");
    assert_eq!(p.grade, Some(10));
  }

  #[test]
  fn empty_string_clears_optional_field() {
    let mut p = profile();
    ProfileUpdate {
      municipality: Some("  ".into()),
      ..Default::default()
    }
    .apply(&mut p)
    .unwrap();
    assert_eq!(p.municipality, None);
  }

  #[test]
  fn blank_name_is_rejected() {
    let mut p = profile();
    let err = ProfileUpdate {
      full_name: Some(String::new()),
      ..Default::default()
    }
    .apply(&mut p)
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(NewProfile::new(Uuid::new_v4(), " ").validate().is_err());
  }
}
