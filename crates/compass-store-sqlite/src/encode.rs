//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order matches chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use compass_core::{
  conversation::{ChatMessage, ChatRole},
  directory::{Mentor, SupportResource},
  performance::PerformanceRecord,
  profile::StudentProfile,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ChatRole ─────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<ChatRole> {
  match s {
    "user" => Ok(ChatRole::User),
    "assistant" => Ok(ChatRole::Assistant),
    other => Err(Error::UnknownRole(other.to_owned())),
  }
}

// ─── Metadata ─────────────────────────────────────────────────────────────────

pub fn encode_metadata(m: Option<&serde_json::Value>) -> Result<Option<String>> {
  m.map(serde_json::to_string).transpose().map_err(Error::from)
}

pub fn decode_metadata(s: Option<&str>) -> Result<Option<serde_json::Value>> {
  s.map(serde_json::from_str).transpose().map_err(Error::from)
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str =
  "student_id, full_name, location, municipality, grade, school, created_at, updated_at";

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub student_id:   String,
  pub full_name:    String,
  pub location:     String,
  pub municipality: Option<String>,
  pub grade:        Option<u8>,
  pub school:       Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:   row.get(0)?,
      full_name:    row.get(1)?,
      location:     row.get(2)?,
      municipality: row.get(3)?,
      grade:        row.get(4)?,
      school:       row.get(5)?,
      created_at:   row.get(6)?,
      updated_at:   row.get(7)?,
    })
  }

  pub fn into_profile(self) -> Result<StudentProfile> {
    Ok(StudentProfile {
      student_id:   decode_uuid(&self.student_id)?,
      full_name:    self.full_name,
      location:     self.location,
      municipality: self.municipality,
      grade:        self.grade,
      school:       self.school,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

pub const RECORD_COLUMNS: &str =
  "record_id, student_id, subject, score, attendance, notes, recorded_at";

pub struct RawRecord {
  pub record_id:   String,
  pub student_id:  String,
  pub subject:     String,
  pub score:       f64,
  pub attendance:  Option<f64>,
  pub notes:       Option<String>,
  pub recorded_at: String,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:   row.get(0)?,
      student_id:  row.get(1)?,
      subject:     row.get(2)?,
      score:       row.get(3)?,
      attendance:  row.get(4)?,
      notes:       row.get(5)?,
      recorded_at: row.get(6)?,
    })
  }

  pub fn into_record(self) -> Result<PerformanceRecord> {
    Ok(PerformanceRecord {
      record_id:   decode_uuid(&self.record_id)?,
      student_id:  decode_uuid(&self.student_id)?,
      subject:     self.subject,
      score:       self.score,
      attendance:  self.attendance,
      notes:       self.notes,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub const MENTOR_COLUMNS: &str =
  "mentor_id, name, expertise, location, municipality, contact, available, created_at";

pub struct RawMentor {
  pub mentor_id:    String,
  pub name:         String,
  pub expertise:    String,
  pub location:     String,
  pub municipality: Option<String>,
  pub contact:      String,
  pub available:    bool,
  pub created_at:   String,
}

impl RawMentor {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      mentor_id:    row.get(0)?,
      name:         row.get(1)?,
      expertise:    row.get(2)?,
      location:     row.get(3)?,
      municipality: row.get(4)?,
      contact:      row.get(5)?,
      available:    row.get(6)?,
      created_at:   row.get(7)?,
    })
  }

  pub fn into_mentor(self) -> Result<Mentor> {
    Ok(Mentor {
      mentor_id:    decode_uuid(&self.mentor_id)?,
      name:         self.name,
      expertise:    self.expertise,
      location:     self.location,
      municipality: self.municipality,
      contact:      self.contact,
      available:    self.available,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const RESOURCE_COLUMNS: &str = "resource_id, name, category, description, location, \
                                    municipality, contact, available, created_at";

pub struct RawResource {
  pub resource_id:  String,
  pub name:         String,
  pub category:     String,
  pub description:  Option<String>,
  pub location:     String,
  pub municipality: Option<String>,
  pub contact:      String,
  pub available:    bool,
  pub created_at:   String,
}

impl RawResource {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      resource_id:  row.get(0)?,
      name:         row.get(1)?,
      category:     row.get(2)?,
      description:  row.get(3)?,
      location:     row.get(4)?,
      municipality: row.get(5)?,
      contact:      row.get(6)?,
      available:    row.get(7)?,
      created_at:   row.get(8)?,
    })
  }

  pub fn into_resource(self) -> Result<SupportResource> {
    Ok(SupportResource {
      resource_id:  decode_uuid(&self.resource_id)?,
      name:         self.name,
      category:     self.category,
      description:  self.description,
      location:     self.location,
      municipality: self.municipality,
      contact:      self.contact,
      available:    self.available,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const MESSAGE_COLUMNS: &str =
  "message_id, student_id, role, content, metadata, created_at";

pub struct RawMessage {
  pub message_id: String,
  pub student_id: Option<String>,
  pub role:       String,
  pub content:    String,
  pub metadata:   Option<String>,
  pub created_at: String,
}

impl RawMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id: row.get(0)?,
      student_id: row.get(1)?,
      role:       row.get(2)?,
      content:    row.get(3)?,
      metadata:   row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_message(self) -> Result<ChatMessage> {
    Ok(ChatMessage {
      message_id: decode_uuid(&self.message_id)?,
      student_id: self.student_id.as_deref().map(decode_uuid).transpose()?,
      role:       decode_role(&self.role)?,
      content:    self.content,
      metadata:   decode_metadata(self.metadata.as_deref())?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1500);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn unknown_role_is_an_error() {
    assert!(matches!(decode_role("system"), Err(Error::UnknownRole(_))));
  }
}
