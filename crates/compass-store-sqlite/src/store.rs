//! [`SqliteStore`]: the SQLite implementation of [`StudentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use compass_core::{
  conversation::{ChatMessage, NewChatMessage},
  directory::{
    DirectoryQuery, Mentor, NewMentor, NewSupportResource, SupportResource,
  },
  performance::{NewPerformanceRecord, PerformanceQuery, PerformanceRecord},
  profile::{NewProfile, ProfileUpdate, StudentProfile},
  store::StudentStore,
};

use crate::{
  Error, Result,
  encode::{
    MENTOR_COLUMNS, MESSAGE_COLUMNS, PROFILE_COLUMNS, RECORD_COLUMNS,
    RESOURCE_COLUMNS, RawMentor, RawMessage, RawProfile, RawRecord,
    RawResource, encode_dt, encode_metadata, encode_uuid,
  },
  schema::SCHEMA,
};

/// Passed as `LIMIT` when the caller wants every row.
const NO_LIMIT: i64 = -1;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Compass store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn profile_exists(&self, student_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(student_id);
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM profiles WHERE student_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn get_mentor(&self, mentor_id: Uuid) -> Result<Option<Mentor>> {
    let id_str = encode_uuid(mentor_id);
    let raw: Option<RawMentor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MENTOR_COLUMNS} FROM mentors WHERE mentor_id = ?1"),
              rusqlite::params![id_str],
              RawMentor::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawMentor::into_mentor).transpose()
  }

  async fn get_resource(&self, resource_id: Uuid) -> Result<Option<SupportResource>> {
    let id_str = encode_uuid(resource_id);
    let raw: Option<RawResource> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RESOURCE_COLUMNS} FROM support_resources WHERE resource_id = ?1"
              ),
              rusqlite::params![id_str],
              RawResource::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawResource::into_resource).transpose()
  }

  /// Set `available` on one row of `table`; returns the number of rows hit.
  async fn set_available(
    &self,
    table: &'static str,
    id_column: &'static str,
    id: Uuid,
    available: bool,
  ) -> Result<usize> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("UPDATE {table} SET available = ?1 WHERE {id_column} = ?2"),
          rusqlite::params![available, id_str],
        )?)
      })
      .await?;
    Ok(changed)
  }
}

/// `LIMIT` value for a caller-supplied cap; saturates instead of wrapping
/// into SQLite's negative "no limit".
fn sql_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

fn directory_params(query: &DirectoryQuery) -> (Option<String>, Option<String>, bool, i64) {
  (
    query.municipality.clone(),
    query.location.clone(),
    query.available_only,
    query.limit.map_or(NO_LIMIT, sql_limit),
  )
}

/// Shared `WHERE` clause for directory lookups; parameters are
/// `?1` municipality, `?2` location, `?3` available-only, `?4` limit.
const DIRECTORY_FILTER: &str = "WHERE (?1 IS NULL OR municipality = ?1 COLLATE NOCASE)
     AND (?2 IS NULL OR location = ?2 COLLATE NOCASE)
     AND (?3 = 0 OR available = 1)
   ORDER BY name COLLATE NOCASE, created_at
   LIMIT ?4";

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn create_profile(&self, input: NewProfile) -> Result<StudentProfile> {
    input.validate()?;

    let now = Utc::now();
    let profile = StudentProfile {
      student_id:   input.student_id,
      full_name:    input.full_name,
      location:     input.location,
      municipality: input.municipality,
      grade:        input.grade,
      school:       input.school,
      created_at:   now,
      updated_at:   now,
    };

    let id_str       = encode_uuid(profile.student_id);
    let full_name    = profile.full_name.clone();
    let location     = profile.location.clone();
    let municipality = profile.municipality.clone();
    let grade        = profile.grade;
    let school       = profile.school.clone();
    let at_str       = encode_dt(now);

    // Existence check and insert are one statement, so concurrent creates
    // for the same identity cannot both succeed.
    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO profiles (
             student_id, full_name, location, municipality, grade, school,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
           ON CONFLICT(student_id) DO NOTHING",
          rusqlite::params![id_str, full_name, location, municipality, grade, school, at_str],
        )?)
      })
      .await?;
    if inserted == 0 {
      return Err(compass_core::Error::ProfileExists(profile.student_id).into());
    }

    Ok(profile)
  }

  async fn get_profile(&self, student_id: Uuid) -> Result<Option<StudentProfile>> {
    let id_str = encode_uuid(student_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE student_id = ?1"),
              rusqlite::params![id_str],
              RawProfile::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn update_profile(
    &self,
    student_id: Uuid,
    update:     ProfileUpdate,
  ) -> Result<StudentProfile> {
    let mut profile = self
      .get_profile(student_id)
      .await?
      .ok_or(compass_core::Error::ProfileNotFound(student_id))?;

    update.apply(&mut profile)?;
    profile.updated_at = Utc::now();

    let id_str       = encode_uuid(student_id);
    let full_name    = profile.full_name.clone();
    let location     = profile.location.clone();
    let municipality = profile.municipality.clone();
    let grade        = profile.grade;
    let school       = profile.school.clone();
    let at_str       = encode_dt(profile.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE profiles
             SET full_name = ?2, location = ?3, municipality = ?4,
                 grade = ?5, school = ?6, updated_at = ?7
           WHERE student_id = ?1",
          rusqlite::params![id_str, full_name, location, municipality, grade, school, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn list_profiles(&self) -> Result<Vec<StudentProfile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY full_name COLLATE NOCASE"
        ))?;
        let rows = stmt
          .query_map([], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  // ── Performance ledger ────────────────────────────────────────────────────

  async fn record_performance(
    &self,
    input: NewPerformanceRecord,
  ) -> Result<PerformanceRecord> {
    input.validate()?;
    if !self.profile_exists(input.student_id).await? {
      return Err(compass_core::Error::ProfileNotFound(input.student_id).into());
    }

    let record = PerformanceRecord {
      record_id:   Uuid::new_v4(),
      student_id:  input.student_id,
      subject:     input.subject,
      score:       input.score,
      attendance:  input.attendance,
      notes:       input.notes,
      recorded_at: Utc::now(),
    };

    let record_id_str  = encode_uuid(record.record_id);
    let student_id_str = encode_uuid(record.student_id);
    let subject        = record.subject.clone();
    let score          = record.score;
    let attendance     = record.attendance;
    let notes          = record.notes.clone();
    let at_str         = encode_dt(record.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO performance_records (
             record_id, student_id, subject, score, attendance, notes, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            record_id_str,
            student_id_str,
            subject,
            score,
            attendance,
            notes,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn recent_performance(
    &self,
    student_id: Uuid,
    query:      &PerformanceQuery,
  ) -> Result<Vec<PerformanceRecord>> {
    let id_str  = encode_uuid(student_id);
    let subject = query.subject.clone();
    let limit   = query.limit.map_or(NO_LIMIT, sql_limit);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM performance_records
           WHERE student_id = ?1
             AND (?2 IS NULL OR subject = ?2 COLLATE NOCASE)
           ORDER BY recorded_at DESC, rowid DESC
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, subject, limit], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn performance_trend(
    &self,
    student_id: Uuid,
    subject:    &str,
  ) -> Result<Vec<PerformanceRecord>> {
    let id_str  = encode_uuid(student_id);
    let subject = subject.to_owned();

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM performance_records
           WHERE student_id = ?1 AND subject = ?2 COLLATE NOCASE
           ORDER BY recorded_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, subject], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  async fn add_mentor(&self, input: NewMentor) -> Result<Mentor> {
    input.validate()?;

    let mentor = Mentor {
      mentor_id:    Uuid::new_v4(),
      name:         input.name,
      expertise:    input.expertise,
      location:     input.location,
      municipality: input.municipality,
      contact:      input.contact,
      available:    input.available,
      created_at:   Utc::now(),
    };

    let id_str       = encode_uuid(mentor.mentor_id);
    let name         = mentor.name.clone();
    let expertise    = mentor.expertise.clone();
    let location     = mentor.location.clone();
    let municipality = mentor.municipality.clone();
    let contact      = mentor.contact.clone();
    let available    = mentor.available;
    let at_str       = encode_dt(mentor.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO mentors ({MENTOR_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
          ),
          rusqlite::params![
            id_str,
            name,
            expertise,
            location,
            municipality,
            contact,
            available,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(mentor)
  }

  async fn find_mentors(&self, query: &DirectoryQuery) -> Result<Vec<Mentor>> {
    let (municipality, location, available_only, limit) = directory_params(query);

    let raws: Vec<RawMentor> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MENTOR_COLUMNS} FROM mentors {DIRECTORY_FILTER}"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![municipality, location, available_only, limit],
            RawMentor::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMentor::into_mentor).collect()
  }

  async fn set_mentor_availability(&self, mentor_id: Uuid, available: bool) -> Result<Mentor> {
    let changed = self.set_available("mentors", "mentor_id", mentor_id, available).await?;
    if changed == 0 {
      return Err(compass_core::Error::MentorNotFound(mentor_id).into());
    }
    self
      .get_mentor(mentor_id)
      .await?
      .ok_or_else(|| compass_core::Error::MentorNotFound(mentor_id).into())
  }

  async fn add_resource(&self, input: NewSupportResource) -> Result<SupportResource> {
    input.validate()?;

    let resource = SupportResource {
      resource_id:  Uuid::new_v4(),
      name:         input.name,
      category:     input.category,
      description:  input.description,
      location:     input.location,
      municipality: input.municipality,
      contact:      input.contact,
      available:    input.available,
      created_at:   Utc::now(),
    };

    let id_str       = encode_uuid(resource.resource_id);
    let name         = resource.name.clone();
    let category     = resource.category.clone();
    let description  = resource.description.clone();
    let location     = resource.location.clone();
    let municipality = resource.municipality.clone();
    let contact      = resource.contact.clone();
    let available    = resource.available;
    let at_str       = encode_dt(resource.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO support_resources ({RESOURCE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
          ),
          rusqlite::params![
            id_str,
            name,
            category,
            description,
            location,
            municipality,
            contact,
            available,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(resource)
  }

  async fn find_resources(&self, query: &DirectoryQuery) -> Result<Vec<SupportResource>> {
    let (municipality, location, available_only, limit) = directory_params(query);

    let raws: Vec<RawResource> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RESOURCE_COLUMNS} FROM support_resources {DIRECTORY_FILTER}"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![municipality, location, available_only, limit],
            RawResource::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResource::into_resource).collect()
  }

  async fn set_resource_availability(
    &self,
    resource_id: Uuid,
    available:   bool,
  ) -> Result<SupportResource> {
    let changed = self
      .set_available("support_resources", "resource_id", resource_id, available)
      .await?;
    if changed == 0 {
      return Err(compass_core::Error::ResourceNotFound(resource_id).into());
    }
    self
      .get_resource(resource_id)
      .await?
      .ok_or_else(|| compass_core::Error::ResourceNotFound(resource_id).into())
  }

  // ── Conversation log ──────────────────────────────────────────────────────

  async fn append_message(&self, input: NewChatMessage) -> Result<ChatMessage> {
    let message = ChatMessage {
      message_id: input.message_id.unwrap_or_else(Uuid::new_v4),
      student_id: input.student_id,
      role:       input.role,
      content:    input.content,
      metadata:   input.metadata,
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(message.message_id);
    let student_str  = message.student_id.map(encode_uuid);
    let role_str     = message.role.as_str();
    let content      = message.content.clone();
    let metadata_str = encode_metadata(message.metadata.as_ref())?;
    let at_str       = encode_dt(message.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO chat_messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
          rusqlite::params![id_str, student_str, role_str, content, metadata_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(message)
  }

  async fn chat_history(&self, student_id: Uuid) -> Result<Vec<ChatMessage>> {
    let id_str = encode_uuid(student_id);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MESSAGE_COLUMNS} FROM chat_messages
           WHERE student_id = ?1
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }
}
