//! Performance ledger entries.
//!
//! Records are append-only: once written a score is never updated or
//! deleted. Reads come back newest-first for display and oldest-first for
//! trend comparison.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A single recorded score for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
  pub record_id:   Uuid,
  pub student_id:  Uuid,
  /// Free-text subject label; there is no canonical subject list.
  pub subject:     String,
  /// Expected in `0..=100` but deliberately not clamped.
  pub score:       f64,
  /// Attendance percentage, if known.
  pub attendance:  Option<f64>,
  pub notes:       Option<String>,
  pub recorded_at: DateTime<Utc>,
}

/// Input to [`StudentStore::record_performance`](crate::store::StudentStore::record_performance).
/// `record_id` and `recorded_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPerformanceRecord {
  pub student_id: Uuid,
  pub subject:    String,
  pub score:      f64,
  pub attendance: Option<f64>,
  pub notes:      Option<String>,
}

impl NewPerformanceRecord {
  pub fn new(student_id: Uuid, subject: impl Into<String>, score: f64) -> Self {
    Self {
      student_id,
      subject: subject.into(),
      score,
      attendance: None,
      notes: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.subject.trim().is_empty() {
      return Err(Error::Validation("subject must not be empty".into()));
    }
    if !self.score.is_finite() {
      return Err(Error::Validation("score must be a finite number".into()));
    }
    if self.attendance.is_some_and(|a| !a.is_finite()) {
      return Err(Error::Validation("attendance must be a finite number".into()));
    }
    Ok(())
  }
}

/// Filter for ledger reads.
#[derive(Debug, Clone, Default)]
pub struct PerformanceQuery {
  /// Exact subject match (case-insensitive).
  pub subject: Option<String>,
  pub limit:   Option<usize>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_blank_subject_and_nan() {
    let id = Uuid::new_v4();
    assert!(NewPerformanceRecord::new(id, "", 50.0).validate().is_err());
    assert!(NewPerformanceRecord::new(id, "Maths", f64::NAN).validate().is_err());

    let mut rec = NewPerformanceRecord::new(id, "Maths", 50.0);
    rec.attendance = Some(f64::INFINITY);
    assert!(rec.validate().is_err());
  }

  #[test]
  fn out_of_range_scores_are_not_clamped() {
    let rec = NewPerformanceRecord::new(Uuid::new_v4(), "Maths", 120.0);
    assert!(rec.validate().is_ok());
    assert_eq!(rec.score, 120.0);
  }
}
