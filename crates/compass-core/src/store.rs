//! The `StudentStore` trait.
//!
//! One trait covers the four collaborating stores (profiles, performance
//! ledger, mentor/resource directory, conversation log). It is implemented
//! by storage backends (e.g. `compass-store-sqlite`); the context assembler
//! and the HTTP layer depend only on this abstraction.

use std::future::Future;

use uuid::Uuid;

use crate::{
  conversation::{ChatMessage, NewChatMessage},
  directory::{
    DirectoryQuery, Mentor, NewMentor, NewSupportResource, SupportResource,
  },
  performance::{NewPerformanceRecord, PerformanceQuery, PerformanceRecord},
  profile::{NewProfile, ProfileUpdate, StudentProfile},
};

/// Abstraction over a Compass store backend.
///
/// Performance records and chat messages are append-only. The only mutable
/// rows are profiles (owner edits) and directory availability flags.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait StudentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create the profile for an identity. Fails if one already exists.
  fn create_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<StudentProfile, Self::Error>> + Send + '_;

  /// Retrieve a profile. Returns `None` if the identity has none.
  fn get_profile(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Option<StudentProfile>, Self::Error>> + Send + '_;

  /// Apply a partial update and return the stored result.
  fn update_profile(
    &self,
    student_id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<StudentProfile, Self::Error>> + Send + '_;

  /// All profiles, ordered by name.
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<StudentProfile>, Self::Error>> + Send + '_;

  // ── Performance ledger ────────────────────────────────────────────────

  /// Append a performance record. `recorded_at` is set by the store.
  fn record_performance(
    &self,
    input: NewPerformanceRecord,
  ) -> impl Future<Output = Result<PerformanceRecord, Self::Error>> + Send + '_;

  /// Records for a student, newest first.
  fn recent_performance<'a>(
    &'a self,
    student_id: Uuid,
    query: &'a PerformanceQuery,
  ) -> impl Future<Output = Result<Vec<PerformanceRecord>, Self::Error>> + Send + 'a;

  /// Records for one subject, oldest first; the order used for trend
  /// comparison.
  fn performance_trend<'a>(
    &'a self,
    student_id: Uuid,
    subject: &'a str,
  ) -> impl Future<Output = Result<Vec<PerformanceRecord>, Self::Error>> + Send + 'a;

  // ── Directory ─────────────────────────────────────────────────────────

  fn add_mentor(
    &self,
    input: NewMentor,
  ) -> impl Future<Output = Result<Mentor, Self::Error>> + Send + '_;

  fn find_mentors<'a>(
    &'a self,
    query: &'a DirectoryQuery,
  ) -> impl Future<Output = Result<Vec<Mentor>, Self::Error>> + Send + 'a;

  fn set_mentor_availability(
    &self,
    mentor_id: Uuid,
    available: bool,
  ) -> impl Future<Output = Result<Mentor, Self::Error>> + Send + '_;

  fn add_resource(
    &self,
    input: NewSupportResource,
  ) -> impl Future<Output = Result<SupportResource, Self::Error>> + Send + '_;

  fn find_resources<'a>(
    &'a self,
    query: &'a DirectoryQuery,
  ) -> impl Future<Output = Result<Vec<SupportResource>, Self::Error>> + Send + 'a;

  fn set_resource_availability(
    &self,
    resource_id: Uuid,
    available: bool,
  ) -> impl Future<Output = Result<SupportResource, Self::Error>> + Send + '_;

  // ── Conversation log ──────────────────────────────────────────────────

  /// Append one row to the conversation log.
  fn append_message(
    &self,
    input: NewChatMessage,
  ) -> impl Future<Output = Result<ChatMessage, Self::Error>> + Send + '_;

  /// The full log for a student, oldest first.
  fn chat_history(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChatMessage>, Self::Error>> + Send + '_;
}
