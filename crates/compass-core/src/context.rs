//! Context assembler: renders a student's profile, recent scores and local
//! support options into the text block injected into AI prompts.
//!
//! Rendering ([`render_context`]) is separate from fetching
//! ([`assemble_context`]) so the template can be checked without a store.
//! Nothing is cached; every call reads the store afresh.

use std::fmt::Write as _;

use uuid::Uuid;

use crate::{
  directory::{DirectoryQuery, Mentor, SupportResource},
  performance::{PerformanceQuery, PerformanceRecord},
  profile::StudentProfile,
  store::StudentStore,
};

/// Number of performance records included in the context.
pub const RECENT_RECORDS: usize = 5;

/// Maximum number of mentors included in the context.
pub const MAX_MENTORS: usize = 3;

pub const NO_RECORDS: &str = "No recent records";
pub const NO_MENTORS: &str = "No mentors available";
pub const NO_RESOURCES: &str = "No resources available";

const UNKNOWN: &str = "Unknown";
const NOT_SPECIFIED: &str = "Not specified";

/// Mentors and resources local to a student.
#[derive(Debug, Clone, Default)]
pub struct LocalDirectory {
  /// The municipality the lookup was made for.
  pub region:    String,
  pub mentors:   Vec<Mentor>,
  pub resources: Vec<SupportResource>,
}

/// Everything needed to render a context block.
#[derive(Debug, Clone, Default)]
pub struct StudentContext {
  pub profile:   Option<StudentProfile>,
  /// Newest first.
  pub recent:    Vec<PerformanceRecord>,
  pub directory: LocalDirectory,
}

/// The municipality used for directory matching: the profile's, or
/// `default_region` when it is unset.
pub fn region_for(profile: Option<&StudentProfile>, default_region: &str) -> String {
  profile
    .and_then(|p| p.municipality.clone())
    .unwrap_or_else(|| default_region.to_owned())
}

/// Fetch up to [`MAX_MENTORS`] available mentors and all available
/// resources in the student's region.
pub async fn local_directory<S: StudentStore>(
  store: &S,
  profile: Option<&StudentProfile>,
  default_region: &str,
) -> Result<LocalDirectory, S::Error> {
  let region = region_for(profile, default_region);

  let mentors = store
    .find_mentors(&DirectoryQuery::available_in(region.clone(), Some(MAX_MENTORS)))
    .await?;
  let resources = store
    .find_resources(&DirectoryQuery::available_in(region.clone(), None))
    .await?;

  Ok(LocalDirectory { region, mentors, resources })
}

/// Fetch everything the context block needs for `student_id`.
///
/// A missing profile is not an error; only store failures are.
pub async fn gather_context<S: StudentStore>(
  store: &S,
  student_id: Uuid,
  default_region: &str,
) -> Result<StudentContext, S::Error> {
  let profile = store.get_profile(student_id).await?;

  let query = PerformanceQuery { subject: None, limit: Some(RECENT_RECORDS) };
  let recent = store.recent_performance(student_id, &query).await?;

  let directory = local_directory(store, profile.as_ref(), default_region).await?;

  Ok(StudentContext { profile, recent, directory })
}

/// Fetch and render in one step.
pub async fn assemble_context<S: StudentStore>(
  store: &S,
  student_id: Uuid,
  default_region: &str,
) -> Result<String, S::Error> {
  let ctx = gather_context(store, student_id, default_region).await?;
  Ok(render_context(&ctx))
}

/// Render the fixed multi-line template.
pub fn render_context(ctx: &StudentContext) -> String {
  let mut out = String::new();

  out.push_str("Student Profile:\n");
  match &ctx.profile {
    Some(p) => {
      let _ = writeln!(out, "- Name: {}", p.full_name);
      let _ = writeln!(out, "- Location: {}", or_not_specified(Some(&p.location)));
      let _ = writeln!(out, "- Municipality: {}", or_not_specified(p.municipality.as_deref()));
      let grade = p.grade.map(|g| g.to_string());
      let _ = writeln!(out, "- Grade: {}", or_not_specified(grade.as_deref()));
      let _ = writeln!(out, "- School: {}", or_not_specified(p.school.as_deref()));
    }
    None => {
      for field in ["Name", "Location", "Municipality", "Grade", "School"] {
        let _ = writeln!(out, "- {field}: {UNKNOWN}");
      }
    }
  }

  out.push_str("\nRecent Performance:\n");
  if ctx.recent.is_empty() {
    let _ = writeln!(out, "{NO_RECORDS}");
  }
  for r in &ctx.recent {
    let _ = writeln!(out, "- {}", format_record(r));
  }

  out.push_str("\nAvailable Local Mentors:\n");
  render_mentors(&mut out, &ctx.directory.mentors);

  out.push_str("\nSupport Resources:\n");
  render_resources(&mut out, &ctx.directory.resources);

  out
}

/// `"{subject}: {score}% (Attendance: {attendance or N/A}%)"`
pub fn format_record(r: &PerformanceRecord) -> String {
  let attendance = r
    .attendance
    .map(|a| a.to_string())
    .unwrap_or_else(|| "N/A".to_owned());
  format!("{}: {}% (Attendance: {attendance}%)", r.subject, r.score)
}

pub(crate) fn render_mentors(out: &mut String, mentors: &[Mentor]) {
  if mentors.is_empty() {
    let _ = writeln!(out, "{NO_MENTORS}");
  }
  for m in mentors {
    let _ = writeln!(out, "- {} ({}) - Contact: {}", m.name, m.expertise, m.contact);
  }
}

pub(crate) fn render_resources(out: &mut String, resources: &[SupportResource]) {
  if resources.is_empty() {
    let _ = writeln!(out, "{NO_RESOURCES}");
  }
  for r in resources {
    let _ = writeln!(out, "- {} ({}) - Contact: {}", r.name, r.category, r.contact);
  }
}

fn or_not_specified(value: Option<&str>) -> &str {
  match value {
    Some(v) if !v.trim().is_empty() => v,
    _ => NOT_SPECIFIED,
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn record(subject: &str, score: f64, attendance: Option<f64>) -> PerformanceRecord {
    PerformanceRecord {
      record_id:   Uuid::new_v4(),
      student_id:  Uuid::new_v4(),
      subject:     subject.into(),
      score,
      attendance,
      notes:       None,
      recorded_at: Utc::now(),
    }
  }

  #[test]
  fn empty_context_uses_placeholders() {
    let text = render_context(&StudentContext::default());
    assert!(text.contains("- Name: Unknown"));
    assert!(text.contains("Recent Performance:\nNo recent records\n"));
    assert!(text.contains("Available Local Mentors:\nNo mentors available\n"));
    assert!(text.contains("Support Resources:\nNo resources available\n"));
  }

  #[test]
  fn record_line_format() {
    assert_eq!(
      format_record(&record("Mathematics", 45.0, Some(92.5))),
      "Mathematics: 45% (Attendance: 92.5%)"
    );
    assert_eq!(
      format_record(&record("History", 71.5, None)),
      "History: 71.5% (Attendance: N/A%)"
    );
  }

  #[test]
  fn profile_block_marks_unset_fields() {
    let now = Utc::now();
    let ctx = StudentContext {
      profile: Some(StudentProfile {
        student_id:   Uuid::new_v4(),
        full_name:    "Sipho Dlamini".into(),
        location:     "Mankweng".into(),
        municipality: None,
        grade:        Some(11),
        school:       None,
        created_at:   now,
        updated_at:   now,
      }),
      recent: vec![record("Physics", 60.0, None)],
      directory: LocalDirectory::default(),
    };

    let text = render_context(&ctx);
    assert!(text.starts_with("Student Profile:\n- Name: Sipho Dlamini\n"));
    assert!(text.contains("- Municipality: Not specified"));
    assert!(text.contains("- Grade: 11"));
    assert!(text.contains("- Physics: 60% (Attendance: N/A%)"));
    assert!(!text.contains(NO_RECORDS));
  }

  #[test]
  fn region_falls_back_to_default() {
    assert_eq!(region_for(None, "Central"), "Central");
  }
}
