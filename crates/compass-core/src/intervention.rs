//! Intervention evaluator: decides whether a newly recorded score warrants
//! an automated counseling message.
//!
//! [`evaluate`] is a pure function. It performs no I/O and has no side
//! effects; the caller decides what to do with the [`Evaluation`].

use serde::Serialize;

/// Scores strictly below this are "low".
pub const LOW_SCORE_THRESHOLD: f64 = 50.0;

/// A fall of strictly more than this many points from the previous score is
/// a "drop".
pub const DROP_THRESHOLD: f64 = 10.0;

/// Reason reported when no intervention fires.
pub const SATISFACTORY_REASON: &str = "Grades satisfactory";

/// Why an intervention fired. Used as a label inside the intervention prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Situation {
  /// Low score with no previous score for the subject.
  FirstLowGrade,
  /// Low score with a previous score on record. Takes precedence over a
  /// drop.
  LowGrade,
  /// Score is not low but fell by more than [`DROP_THRESHOLD`].
  GradeDrop,
}

impl Situation {
  pub fn label(self) -> &'static str {
    match self {
      Situation::FirstLowGrade => "First Low Grade",
      Situation::LowGrade => "Low Grade",
      Situation::GradeDrop => "Grade Drop",
    }
  }
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
  /// No action. The AI gateway must not be called.
  Satisfactory,
  Intervene(Situation),
}

impl Evaluation {
  pub fn trigger(&self) -> bool { matches!(self, Self::Intervene(_)) }

  /// Human-readable reason: the situation label, or
  /// [`SATISFACTORY_REASON`].
  pub fn reason(&self) -> &'static str {
    match self {
      Evaluation::Satisfactory => SATISFACTORY_REASON,
      Evaluation::Intervene(s) => s.label(),
    }
  }
}

/// Evaluate a new score against the previous score for the same subject.
pub fn evaluate(new_score: f64, previous_score: Option<f64>) -> Evaluation {
  let is_low = new_score < LOW_SCORE_THRESHOLD;
  let dropped =
    previous_score.is_some_and(|prev| new_score < prev - DROP_THRESHOLD);

  match (is_low, dropped, previous_score) {
    (false, false, _) => Evaluation::Satisfactory,
    (true, _, None) => Evaluation::Intervene(Situation::FirstLowGrade),
    (true, _, Some(_)) => Evaluation::Intervene(Situation::LowGrade),
    (false, true, _) => Evaluation::Intervene(Situation::GradeDrop),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_low_grade() {
    let e = evaluate(45.0, None);
    assert!(e.trigger());
    assert_eq!(e, Evaluation::Intervene(Situation::FirstLowGrade));
    assert_eq!(e.reason(), "First Low Grade");
  }

  #[test]
  fn low_grade_wins_over_drop() {
    assert_eq!(
      evaluate(40.0, Some(60.0)),
      Evaluation::Intervene(Situation::LowGrade)
    );
  }

  #[test]
  fn grade_drop() {
    let e = evaluate(70.0, Some(85.0));
    assert_eq!(e, Evaluation::Intervene(Situation::GradeDrop));
    assert_eq!(e.reason(), "Grade Drop");
  }

  #[test]
  fn small_dip_is_satisfactory() {
    let e = evaluate(78.0, Some(80.0));
    assert!(!e.trigger());
    assert_eq!(e.reason(), "Grades satisfactory");
  }

  #[test]
  fn boundaries_are_strict() {
    // Exactly 50 is not low; a drop of exactly 10 is not a drop.
    assert_eq!(evaluate(50.0, None), Evaluation::Satisfactory);
    assert_eq!(evaluate(60.0, Some(70.0)), Evaluation::Satisfactory);
    assert_eq!(
      evaluate(59.5, Some(70.0)),
      Evaluation::Intervene(Situation::GradeDrop)
    );
    assert!(evaluate(49.9, Some(49.9)).trigger());
  }

  #[test]
  fn low_scores_always_trigger() {
    for new in [0.0, 10.0, 25.5, 49.0, 49.99] {
      for prev in [None, Some(0.0), Some(new), Some(30.0), Some(100.0)] {
        assert!(evaluate(new, prev).trigger(), "new={new} prev={prev:?}");
      }
    }
  }

  #[test]
  fn passing_without_large_drop_never_triggers() {
    for new in [50.0, 62.0, 75.0, 100.0] {
      assert!(!evaluate(new, None).trigger());
      for delta in [-20.0, -5.0, 0.0, 5.0, 10.0] {
        let prev = new + delta;
        assert!(!evaluate(new, Some(prev)).trigger(), "new={new} prev={prev}");
      }
    }
  }

  #[test]
  fn passing_with_large_drop_is_grade_drop() {
    for (new, prev) in [(50.0, 61.0), (70.0, 90.0), (89.0, 100.0)] {
      assert_eq!(
        evaluate(new, Some(prev)),
        Evaluation::Intervene(Situation::GradeDrop)
      );
    }
  }
}
