//! Prompt templates for the AI counselor.

use crate::{
  context::{LocalDirectory, render_mentors, render_resources},
  intervention::Situation,
};

/// System prompt for direct conversational chat.
pub const COUNSELOR_PROMPT: &str = "You are a warm, empathetic student counselor. \
Listen carefully, acknowledge the student's feelings, and offer practical, \
encouraging advice about school, study habits and wellbeing. Keep replies \
concise and supportive. If the student mentions being in danger or harming \
themselves, urge them to contact a trusted adult or a local helpline \
immediately.";

/// The counselor prompt enriched with a rendered student context block.
pub fn counselor_prompt_with_context(context: &str) -> String {
  format!(
    "{COUNSELOR_PROMPT}\n\nUse the following information about the student \
     to personalise your advice. Refer to local mentors and resources by name \
     when they are relevant.\n\n{context}"
  )
}

/// A grade event that triggered an intervention.
#[derive(Debug, Clone, Copy)]
pub struct GradeEvent<'a> {
  pub subject:        &'a str,
  pub new_score:      f64,
  pub previous_score: Option<f64>,
  pub situation:      Situation,
}

/// System prompt for an automated performance-intervention message.
pub fn intervention_prompt(
  event: &GradeEvent<'_>,
  student_name: Option<&str>,
  directory: &LocalDirectory,
) -> String {
  let name = student_name.unwrap_or("the student");
  let previous = match event.previous_score {
    Some(p) => format!("{p}%"),
    None => "none on record".to_owned(),
  };

  let mut mentors = String::new();
  render_mentors(&mut mentors, &directory.mentors);
  let mut resources = String::new();
  render_resources(&mut resources, &directory.resources);

  format!(
    "You are a caring student counselor reaching out proactively to {name}.\n\
     Situation: {label}\n\
     Subject: {subject}\n\
     New grade: {new}%\n\
     Previous grade: {previous}\n\
     Region: {region}\n\n\
     Available Local Mentors:\n{mentors}\n\
     Support Resources:\n{resources}\n\
     Write a short, encouraging message that acknowledges the result without \
     judgement, suggests two or three concrete next steps, and points to the \
     most relevant mentor or resource above if any are listed.",
    label = event.situation.label(),
    subject = event.subject,
    new = event.new_score,
    region = directory.region,
  )
}

/// The single synthetic user turn sent alongside [`intervention_prompt`].
pub fn grade_event_turn(event: &GradeEvent<'_>) -> String {
  match event.previous_score {
    Some(p) => format!(
      "I just received {}% in {}. My previous grade was {p}%.",
      event.new_score, event.subject
    ),
    None => format!("I just received {}% in {}.", event.new_score, event.subject),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn intervention_prompt_embeds_label_and_placeholders() {
    let event = GradeEvent {
      subject:        "Mathematics",
      new_score:      45.0,
      previous_score: None,
      situation:      Situation::FirstLowGrade,
    };
    let dir = LocalDirectory { region: "Central".into(), ..Default::default() };
    let text = intervention_prompt(&event, Some("Lerato"), &dir);

    assert!(text.contains("Situation: First Low Grade"));
    assert!(text.contains("New grade: 45%"));
    assert!(text.contains("Previous grade: none on record"));
    assert!(text.contains("No mentors available"));
    assert!(text.contains("No resources available"));
    assert!(text.contains("Lerato"));
  }

  #[test]
  fn grade_event_turn_mentions_previous() {
    let event = GradeEvent {
      subject:        "Science",
      new_score:      70.0,
      previous_score: Some(85.0),
      situation:      Situation::GradeDrop,
    };
    assert_eq!(
      grade_event_turn(&event),
      "I just received 70% in Science. My previous grade was 85%."
    );
  }

  #[test]
  fn context_is_appended_to_counselor_prompt() {
    let p = counselor_prompt_with_context("Student Profile:\n- Name: X");
    assert!(p.starts_with(COUNSELOR_PROMPT));
    assert!(p.ends_with("- Name: X"));
  }
}
