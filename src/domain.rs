//! Domain models: challenges (multiple-choice and subjective), their notes and
//! recorded model outputs, and the keyed field accessor every variant answers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{next_stamp, Clock};
use crate::error::{UnknownFieldError, ValidationError};

/// Option label -> option text. Labels are single letters, so key order is
/// label order (A, B, C, ...).
pub type Options = BTreeMap<String, String>;

/// Discriminant of a challenge. Never changes after creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
  #[default]
  MultipleChoice,
  Subjective,
}

impl ChallengeType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ChallengeType::MultipleChoice => "multiple_choice",
      ChallengeType::Subjective => "subjective",
    }
  }

  /// Name of the concrete variant, used in error messages.
  pub fn variant_name(&self) -> &'static str {
    match self {
      ChallengeType::MultipleChoice => "MultipleChoiceChallenge",
      ChallengeType::Subjective => "SubjectiveChallenge",
    }
  }
}

impl fmt::Display for ChallengeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Accepts both the wire tag and the form label ("Multiple Choice").
impl FromStr for ChallengeType {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "multiple_choice" | "Multiple Choice" => Ok(ChallengeType::MultipleChoice),
      "subjective" | "Subjective" => Ok(ChallengeType::Subjective),
      other => Err(ValidationError::UnknownChallengeType { value: other.to_string() }),
    }
  }
}

/// A grader's note attached to a challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
  pub username: String,
  pub content: String,
  pub created_on: DateTime<Utc>,
}

/// A model response recorded against a challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutput {
  pub text: String,
  pub created_on: DateTime<Utc>,
  pub submitted_by: String,
  pub model_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoice {
  pub question: String,
  pub options: Options,
  pub correct_answer: String,
  pub explanation: String,
}

impl MultipleChoice {
  /// At least one option, and the correct answer is one of its labels.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.options.is_empty() {
      return Err(ValidationError::missing("options"));
    }
    if !self.options.contains_key(&self.correct_answer) {
      return Err(ValidationError::UnknownCorrectAnswer { answer: self.correct_answer.clone() });
    }
    Ok(())
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subjective {
  pub prompt: String,
  pub summary: String,
  pub evaluation_criteria: String,
}

/// Variant-specific part of a challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "challenge_type", rename_all = "snake_case")]
pub enum ChallengeBody {
  MultipleChoice(MultipleChoice),
  Subjective(Subjective),
}

impl ChallengeBody {
  pub fn validate(&self) -> Result<(), ValidationError> {
    match self {
      ChallengeBody::MultipleChoice(mc) => mc.validate(),
      ChallengeBody::Subjective(_) => Ok(()),
    }
  }

  pub fn challenge_type(&self) -> ChallengeType {
    match self {
      ChallengeBody::MultipleChoice(_) => ChallengeType::MultipleChoice,
      ChallengeBody::Subjective(_) => ChallengeType::Subjective,
    }
  }
}

/// Value returned by the keyed accessor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
  Text(String),
  Options(Options),
}

impl FieldValue {
  pub fn as_text(&self) -> Option<&str> {
    match self {
      FieldValue::Text(s) => Some(s),
      FieldValue::Options(_) => None,
    }
  }

  pub fn as_options(&self) -> Option<&Options> {
    match self {
      FieldValue::Options(o) => Some(o),
      FieldValue::Text(_) => None,
    }
  }
}

impl From<&str> for FieldValue {
  fn from(s: &str) -> Self { FieldValue::Text(s.to_string()) }
}

/// Keys every multiple-choice challenge answers.
pub const MULTIPLE_CHOICE_KEYS: &[&str] =
  &["title", "question", "options", "correct_answer", "explanation", "challenge_type"];
/// Keys every subjective challenge answers.
pub const SUBJECTIVE_KEYS: &[&str] =
  &["title", "prompt", "summary", "evaluation_criteria", "challenge_type"];

/// A challenge in the collection.
///
/// Every way in (constructors, deserialization, a committed draft) checks the
/// variant invariants, so a stored multiple-choice challenge always has an
/// option matching its correct answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChallengeRecord")]
pub struct Challenge {
  title: String,
  #[serde(flatten)]
  body: ChallengeBody,
  #[serde(default)]
  notes: Vec<Note>,
  #[serde(default)]
  model_outputs: Vec<ModelOutput>,
}

/// Unchecked wire shape of a `Challenge`.
#[derive(Deserialize)]
struct ChallengeRecord {
  title: String,
  #[serde(flatten)]
  body: ChallengeBody,
  #[serde(default)]
  notes: Vec<Note>,
  #[serde(default)]
  model_outputs: Vec<ModelOutput>,
}

impl TryFrom<ChallengeRecord> for Challenge {
  type Error = ValidationError;

  fn try_from(r: ChallengeRecord) -> Result<Self, Self::Error> {
    r.body.validate()?;
    Ok(Self { title: r.title, body: r.body, notes: r.notes, model_outputs: r.model_outputs })
  }
}

impl Challenge {
  pub fn multiple_choice(
    title: impl Into<String>,
    question: impl Into<String>,
    options: Options,
    correct_answer: impl Into<String>,
    explanation: impl Into<String>,
  ) -> Result<Self, ValidationError> {
    let mc = MultipleChoice {
      question: question.into(),
      options,
      correct_answer: correct_answer.into(),
      explanation: explanation.into(),
    };
    mc.validate()?;
    Ok(Self::from_body(title.into(), ChallengeBody::MultipleChoice(mc)))
  }

  pub fn subjective(
    title: impl Into<String>,
    prompt: impl Into<String>,
    summary: impl Into<String>,
    evaluation_criteria: impl Into<String>,
  ) -> Self {
    Self::from_body(
      title.into(),
      ChallengeBody::Subjective(Subjective {
        prompt: prompt.into(),
        summary: summary.into(),
        evaluation_criteria: evaluation_criteria.into(),
      }),
    )
  }

  /// Callers have validated `body` already.
  pub(crate) fn from_body(title: String, body: ChallengeBody) -> Self {
    Self { title, body, notes: Vec::new(), model_outputs: Vec::new() }
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn challenge_type(&self) -> ChallengeType {
    self.body.challenge_type()
  }

  pub fn body(&self) -> &ChallengeBody {
    &self.body
  }

  pub fn notes(&self) -> &[Note] {
    &self.notes
  }

  pub fn model_outputs(&self) -> &[ModelOutput] {
    &self.model_outputs
  }

  /// Polymorphic field lookup. Unsupported keys are an error, never a default.
  pub fn get_field(&self, key: &str) -> Result<FieldValue, UnknownFieldError> {
    let text = |s: &str| -> Result<FieldValue, UnknownFieldError> { Ok(FieldValue::Text(s.to_string())) };
    match (key, &self.body) {
      ("title", _) => text(&self.title),
      ("challenge_type", b) => text(b.challenge_type().as_str()),
      ("question", ChallengeBody::MultipleChoice(mc)) => text(&mc.question),
      ("options", ChallengeBody::MultipleChoice(mc)) => Ok(FieldValue::Options(mc.options.clone())),
      ("correct_answer", ChallengeBody::MultipleChoice(mc)) => text(&mc.correct_answer),
      ("explanation", ChallengeBody::MultipleChoice(mc)) => text(&mc.explanation),
      ("prompt", ChallengeBody::Subjective(s)) => text(&s.prompt),
      ("summary", ChallengeBody::Subjective(s)) => text(&s.summary),
      ("evaluation_criteria", ChallengeBody::Subjective(s)) => text(&s.evaluation_criteria),
      (other, b) => Err(UnknownFieldError::new(other, b.challenge_type().variant_name())),
    }
  }

  /// Keys `get_field` accepts for this challenge's variant.
  pub fn field_keys(&self) -> &'static [&'static str] {
    match self.challenge_type() {
      ChallengeType::MultipleChoice => MULTIPLE_CHOICE_KEYS,
      ChallengeType::Subjective => SUBJECTIVE_KEYS,
    }
  }

  pub fn add_note(&mut self, clock: &dyn Clock, username: &str, content: &str) {
    let last = self.notes.last().map(|n| n.created_on);
    self.notes.push(Note {
      username: username.to_string(),
      content: content.to_string(),
      created_on: next_stamp(last, clock.now()),
    });
  }

  pub fn add_model_output(&mut self, clock: &dyn Clock, text: &str, submitted_by: &str, model_name: &str) {
    let last = self.model_outputs.last().map(|o| o.created_on);
    self.model_outputs.push(ModelOutput {
      text: text.to_string(),
      created_on: next_stamp(last, clock.now()),
      submitted_by: submitted_by.to_string(),
      model_name: model_name.to_string(),
    });
  }

  /// Whole-record replace of title and variant fields. The discriminant must
  /// match; notes and model outputs are kept.
  pub(crate) fn replace(&mut self, title: String, body: ChallengeBody) -> Result<(), ValidationError> {
    if body.challenge_type() != self.challenge_type() {
      return Err(ValidationError::ImmutableField { field: "challenge_type".into() });
    }
    self.title = title;
    self.body = body;
    Ok(())
  }
}
