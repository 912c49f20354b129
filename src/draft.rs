//! Drafts: uncommitted form values for a challenge being created or edited.
//!
//! A draft never is a `Challenge`. `materialize` is the only way across, and it
//! checks required-field presence plus the correct answer against the options.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Challenge, ChallengeBody, ChallengeType, MultipleChoice, Options, Subjective};
use crate::error::{UnknownFieldError, ValidationError};
use crate::util::option_labels;

/// Key prefix addressing one option slot, e.g. `options.C`.
pub const OPTION_KEY_PREFIX: &str = "options.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "challenge_type", rename_all = "snake_case")]
pub enum DraftBody {
  MultipleChoice {
    question: Option<String>,
    /// One slot per configured label; `None` until the user fills it.
    options: BTreeMap<String, Option<String>>,
    correct_answer: Option<String>,
    explanation: Option<String>,
  },
  Subjective {
    prompt: Option<String>,
    summary: Option<String>,
    evaluation_criteria: Option<String>,
  },
}

impl DraftBody {
  fn blank(ty: ChallengeType, number_options: usize) -> Self {
    match ty {
      ChallengeType::MultipleChoice => DraftBody::MultipleChoice {
        question: None,
        options: option_labels(number_options).into_iter().map(|l| (l, None)).collect(),
        correct_answer: None,
        explanation: None,
      },
      ChallengeType::Subjective => DraftBody::Subjective {
        prompt: None,
        summary: None,
        evaluation_criteria: None,
      },
    }
  }

  fn challenge_type(&self) -> ChallengeType {
    match self {
      DraftBody::MultipleChoice { .. } => ChallengeType::MultipleChoice,
      DraftBody::Subjective { .. } => ChallengeType::Subjective,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Draft {
  pub title: String,
  #[serde(flatten)]
  pub body: DraftBody,
}

impl Draft {
  /// Empty title, no variant field set, `number_options` empty option slots.
  pub fn blank(ty: ChallengeType, number_options: usize) -> Self {
    Self { title: String::new(), body: DraftBody::blank(ty, number_options) }
  }

  /// Draft mirroring `challenge`. Options are copied slot-by-label; a label
  /// with no configured slot is rejected instead of being dropped or shifted.
  pub fn from_challenge(challenge: &Challenge, number_options: usize) -> Result<Self, ValidationError> {
    let body = match challenge.body() {
      ChallengeBody::MultipleChoice(mc) => {
        let mut slots: BTreeMap<String, Option<String>> =
          option_labels(number_options).into_iter().map(|l| (l, None)).collect();
        for (label, text) in &mc.options {
          match slots.get_mut(label) {
            Some(slot) => *slot = Some(text.clone()),
            None => {
              return Err(ValidationError::OptionSlotMismatch { label: label.clone(), slots: number_options })
            }
          }
        }
        DraftBody::MultipleChoice {
          question: Some(mc.question.clone()),
          options: slots,
          correct_answer: Some(mc.correct_answer.clone()),
          explanation: Some(mc.explanation.clone()),
        }
      }
      ChallengeBody::Subjective(s) => DraftBody::Subjective {
        prompt: Some(s.prompt.clone()),
        summary: Some(s.summary.clone()),
        evaluation_criteria: Some(s.evaluation_criteria.clone()),
      },
    };
    Ok(Self { title: challenge.title().to_string(), body })
  }

  pub fn challenge_type(&self) -> ChallengeType {
    self.body.challenge_type()
  }

  /// Switch the declared variant. Variant fields start over; the title stays.
  pub fn switch_type(&mut self, ty: ChallengeType, number_options: usize) {
    self.body = DraftBody::blank(ty, number_options);
  }

  /// Set one form field. `challenge_type` is not a draft field; the session
  /// handles it because whether it may change depends on the mode.
  pub fn set_field(&mut self, key: &str, value: String) -> Result<(), UnknownFieldError> {
    let variant = self.challenge_type().variant_name();
    if key == "title" {
      self.title = value;
      return Ok(());
    }
    let slot = match &mut self.body {
      DraftBody::MultipleChoice { question, options, correct_answer, explanation } => match key {
        "question" => question,
        "correct_answer" => correct_answer,
        "explanation" => explanation,
        other => match other.strip_prefix(OPTION_KEY_PREFIX) {
          Some(label) => options.get_mut(label).ok_or_else(|| UnknownFieldError::new(other, variant))?,
          None => return Err(UnknownFieldError::new(other, variant)),
        },
      },
      DraftBody::Subjective { prompt, summary, evaluation_criteria } => match key {
        "prompt" => prompt,
        "summary" => summary,
        "evaluation_criteria" => evaluation_criteria,
        other => return Err(UnknownFieldError::new(other, variant)),
      },
    };
    *slot = Some(value);
    Ok(())
  }

  /// Read the whole draft into a title and a variant body.
  pub fn materialize(&self) -> Result<(String, ChallengeBody), ValidationError> {
    let body = match &self.body {
      DraftBody::MultipleChoice { question, options, correct_answer, explanation } => {
        let question = required(question, "question")?;
        let options: Options = options
          .iter()
          .filter_map(|(label, text)| text.as_ref().map(|t| (label.clone(), t.clone())))
          .collect();
        if options.is_empty() {
          return Err(ValidationError::missing("options"));
        }
        let correct_answer = required(correct_answer, "correct_answer")?;
        if !options.contains_key(&correct_answer) {
          return Err(ValidationError::UnknownCorrectAnswer { answer: correct_answer });
        }
        let explanation = required(explanation, "explanation")?;
        ChallengeBody::MultipleChoice(MultipleChoice { question, options, correct_answer, explanation })
      }
      DraftBody::Subjective { prompt, summary, evaluation_criteria } => ChallengeBody::Subjective(Subjective {
        prompt: required(prompt, "prompt")?,
        summary: required(summary, "summary")?,
        evaluation_criteria: required(evaluation_criteria, "evaluation_criteria")?,
      }),
    };
    Ok((self.title.clone(), body))
  }
}

fn required(value: &Option<String>, field: &str) -> Result<String, ValidationError> {
  value.clone().ok_or_else(|| ValidationError::missing(field))
}
