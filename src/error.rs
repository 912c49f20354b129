//! Error kinds surfaced by the challenge model and the session controller.
//!
//! `UnknownFieldError` is a caller bug (asking a variant for a key it does not
//! have). `ValidationError` is a rejected form submission; the draft survives it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field `{key}` for {variant}")]
pub struct UnknownFieldError {
  pub key: String,
  pub variant: &'static str,
}

impl UnknownFieldError {
  pub fn new(key: impl Into<String>, variant: &'static str) -> Self {
    Self { key: key.into(), variant }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("required field `{field}` is missing")]
  MissingField { field: String },

  #[error("correct answer `{answer}` is not one of the options")]
  UnknownCorrectAnswer { answer: String },

  #[error("option `{label}` has no slot (configured slots: {slots})")]
  OptionSlotMismatch { label: String, slots: usize },

  #[error("field `{field}` cannot be changed here")]
  ImmutableField { field: String },

  #[error("unknown challenge type `{value}`")]
  UnknownChallengeType { value: String },
}

impl ValidationError {
  pub fn missing(field: &str) -> Self {
    ValidationError::MissingField { field: field.to_string() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
  #[error(transparent)]
  UnknownField(#[from] UnknownFieldError),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("cannot {operation} while {mode}")]
  InvalidTransition { operation: &'static str, mode: &'static str },

  #[error("no challenge at index {index}")]
  NoSuchChallenge { index: usize },
}

impl SessionError {
  /// Stable machine-readable tag used on the wire.
  pub fn kind(&self) -> &'static str {
    match self {
      SessionError::UnknownField(_) => "unknown_field",
      SessionError::Validation(_) => "validation",
      SessionError::InvalidTransition { .. } => "invalid_transition",
      SessionError::NoSuchChallenge { .. } => "no_such_challenge",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_field_names_key_and_variant() {
    let e = UnknownFieldError::new("prompt", "MultipleChoiceChallenge");
    assert_eq!(e.to_string(), "unknown field `prompt` for MultipleChoiceChallenge");
  }

  #[test]
  fn session_error_kinds() {
    let e: SessionError = ValidationError::missing("question").into();
    assert_eq!(e.kind(), "validation");
    assert_eq!(e.to_string(), "required field `question` is missing");
    let e = SessionError::InvalidTransition { operation: "commit_edit", mode: "browsing" };
    assert_eq!(e.kind(), "invalid_transition");
    assert_eq!(e.to_string(), "cannot commit_edit while browsing");
  }
}
