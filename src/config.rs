//! Loading studio configuration (option slot count + optional challenge bank) from TOML.
//!
//! See `StudioConfig` and `ChallengeCfg` for the expected schema:
//!
//! ```toml
//! number_options = 5
//!
//! [[challenges]]
//! kind = "multiple_choice"
//! title = "Borrowing"
//! question = "Which reference allows mutation?"
//! options = { A = "&T", B = "&mut T" }
//! correct_answer = "B"
//! explanation = "Only unique references may mutate."
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::ChallengeType;
use crate::draft::{Draft, OPTION_KEY_PREFIX};
use crate::error::ValidationError;

/// Option slots offered by a blank multiple-choice form.
pub const NUMBER_OPTIONS: usize = 5;
/// One slot per letter of the alphabet at most.
pub const MAX_OPTIONS: usize = 26;

pub const CONFIG_PATH_ENV: &str = "STUDIO_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse config file {path}: {source}")]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("validation error for field `{field}`: {message}")]
  Invalid { field: String, message: String },
}

#[derive(Clone, Debug, Deserialize)]
pub struct StudioConfig {
  #[serde(default = "default_number_options")]
  pub number_options: usize,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

fn default_number_options() -> usize { NUMBER_OPTIONS }

impl Default for StudioConfig {
  fn default() -> Self {
    Self { number_options: NUMBER_OPTIONS, challenges: Vec::new() }
  }
}

/// Challenge entry accepted in TOML configuration.
/// Only the fields of the declared `kind` are read.
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  pub kind: ChallengeType,
  #[serde(default)] pub title: String,
  // multiple_choice
  #[serde(default)] pub question: Option<String>,
  #[serde(default)] pub options: BTreeMap<String, String>,
  #[serde(default)] pub correct_answer: Option<String>,
  #[serde(default)] pub explanation: Option<String>,
  // subjective
  #[serde(default)] pub prompt: Option<String>,
  #[serde(default)] pub summary: Option<String>,
  #[serde(default)] pub evaluation_criteria: Option<String>,
}

impl ChallengeCfg {
  /// Fill a blank draft the same way a user would fill the form.
  pub fn to_draft(&self, number_options: usize) -> Result<Draft, ValidationError> {
    let mut draft = Draft::blank(self.kind, number_options);
    let named = match self.kind {
      ChallengeType::MultipleChoice => [
        ("question", &self.question),
        ("correct_answer", &self.correct_answer),
        ("explanation", &self.explanation),
      ],
      ChallengeType::Subjective => [
        ("prompt", &self.prompt),
        ("summary", &self.summary),
        ("evaluation_criteria", &self.evaluation_criteria),
      ],
    };
    let mut fields: Vec<(String, String)> = vec![("title".into(), self.title.clone())];
    fields.extend(named.into_iter().filter_map(|(k, v)| v.clone().map(|v| (k.to_string(), v))));
    if self.kind == ChallengeType::MultipleChoice {
      fields.extend(self.options.iter().map(|(l, t)| (format!("{OPTION_KEY_PREFIX}{l}"), t.clone())));
    }
    for (key, value) in fields {
      // Only option labels can miss: every other key belongs to `kind`.
      draft.set_field(&key, value).map_err(|e| ValidationError::OptionSlotMismatch {
        label: e.key.strip_prefix(OPTION_KEY_PREFIX).unwrap_or(&e.key).to_string(),
        slots: number_options,
      })?;
    }
    Ok(draft)
  }
}

impl StudioConfig {
  fn validate(&self) -> Result<(), ConfigError> {
    if self.number_options == 0 || self.number_options > MAX_OPTIONS {
      return Err(ConfigError::Invalid {
        field: "number_options".into(),
        message: format!("must be between 1 and {MAX_OPTIONS}, got {}", self.number_options),
      });
    }
    Ok(())
  }
}

pub fn parse_config(s: &str, path: &Path) -> Result<StudioConfig, ConfigError> {
  let cfg: StudioConfig =
    toml::from_str(s).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
  cfg.validate()?;
  Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<StudioConfig, ConfigError> {
  let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
  parse_config(&s, path)
}

/// Load from STUDIO_CONFIG_PATH. Missing variable means defaults; any read,
/// parse or validation error is logged and also falls back to defaults.
pub fn load_config_from_env() -> StudioConfig {
  let Some(path) = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) else {
    return StudioConfig::default();
  };
  match load_config(&path) {
    Ok(cfg) => {
      info!(target: "challenge_studio", path = %path.display(), number_options = cfg.number_options, bank = cfg.challenges.len(), "Loaded studio config (TOML)");
      cfg
    }
    Err(e) => {
      error!(target: "challenge_studio", path = %path.display(), error = %e, "Unusable studio config; using defaults");
      StudioConfig::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ChallengeBody;

  const SAMPLE: &str = r#"
number_options = 4

[[challenges]]
kind = "multiple_choice"
title = "Borrowing"
question = "Which reference allows mutation?"
options = { A = "&T", B = "&mut T" }
correct_answer = "B"
explanation = "Only unique references may mutate."

[[challenges]]
kind = "subjective"
title = "Essay"
prompt = "Explain lifetimes."
summary = "lifetimes"
evaluation_criteria = "Mentions scopes."
"#;

  #[test]
  fn parses_bank_entries() {
    let cfg = parse_config(SAMPLE, Path::new("studio.toml")).unwrap();
    assert_eq!(cfg.number_options, 4);
    assert_eq!(cfg.challenges.len(), 2);
    assert_eq!(cfg.challenges[1].kind, ChallengeType::Subjective);

    let (title, body) = cfg.challenges[0].to_draft(cfg.number_options).unwrap().materialize().unwrap();
    assert_eq!(title, "Borrowing");
    assert!(matches!(body, ChallengeBody::MultipleChoice(ref mc) if mc.correct_answer == "B"));
  }

  #[test]
  fn empty_file_means_defaults() {
    let cfg = parse_config("", Path::new("studio.toml")).unwrap();
    assert_eq!(cfg.number_options, NUMBER_OPTIONS);
    assert!(cfg.challenges.is_empty());
  }

  #[test]
  fn rejects_out_of_range_option_count() {
    let err = parse_config("number_options = 0", Path::new("studio.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "number_options"));
    assert!(parse_config("number_options = 27", Path::new("studio.toml")).is_err());
  }

  #[test]
  fn option_outside_slots_is_rejected() {
    let cfg = parse_config(SAMPLE, Path::new("studio.toml")).unwrap();
    let err = cfg.challenges[0].to_draft(1).unwrap_err();
    assert_eq!(err, ValidationError::OptionSlotMismatch { label: "B".into(), slots: 1 });
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }
}
