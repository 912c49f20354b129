//! Built-in sample bank, offered when no bank is configured.

use std::collections::BTreeMap;

use crate::config::ChallengeCfg;
use crate::domain::ChallengeType;

/// Two small challenges (one per variant) so a fresh install has
/// something to browse.
pub fn sample_bank() -> Vec<ChallengeCfg> {
  vec![
    ChallengeCfg {
      kind: ChallengeType::MultipleChoice,
      title: "Capital of Australia".into(),
      question: Some("What is the capital city of Australia?".into()),
      options: BTreeMap::from([
        ("A".into(), "Sydney".into()),
        ("B".into(), "Melbourne".into()),
        ("C".into(), "Canberra".into()),
        ("D".into(), "Perth".into()),
      ]),
      correct_answer: Some("C".into()),
      explanation: Some("Canberra was purpose-built as the capital; models often answer Sydney.".into()),
      prompt: None,
      summary: None,
      evaluation_criteria: None,
    },
    ChallengeCfg {
      kind: ChallengeType::Subjective,
      title: "Explain recursion to a child".into(),
      question: None,
      options: BTreeMap::new(),
      correct_answer: None,
      explanation: None,
      prompt: Some("Explain recursion to a seven year old in under 100 words.".into()),
      summary: Some("Checks simplification without losing correctness.".into()),
      evaluation_criteria: Some("Uses an everyday analogy, mentions a stopping point, stays under 100 words.".into()),
    },
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::NUMBER_OPTIONS;

  #[test]
  fn sample_bank_is_valid() {
    for cfg in sample_bank() {
      let draft = cfg.to_draft(NUMBER_OPTIONS).unwrap();
      assert!(draft.materialize().is_ok(), "{}", cfg.title);
    }
  }
}
