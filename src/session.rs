//! Session/mode controller: one author's challenge collection plus the form
//! currently open on it.
//!
//! This module owns:
//!   - the ordered challenge collection (empty at session start)
//!   - the mode: browsing, creating a new challenge, or editing one
//!   - the draft for the open form, committed or discarded as a whole
//!
//! One `Session` per connected author. Nothing here is shared across sessions,
//! so there is no locking; every call runs to completion on the caller's task.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::{ChallengeCfg, NUMBER_OPTIONS};
use crate::domain::{Challenge, ChallengeType, FieldValue};
use crate::draft::Draft;
use crate::error::{SessionError, ValidationError};
use crate::util::trunc_for_log;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    Browsing,
    Creating { draft: Draft },
    Editing { target: usize, draft: Draft },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Browsing => "browsing",
            Mode::Creating { .. } => "creating",
            Mode::Editing { .. } => "editing",
        }
    }
}

pub struct Session {
    id: Uuid,
    challenges: Vec<Challenge>,
    mode: Mode,
    number_options: usize,
    clock: Arc<dyn Clock>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(NUMBER_OPTIONS)
    }
}

impl Session {
    pub fn new(number_options: usize) -> Self {
        Self::with_clock(number_options, Arc::new(SystemClock))
    }

    pub fn with_clock(number_options: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            id: Uuid::new_v4(),
            challenges: Vec::new(),
            mode: Mode::Browsing,
            number_options,
            clock,
        }
    }

    /// Session over a previously saved collection, e.g. one handed back by a
    /// persistence layer. Starts in Browsing. Every challenge is re-checked;
    /// one that breaks its variant's invariants rejects the whole collection.
    pub fn restore(
        number_options: usize,
        clock: Arc<dyn Clock>,
        challenges: Vec<Challenge>,
    ) -> Result<Self, SessionError> {
        for c in &challenges {
            c.body().validate()?;
        }
        Ok(Self {
            challenges,
            ..Self::with_clock(number_options, clock)
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn number_options(&self) -> usize {
        self.number_options
    }

    /// The open form's draft, if any.
    pub fn draft(&self) -> Option<&Draft> {
        match &self.mode {
            Mode::Browsing => None,
            Mode::Creating { draft } | Mode::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn challenge(&self, index: usize) -> Result<&Challenge, SessionError> {
        self.challenges
            .get(index)
            .ok_or(SessionError::NoSuchChallenge { index })
    }

    /// Selector entries: (index, title). Untitled challenges stay in the
    /// collection and by index, but are not listed.
    pub fn list_challenges(&self) -> Vec<(usize, &str)> {
        self.challenges
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.title().is_empty())
            .map(|(i, c)| (i, c.title()))
            .collect()
    }

    pub fn get_field(&self, index: usize, key: &str) -> Result<FieldValue, SessionError> {
        Ok(self.challenge(index)?.get_field(key)?)
    }

    /// Browsing -> Creating with a blank draft of `declared_type`.
    #[instrument(level = "info", skip(self), fields(session = %self.id))]
    pub fn begin_create(&mut self, declared_type: ChallengeType) -> Result<(), SessionError> {
        self.expect_browsing("begin_create")?;
        self.mode = Mode::Creating {
            draft: Draft::blank(declared_type, self.number_options),
        };
        debug!(target: "session", challenge_type = %declared_type, "Create form opened");
        Ok(())
    }

    /// Write one field of the open draft. `challenge_type` switches the
    /// variant while creating (variant fields reset) and is immutable while
    /// editing.
    #[instrument(level = "debug", skip(self, value), fields(session = %self.id, value = %trunc_for_log(value, 48)))]
    pub fn update_draft_field(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let number_options = self.number_options;
        match &mut self.mode {
            Mode::Browsing => Err(SessionError::InvalidTransition {
                operation: "update_draft_field",
                mode: "browsing",
            }),
            Mode::Creating { draft } if key == "challenge_type" => {
                let ty: ChallengeType = value.parse()?;
                if ty != draft.challenge_type() {
                    draft.switch_type(ty, number_options);
                    debug!(target: "session", challenge_type = %ty, "Draft type switched; variant fields reset");
                }
                Ok(())
            }
            Mode::Editing { draft, .. } if key == "challenge_type" => {
                let ty: ChallengeType = value.parse()?;
                if ty != draft.challenge_type() {
                    return Err(ValidationError::ImmutableField { field: key.to_string() }.into());
                }
                Ok(())
            }
            Mode::Creating { draft } | Mode::Editing { draft, .. } => Ok(draft.set_field(key, value.to_string())?),
        }
    }

    /// Creating -> Browsing, appending the materialized draft. On a validation
    /// failure the session stays in Creating with the draft untouched.
    #[instrument(level = "info", skip(self), fields(session = %self.id))]
    pub fn commit_create(&mut self) -> Result<&Challenge, SessionError> {
        let Mode::Creating { draft } = &self.mode else {
            return Err(self.invalid("commit_create"));
        };
        let (title, body) = draft.materialize().map_err(|e| {
            warn!(target: "session", error = %e, "Create rejected");
            e
        })?;
        self.mode = Mode::Browsing;
        self.challenges.push(Challenge::from_body(title, body));
        let index = self.challenges.len() - 1;
        let created = &self.challenges[index];
        info!(target: "session", index, title = %created.title(), challenge_type = %created.challenge_type(), "Challenge created");
        Ok(created)
    }

    #[instrument(level = "info", skip(self), fields(session = %self.id))]
    pub fn cancel_create(&mut self) -> Result<(), SessionError> {
        if !matches!(self.mode, Mode::Creating { .. }) {
            return Err(self.invalid("cancel_create"));
        }
        self.mode = Mode::Browsing;
        debug!(target: "session", "Create form discarded");
        Ok(())
    }

    /// Browsing -> Editing(index) with a draft mirroring the challenge.
    #[instrument(level = "info", skip(self), fields(session = %self.id))]
    pub fn begin_edit(&mut self, index: usize) -> Result<(), SessionError> {
        self.expect_browsing("begin_edit")?;
        let draft = Draft::from_challenge(self.challenge(index)?, self.number_options)?;
        self.mode = Mode::Editing { target: index, draft };
        debug!(target: "session", index, "Edit form opened");
        Ok(())
    }

    /// Editing -> Browsing, overwriting the target in place. Its position,
    /// type, notes and model outputs are preserved.
    #[instrument(level = "info", skip(self), fields(session = %self.id))]
    pub fn commit_edit(&mut self) -> Result<(), SessionError> {
        let Mode::Editing { target, draft } = &self.mode else {
            return Err(self.invalid("commit_edit"));
        };
        let target = *target;
        let (title, body) = draft.materialize().map_err(|e| {
            warn!(target: "session", index = target, error = %e, "Edit rejected");
            e
        })?;
        let challenge = self
            .challenges
            .get_mut(target)
            .ok_or(SessionError::NoSuchChallenge { index: target })?;
        challenge.replace(title, body)?;
        self.mode = Mode::Browsing;
        info!(target: "session", index = target, "Challenge updated");
        Ok(())
    }

    #[instrument(level = "info", skip(self), fields(session = %self.id))]
    pub fn cancel_edit(&mut self) -> Result<(), SessionError> {
        if !matches!(self.mode, Mode::Editing { .. }) {
            return Err(self.invalid("cancel_edit"));
        }
        self.mode = Mode::Browsing;
        debug!(target: "session", "Edit form discarded");
        Ok(())
    }

    /// Remove a challenge while browsing. Later indices shift down by one.
    #[instrument(level = "info", skip(self), fields(session = %self.id))]
    pub fn delete_challenge(&mut self, index: usize) -> Result<Challenge, SessionError> {
        self.expect_browsing("delete_challenge")?;
        self.challenge(index)?;
        let removed = self.challenges.remove(index);
        info!(target: "session", index, title = %removed.title(), "Challenge deleted");
        Ok(removed)
    }

    /// Append a note. Allowed in any mode; drafts never carry notes.
    #[instrument(level = "debug", skip(self, content), fields(session = %self.id, content_len = content.len()))]
    pub fn add_note(&mut self, index: usize, username: &str, content: &str) -> Result<(), SessionError> {
        let clock = Arc::clone(&self.clock);
        self.challenge_mut(index)?.add_note(clock.as_ref(), username, content);
        Ok(())
    }

    #[instrument(level = "debug", skip(self, text), fields(session = %self.id, text_len = text.len()))]
    pub fn add_model_output(
        &mut self,
        index: usize,
        text: &str,
        submitted_by: &str,
        model_name: &str,
    ) -> Result<(), SessionError> {
        let clock = Arc::clone(&self.clock);
        self.challenge_mut(index)?
            .add_model_output(clock.as_ref(), text, submitted_by, model_name);
        Ok(())
    }

    /// Append bank entries while browsing. Each entry goes through the same
    /// draft validation as a form submission; one bad entry rejects the batch.
    #[instrument(level = "info", skip(self, bank), fields(session = %self.id, bank_len = bank.len()))]
    pub fn import_bank(&mut self, bank: &[ChallengeCfg]) -> Result<usize, SessionError> {
        self.expect_browsing("import_bank")?;
        let mut staged = Vec::with_capacity(bank.len());
        for cfg in bank {
            let (title, body) = cfg.to_draft(self.number_options)?.materialize()?;
            staged.push(Challenge::from_body(title, body));
        }
        let added = staged.len();
        self.challenges.extend(staged);
        info!(target: "session", added, total = self.challenges.len(), "Bank imported");
        Ok(added)
    }

    fn challenge_mut(&mut self, index: usize) -> Result<&mut Challenge, SessionError> {
        self.challenges
            .get_mut(index)
            .ok_or(SessionError::NoSuchChallenge { index })
    }

    fn expect_browsing(&self, operation: &'static str) -> Result<(), SessionError> {
        match self.mode {
            Mode::Browsing => Ok(()),
            _ => Err(self.invalid(operation)),
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            mode: self.mode.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn session() -> Session {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Session::with_clock(NUMBER_OPTIONS, Arc::new(ManualClock::new(t0)))
    }

    fn create_essay(s: &mut Session, title: &str) {
        s.begin_create(ChallengeType::Subjective).unwrap();
        s.update_draft_field("title", title).unwrap();
        s.update_draft_field("prompt", "P").unwrap();
        s.update_draft_field("summary", "S").unwrap();
        s.update_draft_field("evaluation_criteria", "C").unwrap();
        s.commit_create().unwrap();
    }

    #[test]
    fn starts_browsing_and_empty() {
        let s = session();
        assert_eq!(s.mode(), &Mode::Browsing);
        assert!(s.challenges().is_empty());
        assert!(s.draft().is_none());
    }

    #[test]
    fn type_switch_resets_fields_but_same_type_does_not() {
        let mut s = session();
        s.begin_create(ChallengeType::MultipleChoice).unwrap();
        s.update_draft_field("title", "kept").unwrap();
        s.update_draft_field("question", "Q").unwrap();
        s.update_draft_field("challenge_type", "Multiple Choice").unwrap();
        assert_eq!(s.draft().unwrap().materialize().unwrap_err(), ValidationError::missing("options"));

        s.update_draft_field("challenge_type", "subjective").unwrap();
        let draft = s.draft().unwrap();
        assert_eq!(draft.challenge_type(), ChallengeType::Subjective);
        assert_eq!(draft.title, "kept");
        assert_eq!(draft.materialize().unwrap_err(), ValidationError::missing("prompt"));
    }

    #[test]
    fn failed_commit_keeps_draft() {
        let mut s = session();
        s.begin_create(ChallengeType::Subjective).unwrap();
        s.update_draft_field("prompt", "P").unwrap();
        let before = s.draft().cloned();
        let err = s.commit_create().unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(s.mode().name(), "creating");
        assert_eq!(s.draft().cloned(), before);
        assert!(s.challenges().is_empty());
    }

    #[test]
    fn failed_edit_commit_keeps_draft_and_target() {
        let mut s = session();
        s.begin_create(ChallengeType::MultipleChoice).unwrap();
        for (k, v) in [("title", "T"), ("question", "Q"), ("options.A", "x"), ("options.B", "y"), ("correct_answer", "A"), ("explanation", "E")] {
            s.update_draft_field(k, v).unwrap();
        }
        s.commit_create().unwrap();
        let stored = s.challenge(0).unwrap().clone();

        s.begin_edit(0).unwrap();
        s.update_draft_field("correct_answer", "C").unwrap();
        let before = s.draft().cloned();
        let err = s.commit_edit().unwrap_err();
        assert_eq!(
            err,
            SessionError::from(ValidationError::UnknownCorrectAnswer { answer: "C".into() })
        );
        assert_eq!(s.mode().name(), "editing");
        assert_eq!(s.draft().cloned(), before);
        assert_eq!(s.challenge(0).unwrap(), &stored);
    }

    #[test]
    fn restore_rejects_invalid_challenges() {
        use crate::domain::{ChallengeBody, MultipleChoice, Options};

        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let essay = Challenge::subjective("essay", "p", "s", "c");
        let orphan_answer = Challenge::from_body(
            "bad".into(),
            ChallengeBody::MultipleChoice(MultipleChoice {
                question: "Q".into(),
                options: Options::new(),
                correct_answer: "Z".into(),
                explanation: "E".into(),
            }),
        );

        let err = Session::restore(NUMBER_OPTIONS, Arc::new(ManualClock::new(t0)), vec![essay.clone(), orphan_answer]).err();
        assert_eq!(err, Some(SessionError::from(ValidationError::missing("options"))));

        let s = Session::restore(NUMBER_OPTIONS, Arc::new(ManualClock::new(t0)), vec![essay.clone()]).ok().expect("valid collection");
        assert_eq!(s.challenges(), &[essay]);
    }

    #[test]
    fn wrong_mode_is_rejected() {
        let mut s = session();
        assert_eq!(
            s.commit_edit().unwrap_err(),
            SessionError::InvalidTransition { operation: "commit_edit", mode: "browsing" }
        );
        assert!(s.update_draft_field("title", "x").is_err());
        s.begin_create(ChallengeType::Subjective).unwrap();
        assert_eq!(
            s.begin_create(ChallengeType::Subjective).unwrap_err(),
            SessionError::InvalidTransition { operation: "begin_create", mode: "creating" }
        );
        assert!(s.cancel_edit().is_err());
        assert!(s.delete_challenge(0).is_err());
    }

    #[test]
    fn type_is_immutable_while_editing() {
        let mut s = session();
        create_essay(&mut s, "Essay");
        s.begin_edit(0).unwrap();
        s.update_draft_field("challenge_type", "subjective").unwrap();
        let err = s.update_draft_field("challenge_type", "multiple_choice").unwrap_err();
        assert_eq!(
            err,
            SessionError::from(ValidationError::ImmutableField { field: "challenge_type".into() })
        );
        assert_eq!(s.mode().name(), "editing");
    }

    #[test]
    fn edit_preserves_notes_and_position() {
        let mut s = session();
        create_essay(&mut s, "first");
        create_essay(&mut s, "second");
        s.add_note(1, "ana", "looks good").unwrap();

        s.begin_edit(1).unwrap();
        s.update_draft_field("title", "renamed").unwrap();
        s.commit_edit().unwrap();

        assert_eq!(s.challenge(1).unwrap().title(), "renamed");
        assert_eq!(s.challenge(1).unwrap().notes().len(), 1);
        assert_eq!(s.challenge(0).unwrap().title(), "first");
    }

    #[test]
    fn delete_shifts_later_indices() {
        let mut s = session();
        create_essay(&mut s, "a");
        create_essay(&mut s, "b");
        create_essay(&mut s, "c");
        let removed = s.delete_challenge(1).unwrap();
        assert_eq!(removed.title(), "b");
        assert_eq!(s.list_challenges(), vec![(0, "a"), (1, "c")]);
        assert_eq!(s.delete_challenge(5).unwrap_err(), SessionError::NoSuchChallenge { index: 5 });
    }

    #[test]
    fn notes_allowed_while_a_form_is_open() {
        let mut s = session();
        create_essay(&mut s, "a");
        s.begin_create(ChallengeType::MultipleChoice).unwrap();
        s.add_model_output(0, "answer", "bo", "model-1").unwrap();
        assert_eq!(s.challenge(0).unwrap().model_outputs().len(), 1);
        assert_eq!(s.mode().name(), "creating");
        assert!(s.add_note(3, "bo", "x").is_err());
    }

    #[test]
    fn import_bank_is_all_or_nothing() {
        let mut s = session();
        let mut bank = crate::seeds::sample_bank();
        assert_eq!(s.import_bank(&bank).unwrap(), 2);
        assert_eq!(s.challenges().len(), 2);

        bank[1].prompt = None;
        assert!(s.import_bank(&bank).is_err());
        assert_eq!(s.challenges().len(), 2);
    }
}
