//! Core behaviors behind the WebSocket handler: one client message in, one
//! reply out, applied to the connection's own `Session`.

use tracing::{debug, instrument, warn};

use crate::config::ChallengeCfg;
use crate::error::SessionError;
use crate::protocol::{to_out, ChallengeListItem, ClientWsMessage, ServerWsMessage};
use crate::session::{Mode, Session};

#[instrument(level = "info", skip(session, bank), fields(session = %session.id()))]
pub fn handle_client_message(session: &mut Session, bank: &[ChallengeCfg], msg: ClientWsMessage) -> ServerWsMessage {
  match apply(session, bank, msg) {
    Ok(reply) => reply,
    Err(e) => {
      warn!(target: "session", kind = e.kind(), error = %e, "Request rejected");
      error_reply(&e)
    }
  }
}

pub fn error_reply(e: &SessionError) -> ServerWsMessage {
  ServerWsMessage::Error { kind: e.kind().to_string(), message: e.to_string() }
}

fn form(session: &Session) -> ServerWsMessage {
  ServerWsMessage::Form { form: session.mode().clone() }
}

fn apply(session: &mut Session, bank: &[ChallengeCfg], msg: ClientWsMessage) -> Result<ServerWsMessage, SessionError> {
  debug!(target: "session", ?msg, "Applying client message");
  let reply = match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListChallenges => ServerWsMessage::Challenges {
      items: session
        .list_challenges()
        .into_iter()
        .map(|(index, title)| ChallengeListItem { index, title: title.to_string() })
        .collect(),
    },

    ClientWsMessage::GetChallenge { index } => ServerWsMessage::Challenge {
      challenge: to_out(index, session.challenge(index)?)?,
    },

    ClientWsMessage::GetField { index, key } => {
      let value = session.get_field(index, &key)?;
      ServerWsMessage::Field { index, key, value }
    }

    ClientWsMessage::BeginCreate { challenge_type } => {
      session.begin_create(challenge_type)?;
      form(session)
    }

    ClientWsMessage::UpdateDraftField { key, value } => {
      session.update_draft_field(&key, &value)?;
      form(session)
    }

    ClientWsMessage::CommitCreate => {
      session.commit_create()?;
      let index = session.challenges().len() - 1;
      ServerWsMessage::Created { challenge: to_out(index, session.challenge(index)?)? }
    }

    ClientWsMessage::CancelCreate => {
      session.cancel_create()?;
      form(session)
    }

    ClientWsMessage::BeginEdit { index } => {
      session.begin_edit(index)?;
      form(session)
    }

    ClientWsMessage::CommitEdit => {
      let index = match session.mode() {
        Mode::Editing { target, .. } => *target,
        _ => {
          return Err(SessionError::InvalidTransition { operation: "commit_edit", mode: session.mode().name() })
        }
      };
      session.commit_edit()?;
      ServerWsMessage::Updated { challenge: to_out(index, session.challenge(index)?)? }
    }

    ClientWsMessage::CancelEdit => {
      session.cancel_edit()?;
      form(session)
    }

    ClientWsMessage::DeleteChallenge { index } => {
      let removed = session.delete_challenge(index)?;
      ServerWsMessage::Deleted { index, title: removed.title().to_string() }
    }

    ClientWsMessage::AddNote { index, username, content } => {
      session.add_note(index, &username, &content)?;
      ServerWsMessage::Challenge { challenge: to_out(index, session.challenge(index)?)? }
    }

    ClientWsMessage::AddModelOutput { index, text, submitted_by, model_name } => {
      session.add_model_output(index, &text, &submitted_by, &model_name)?;
      ServerWsMessage::Challenge { challenge: to_out(index, session.challenge(index)?)? }
    }

    ClientWsMessage::LoadBank => ServerWsMessage::Imported { added: session.import_bank(bank)? },
  };
  Ok(reply)
}
