//! Public protocol structs for the WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ChallengeCfg;
use crate::domain::{Challenge, ChallengeType, FieldValue, ModelOutput, Note};
use crate::error::UnknownFieldError;
use crate::session::Mode;

/// Messages the client can send over WebSocket. One per user action.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListChallenges,
    GetChallenge {
        index: usize,
    },
    GetField {
        index: usize,
        key: String,
    },
    BeginCreate {
        #[serde(default)]
        challenge_type: ChallengeType,
    },
    UpdateDraftField {
        key: String,
        value: String,
    },
    CommitCreate,
    CancelCreate,
    BeginEdit {
        index: usize,
    },
    CommitEdit,
    CancelEdit,
    DeleteChallenge {
        index: usize,
    },
    AddNote {
        index: usize,
        username: String,
        content: String,
    },
    AddModelOutput {
        index: usize,
        text: String,
        submitted_by: String,
        model_name: String,
    },
    LoadBank,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Challenges {
        items: Vec<ChallengeListItem>,
    },
    Challenge {
        challenge: ChallengeOut,
    },
    Field {
        index: usize,
        key: String,
        value: FieldValue,
    },
    /// Current mode plus the open draft, sent after every form transition.
    Form {
        form: Mode,
    },
    Created {
        challenge: ChallengeOut,
    },
    Updated {
        challenge: ChallengeOut,
    },
    Deleted {
        index: usize,
        title: String,
    },
    Imported {
        added: usize,
    },
    Error {
        kind: String,
        message: String,
    },
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChallengeListItem {
    pub index: usize,
    pub title: String,
}

/// DTO used for challenge delivery. `fields` is filled through the keyed
/// accessor, so it holds exactly the keys the variant supports.
#[derive(Debug, Serialize)]
pub struct ChallengeOut {
    pub index: usize,
    pub challenge_type: ChallengeType,
    pub fields: BTreeMap<&'static str, FieldValue>,
    pub notes: Vec<Note>,
    pub model_outputs: Vec<ModelOutput>,
}

/// Convert a `Challenge` (internal) to the public DTO.
pub fn to_out(index: usize, c: &Challenge) -> Result<ChallengeOut, UnknownFieldError> {
    let fields: BTreeMap<&'static str, FieldValue> = c
        .field_keys()
        .iter()
        .map(|key| c.get_field(key).map(|v| (*key, v)))
        .collect::<Result<_, _>>()?;
    Ok(ChallengeOut {
        index,
        challenge_type: c.challenge_type(),
        fields,
        notes: c.notes().to_vec(),
        model_outputs: c.model_outputs().to_vec(),
    })
}

//
// HTTP response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BankItemOut {
    pub title: String,
    pub challenge_type: ChallengeType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BankOut {
    pub number_options: usize,
    pub items: Vec<BankItemOut>,
}

pub fn bank_out(number_options: usize, bank: &[ChallengeCfg]) -> BankOut {
    BankOut {
        number_options,
        items: bank
            .iter()
            .map(|c| BankItemOut { title: c.title.clone(), challenge_type: c.kind })
            .collect(),
    }
}
