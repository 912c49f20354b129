//! HTTP endpoint handlers. Read-only; all authoring goes through `/ws`.

use std::sync::Arc;
use axum::{extract::State, Json, response::IntoResponse};
use tracing::{debug, instrument};

use crate::protocol::{bank_out, HealthOut};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

/// Titles and types of the challenge bank a session can load.
#[instrument(level = "info", skip(state))]
pub async fn http_get_bank(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  debug!(target: "challenge_studio", bank = state.bank.len(), "HTTP bank listing served");
  Json(bank_out(state.number_options, &state.bank))
}
