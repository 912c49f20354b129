//! Challenge Studio: author multiple-choice and subjective challenges for
//! evaluating language-model outputs.
//!
//! The core is `domain` (challenge model + keyed field accessor), `draft` and
//! `session` (mode controller). `routes` is a thin axum surface over it.

pub mod clock;
pub mod config;
pub mod domain;
pub mod draft;
pub mod error;
pub mod logic;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod util;
