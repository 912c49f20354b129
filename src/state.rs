//! Application state shared by all connections: the option slot count and
//! the challenge bank. Read-only after startup; sessions are per connection.

use tracing::{info, instrument};

use crate::config::{load_config_from_env, ChallengeCfg, StudioConfig};
use crate::seeds::sample_bank;
use crate::session::Session;

#[derive(Clone, Debug)]
pub struct AppState {
    pub number_options: usize,
    pub bank: Vec<ChallengeCfg>,
}

impl AppState {
    /// Build state from env: load config, fall back to the sample bank.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_config_from_env())
    }

    pub fn from_config(cfg: StudioConfig) -> Self {
        let (bank, origin) = if cfg.challenges.is_empty() {
            (sample_bank(), "sample")
        } else {
            (cfg.challenges, "config")
        };
        info!(target: "challenge_studio", number_options = cfg.number_options, bank = bank.len(), %origin, "Studio state ready");
        Self {
            number_options: cfg.number_options,
            bank,
        }
    }

    /// Fresh, empty session for one connected author.
    pub fn new_session(&self) -> Session {
        Session::new(self.number_options)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(StudioConfig::default())
    }
}
