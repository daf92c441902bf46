//! Lycan: AI players for a chat-based werewolf game.
//!
//! This library provides:
//! - Agents with a fixed personality that talk and vote through a text generator
//! - A bounded, shared log of the public conversation
//! - A registry that mints agent nicks and seats agents in the host game
//! - Speaking and voting loops that pace agent actions during the day
//! - Operator commands and an in-memory game table for local play
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lycan::{Config, GameCollaborators, LocalTable, Phase, Session};
//!
//! # async fn demo() {
//! let table = Arc::new(LocalTable::new());
//! let session = Session::new(Config::from_env(), GameCollaborators::from_table(table.clone()));
//! println!("{}", session.execute("addagent cautious"));
//!
//! table.set_phase(Phase::Day);
//! session.on_phase_change(Phase::Day);
//! # }
//! ```

pub mod error;
pub mod game;
pub mod agent;
pub mod ai;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod commands;
pub mod cli;

pub use crate::error::{LycanError, LycanResult};
pub use crate::game::{GameCollaborators, LocalTable, Phase};
pub use crate::agent::{Agent, ConversationLog, Personality};
pub use crate::ai::ResponseGenerator;
pub use crate::registry::AgentRegistry;
pub use crate::scheduler::{Scheduler, SpeakingPolicy, VotingPolicy};
pub use crate::session::Session;
pub use crate::commands::AgentCommand;

use std::path::Path;
use serde::{Serialize, Deserialize};

/// Configuration for a lycan session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Most recent chat lines kept for agent context
    pub log_capacity: usize,
    /// Phase in which agents speak and vote
    pub eligible_phase: Phase,
    pub speaking: SpeakingPolicy,
    pub voting: VotingPolicy,
    /// Generation model; agents stay silent without one
    pub model_name: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Upper bound on one generation request
    pub request_timeout_secs: u64,
    /// Fixed seed for agent selection and delays
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_capacity: agent::conversation::DEFAULT_CAPACITY,
            eligible_phase: Phase::Day,
            speaking: SpeakingPolicy::default(),
            voting: VotingPolicy::default(),
            model_name: None,
            api_key: None,
            request_timeout_secs: 30,
            rng_seed: None,
        }
    }
}

impl Config {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Load a TOML file; keys it leaves out keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> LycanResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scheduler or the backend cannot work with
    pub fn validate(&self) -> LycanResult<()> {
        if self.log_capacity == 0 {
            return Err(LycanError::Configuration(
                "log_capacity must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(LycanError::Configuration(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        self.speaking.validate()?;
        self.voting.validate()
    }

    /// Apply `LYCAN_*` (or `GEMINI_*`) variables found through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| names.iter().find_map(|name| lookup(*name));

        if let Some(model) = first(&["LYCAN_MODEL_NAME", "GEMINI_MODEL_NAME"]) {
            self.model_name = Some(model);
        }
        if let Some(key) = first(&["LYCAN_API_KEY", "GEMINI_API_KEY"]) {
            self.api_key = Some(key);
        }
        if let Some(raw) = lookup("LYCAN_LOG_CAPACITY") {
            match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => self.log_capacity = capacity,
                _ => tracing::warn!("Ignoring invalid LYCAN_LOG_CAPACITY '{}'", raw),
            }
        }
        self
    }
}
