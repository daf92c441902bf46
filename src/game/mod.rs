//! Contracts for the game the agents live in
//!
//! The rule engine, the user/channel substrate and vote resolution all belong
//! to the host game. This module only names what the orchestrator needs from
//! them:
//! - **GamePhaseOracle**: current phase and who is still alive
//! - **ParticipantNamespace**: the nick/user namespace agents are minted into
//! - **MessagingCollaborator**: outbound chat
//! - **VoteCollaborator**: vote tracking and dispatch
//! - **GameMembership**: entering and leaving the running game
//!
//! [`LocalTable`] implements all of them in memory.

mod local;

pub use local::{LocalTable, TableEvent};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use serde::{Serialize, Deserialize};
use crate::error::LycanError;

/// Phase of the host game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No game is running
    #[default]
    None,
    /// Players are joining
    Join,
    Day,
    Night,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::None => "none",
            Phase::Join => "join",
            Phase::Day => "day",
            Phase::Night => "night",
        }
    }

    /// Whether a game exists at all, including its join phase
    pub fn has_game(&self) -> bool {
        *self != Phase::None
    }

    /// Whether a game is in progress
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Day | Phase::Night)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = LycanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Phase::None),
            "join" => Ok(Phase::Join),
            "day" => Ok(Phase::Day),
            "night" => Ok(Phase::Night),
            other => Err(LycanError::InvalidCommand(format!("unknown phase '{}'", other))),
        }
    }
}

/// Who is behind a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Human,
    Agent,
}

/// Registration data handed to the namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantMetadata {
    pub ident: String,
    pub host: String,
    pub kind: ParticipantKind,
}

impl ParticipantMetadata {
    pub fn agent() -> Self {
        Self {
            ident: "AI".to_string(),
            host: "wolf.game".to_string(),
            kind: ParticipantKind::Agent,
        }
    }

    pub fn human(ident: &str, host: &str) -> Self {
        Self {
            ident: ident.to_string(),
            host: host.to_string(),
            kind: ParticipantKind::Human,
        }
    }
}

/// Reference to a registered participant (a "seat")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantHandle {
    identity: String,
    kind: ParticipantKind,
}

impl ParticipantHandle {
    pub fn new(identity: &str, kind: ParticipantKind) -> Self {
        Self {
            identity: identity.to_string(),
            kind,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    pub fn is_agent(&self) -> bool {
        self.kind == ParticipantKind::Agent
    }
}

pub trait GamePhaseOracle: Send + Sync {
    fn current_phase(&self) -> Phase;

    /// Identities of every participant still alive in the running game
    fn living_participants(&self) -> BTreeSet<String>;
}

pub trait ParticipantNamespace: Send + Sync {
    fn exists(&self, identity: &str) -> bool;

    fn register(&self, identity: &str, metadata: ParticipantMetadata) -> ParticipantHandle;

    fn unregister(&self, identity: &str);

    fn lookup(&self, identity: &str) -> Option<ParticipantHandle>;
}

pub trait MessagingCollaborator: Send + Sync {
    fn broadcast(&self, speaker: &str, text: &str);
}

pub trait VoteCollaborator: Send + Sync {
    fn has_voted(&self, identity: &str) -> bool;

    fn cast_vote(&self, identity: &str, target: &str);
}

pub trait GameMembership: Send + Sync {
    fn join(&self, participant: &ParticipantHandle);

    /// Remove a participant without triggering game-rule consequences
    fn force_exit(&self, participant: &ParticipantHandle);

    fn is_member(&self, identity: &str) -> bool;
}

/// Handles to every collaborator a session talks to
#[derive(Clone)]
pub struct GameCollaborators {
    pub phase: Arc<dyn GamePhaseOracle>,
    pub namespace: Arc<dyn ParticipantNamespace>,
    pub messaging: Arc<dyn MessagingCollaborator>,
    pub votes: Arc<dyn VoteCollaborator>,
    pub membership: Arc<dyn GameMembership>,
}

impl GameCollaborators {
    /// Use a single object for every role
    pub fn from_table<T>(table: Arc<T>) -> Self
    where
        T: GamePhaseOracle
            + ParticipantNamespace
            + MessagingCollaborator
            + VoteCollaborator
            + GameMembership
            + 'static,
    {
        Self {
            phase: table.clone(),
            namespace: table.clone(),
            messaging: table.clone(),
            votes: table.clone(),
            membership: table,
        }
    }
}
