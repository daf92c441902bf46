//! Core types for the agent module

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::error::LycanError;

/// Unique identifier for an agent (its nick in the host game)
pub type AgentId = String;

/// Who produced a turn, from the agent's point of view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Written by the agent itself
    #[serde(rename = "self")]
    Own,
    /// Written by anybody else, or not attributable
    Other,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Own => "self",
            Role::Other => "other",
        }
    }
}

/// A role-tagged piece of conversation sent to the generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn own(text: impl Into<String>) -> Self {
        Self { role: Role::Own, text: text.into() }
    }

    pub fn other(text: impl Into<String>) -> Self {
        Self { role: Role::Other, text: text.into() }
    }
}

/// One chat line as recorded in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationEntry {
    pub timestamp: DateTime<Utc>,
    pub speaker: String,
    pub text: String,
}

impl ConversationEntry {
    pub fn new(speaker: &str, text: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }
}

/// Renders as a channel line: `<speaker> text`, or the bare text for unattributed notices
impl fmt::Display for ConversationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.speaker.is_empty() {
            f.write_str(&self.text)
        } else {
            write!(f, "<{}> {}", self.speaker, self.text)
        }
    }
}

/// Behavioral flavour of an agent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Cautious,
    Aggressive,
    Quiet,
    Leader,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Cautious,
        Personality::Aggressive,
        Personality::Quiet,
        Personality::Leader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Cautious => "cautious",
            Personality::Aggressive => "aggressive",
            Personality::Quiet => "quiet",
            Personality::Leader => "leader",
        }
    }

    pub fn directive(&self) -> &'static str {
        match self {
            Personality::Cautious => {
                "You are a werewolf player. You must be cautious in your actions. \
                 If you are a wolf, you don't have to accuse people randomly, but you have to stay behind."
            }
            Personality::Aggressive => {
                "You are a werewolf player. You must be aggressive in your actions. \
                 You are not afraid to accuse others, even with little evidence."
            }
            Personality::Quiet => {
                "You are a werewolf player. You are very quiet and don't talk much. \
                 You prefer to observe and analyze the game silently."
            }
            Personality::Leader => {
                "You are a werewolf player. You are a natural leader. \
                 You try to guide the village and organize the votes against suspected werewolves."
            }
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Personality {
    type Err = LycanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Personality::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| LycanError::UnknownPersonality(s.trim().to_string()))
    }
}
