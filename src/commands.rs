//! Operator commands for managing agents
//!
//! Commands are plain text, optionally prefixed with `!`:
//!
//! ```text
//! addagent [personality]
//! removeagent <nick>
//! listagents
//! joinagent <nick>
//! ```

use std::str::FromStr;
use crate::agent::Personality;
use crate::error::LycanError;
use crate::game::ParticipantNamespace;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCommand {
    Add { personality: Option<Personality> },
    /// The nick is optional here so the missing case gets its own reply
    Remove { nick: Option<String> },
    List,
    Join { nick: String },
}

impl FromStr for AgentCommand {
    type Err = LycanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let line = line.strip_prefix('!').unwrap_or(line);
        let mut parts = line.split_whitespace();
        let word = parts
            .next()
            .ok_or_else(|| LycanError::InvalidCommand("empty command".to_string()))?;
        let argument = parts.next();

        match word.to_lowercase().as_str() {
            "addagent" => Ok(AgentCommand::Add {
                personality: argument.map(str::parse::<Personality>).transpose()?,
            }),
            "removeagent" => Ok(AgentCommand::Remove {
                nick: argument.map(str::to_string),
            }),
            "listagents" => Ok(AgentCommand::List),
            "joinagent" => match argument {
                Some(nick) => Ok(AgentCommand::Join { nick: nick.to_string() }),
                None => Err(LycanError::InvalidCommand(
                    "You must specify the nick of the agent to join.".to_string(),
                )),
            },
            other => Err(LycanError::InvalidCommand(format!("unknown command '{}'", other))),
        }
    }
}

/// Run a parsed command against a session and return the operator reply
pub fn execute(session: &Session, command: AgentCommand) -> String {
    tracing::debug!("Operator command: {:?}", command);
    match command {
        AgentCommand::Add { personality } => {
            let agent = session.create_agent(personality);
            format!("AI agent {} ({}) has been created.", agent.id(), agent.personality())
        }
        AgentCommand::Remove { nick: None } => {
            "You must specify the nick of the agent to remove.".to_string()
        }
        AgentCommand::Remove { nick: Some(nick) } => remove(session, &nick),
        AgentCommand::List => {
            let agents = session.registry().snapshot();
            if agents.is_empty() {
                return "No AI agents.".to_string();
            }
            agents
                .iter()
                .map(|a| format!("{} ({})", a.id(), a.personality()))
                .collect::<Vec<_>>()
                .join("\n")
        }
        AgentCommand::Join { nick } => match session.join_agent(&nick) {
            Ok(()) => format!("AI agent {} has joined the game.", nick),
            Err(e) => e.to_string(),
        },
    }
}

fn remove(session: &Session, nick: &str) -> String {
    let Some(handle) = session.collaborators().namespace.lookup(nick) else {
        return format!("User {} not found.", nick);
    };
    if !handle.is_agent() || !session.registry().contains(nick) {
        return format!("User {} is not an AI agent.", nick);
    }
    if session.remove_agent(nick) {
        format!("AI agent {} has been removed.", nick)
    } else {
        format!("User {} not found.", nick)
    }
}
