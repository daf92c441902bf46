//! AI participants and the conversation they read
//!
//! This module provides:
//! - **ConversationLog**: bounded chat history shared by a session
//! - **ChatLine**: the `<speaker> text` line grammar
//! - **Agent**: turns history into role-tagged turns, asks a
//!   [`ResponseGenerator`](crate::ai::ResponseGenerator) for a reply or a
//!   vote, and validates what comes back
//!
//! # Example
//!
//! ```rust,ignore
//! use lycan::agent::{Agent, ConversationLog, Personality};
//! use lycan::game::{ParticipantHandle, ParticipantKind};
//!
//! let log = ConversationLog::default();
//! log.append("alice", "bob has been very quiet");
//!
//! let seat = ParticipantHandle::new("1", ParticipantKind::Agent);
//! let agent = Agent::new(seat, Personality::Leader, generator);
//! let reply = agent.respond(&log.snapshot()).await;
//! let target = agent.vote(&log.snapshot(), &["alice".into(), "bob".into()]).await;
//! ```

pub mod types;
pub mod line;
pub mod conversation;

pub use types::{Role, Turn, ConversationEntry, Personality, AgentId};
pub use line::ChatLine;
pub use conversation::ConversationLog;

use std::sync::Arc;
use tracing::instrument;
use crate::ai::ResponseGenerator;
use crate::error::LycanResult;
use crate::game::ParticipantHandle;

/// Writing-style directive shared by every personality
pub const WRITING_STYLE: &str = "You are chatting in a fast-paced game channel. \
    Answer with a single short line in a casual, informal style. Never write more than one line.";

/// Reply that lets an agent abstain from voting
pub const ABSTAIN: &str = "none";

/// A simulated participant
///
/// Agents hold no conversational state between calls: every `respond` and
/// `vote` works from the snapshot it is given. Without a generator the agent
/// is inert and never produces output.
pub struct Agent {
    id: AgentId,
    personality: Personality,
    seat: ParticipantHandle,
    directive: String,
    generator: Option<Arc<dyn ResponseGenerator>>,
}

impl Agent {
    pub fn new(
        seat: ParticipantHandle,
        personality: Personality,
        generator: Option<Arc<dyn ResponseGenerator>>,
    ) -> Self {
        if generator.is_none() {
            tracing::debug!("Agent '{}' has no generation backend and will stay silent", seat.identity());
        }
        Self {
            id: seat.identity().to_string(),
            personality,
            directive: format!("{} {}", WRITING_STYLE, personality.directive()),
            seat,
            generator,
        }
    }

    /// Create an agent from a personality name, rejecting names outside the closed set
    pub fn from_name(
        seat: ParticipantHandle,
        personality: &str,
        generator: Option<Arc<dyn ResponseGenerator>>,
    ) -> LycanResult<Self> {
        Ok(Self::new(seat, personality.parse()?, generator))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name this agent speaks under in the channel
    pub fn display_name(&self) -> &str {
        &self.id
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn seat(&self) -> &ParticipantHandle {
        &self.seat
    }

    pub fn directive(&self) -> &str {
        &self.directive
    }

    pub fn is_inert(&self) -> bool {
        self.generator.is_none()
    }

    /// Role-tag a conversation snapshot from this agent's point of view
    ///
    /// Attributed entries are tagged by their speaker. Unattributed entries
    /// are channel lines relayed as-is and go through the `<speaker> text`
    /// grammar.
    pub fn turns(&self, snapshot: &[ConversationEntry]) -> Vec<Turn> {
        snapshot
            .iter()
            .map(|entry| {
                if entry.speaker.is_empty() {
                    self.tag_line(&entry.text)
                } else {
                    self.tag_spoken(&entry.speaker, &entry.text)
                }
            })
            .collect()
    }

    fn tag_spoken(&self, speaker: &str, text: &str) -> Turn {
        if speaker == self.display_name() {
            Turn::own(text)
        } else {
            Turn::other(format!("{}: {}", speaker, text))
        }
    }

    fn tag_line(&self, line: &str) -> Turn {
        match ChatLine::parse(line) {
            ChatLine::Spoken { speaker, text } => self.tag_spoken(speaker, text),
            ChatLine::Raw(raw) => Turn::other(raw),
        }
    }

    /// Ask the generator what to say next
    ///
    /// Returns an empty string when inert or when the backend fails.
    #[instrument(skip(self, snapshot), fields(agent = %self.id))]
    pub async fn respond(&self, snapshot: &[ConversationEntry]) -> String {
        let turns = self.turns(snapshot);
        self.generate(&turns).await
    }

    /// Ask the generator who to vote for
    ///
    /// Only an exact, case-sensitive match against `candidates` counts as a
    /// vote. The abstain sentinel, partial matches and any extra text all
    /// yield `None`.
    #[instrument(skip(self, snapshot, candidates), fields(agent = %self.id))]
    pub async fn vote(&self, snapshot: &[ConversationEntry], candidates: &[String]) -> Option<String> {
        if candidates.is_empty() {
            tracing::debug!("No candidates to vote for");
            return None;
        }

        let mut turns = self.turns(snapshot);
        turns.push(Turn::other(format!(
            "It is time to vote. Choose one player to lynch from this list: {}. \
             Reply with exactly one name from the list and nothing else, or reply \"{}\" to abstain.",
            candidates.join(", "),
            ABSTAIN
        )));

        let output = self.generate(&turns).await;
        let choice = output.trim();
        if let Some(target) = candidates.iter().find(|c| c.as_str() == choice) {
            return Some(target.clone());
        }

        if choice == ABSTAIN {
            tracing::debug!("Agent abstained");
        } else {
            tracing::debug!("Discarding vote output '{}'", choice);
        }
        None
    }

    async fn generate(&self, turns: &[Turn]) -> String {
        let Some(ref generator) = self.generator else {
            return String::new();
        };
        match generator.complete(&self.directive, turns).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Generation via '{}' failed for agent '{}': {}", generator.name(), self.id, e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedGenerator;
    use crate::error::LycanError;
    use crate::game::ParticipantKind;

    fn agent_with(generator: Option<Arc<ScriptedGenerator>>) -> Agent {
        let seat = ParticipantHandle::new("1", ParticipantKind::Agent);
        Agent::new(seat, Personality::Cautious, generator.map(|g| g as Arc<dyn ResponseGenerator>))
    }

    fn entry(speaker: &str, text: &str) -> ConversationEntry {
        ConversationEntry::new(speaker, text)
    }

    #[test]
    fn test_directive_combines_style_and_personality() {
        let agent = agent_with(None);
        assert!(agent.directive().starts_with(WRITING_STYLE));
        assert!(agent.directive().ends_with(Personality::Cautious.directive()));
        assert!(agent.is_inert());
    }

    #[test]
    fn test_from_name_rejects_unknown_personality() {
        let seat = ParticipantHandle::new("1", ParticipantKind::Agent);
        let result = Agent::from_name(seat.clone(), "grumpy", None);
        assert!(matches!(result, Err(LycanError::UnknownPersonality(_))));

        let agent = Agent::from_name(seat, "quiet", None).unwrap();
        assert_eq!(agent.personality(), Personality::Quiet);
    }

    #[test]
    fn test_turn_tagging() {
        let agent = agent_with(None);
        let turns = agent.turns(&[
            entry("1", "i am innocent"),
            entry("alice", "sure"),
            entry("", "the sun rises"),
            entry("10", "hi"),
            entry("", "<1> relayed line"),
            entry("", "<bob> relayed too"),
        ]);

        assert_eq!(turns[0], Turn::own("i am innocent"));
        assert_eq!(turns[1], Turn::other("alice: sure"));
        assert_eq!(turns[2], Turn::other("the sun rises"));
        assert_eq!(turns[3].role, Role::Other);
        assert_eq!(turns[4], Turn::own("relayed line"));
        assert_eq!(turns[5], Turn::other("bob: relayed too"));
    }

    #[test]
    fn test_speaker_with_bracket_is_not_misattributed() {
        let agent = agent_with(None);
        let turns = agent.turns(&[entry("1>x", "who am i")]);
        assert_eq!(turns[0], Turn::other("1>x: who am i"));
    }

    #[tokio::test]
    async fn test_inert_agent_is_silent() {
        let agent = agent_with(None);
        assert_eq!(agent.respond(&[entry("alice", "hi")]).await, "");
        assert_eq!(agent.vote(&[], &["alice".to_string()]).await, None);
    }

    #[tokio::test]
    async fn test_respond_round_trip() {
        let generator = Arc::new(ScriptedGenerator::new(["hey"]));
        let agent = agent_with(Some(generator.clone()));

        assert_eq!(agent.respond(&[entry("1", "morning all")]).await, "hey");
        assert_eq!(agent.respond(&[entry("alice", "morning all")]).await, "hey");

        let calls = generator.calls();
        assert_eq!(calls[0], vec![Turn::own("morning all")]);
        assert_eq!(calls[1], vec![Turn::other("alice: morning all")]);
    }

    #[tokio::test]
    async fn test_respond_swallows_backend_failure() {
        let generator = Arc::new(ScriptedGenerator::failing("boom"));
        let agent = agent_with(Some(generator.clone()));
        assert_eq!(agent.respond(&[entry("alice", "hi")]).await, "");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_vote_exact_match_only() {
        let candidates = vec!["Alice".to_string(), "Bob".to_string()];
        let cases = [
            ("Bob", Some("Bob")),
            ("  Bob\n", Some("Bob")),
            ("bob", None),
            ("Charlie", None),
            ("Bob.", None),
            ("I vote Bob", None),
            (ABSTAIN, None),
        ];

        for (output, expected) in cases {
            let agent = agent_with(Some(Arc::new(ScriptedGenerator::new([output]))));
            assert_eq!(
                agent.vote(&[], &candidates).await.as_deref(),
                expected,
                "generator output {:?}",
                output
            );
        }
    }

    #[tokio::test]
    async fn test_vote_instruction_lists_candidates() {
        let generator = Arc::new(ScriptedGenerator::new(["none"]));
        let agent = agent_with(Some(generator.clone()));
        let candidates = vec!["Alice".to_string(), "Bob".to_string()];

        agent.vote(&[entry("Alice", "vote Bob")], &candidates).await;

        let turns = &generator.calls()[0];
        assert_eq!(turns.len(), 2);
        let instruction = &turns[1].text;
        assert!(instruction.contains("Alice, Bob"));
        assert!(instruction.contains("\"none\""));
    }

    #[tokio::test]
    async fn test_vote_without_candidates_skips_backend() {
        let generator = Arc::new(ScriptedGenerator::new(["Bob"]));
        let agent = agent_with(Some(generator.clone()));
        assert_eq!(agent.vote(&[], &[]).await, None);
        assert_eq!(generator.call_count(), 0);
    }
}
