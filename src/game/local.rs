use std::collections::{BTreeMap, BTreeSet, VecDeque};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use super::{
    GameMembership, GamePhaseOracle, MessagingCollaborator, ParticipantHandle, ParticipantKind,
    ParticipantMetadata, ParticipantNamespace, Phase, VoteCollaborator,
};

/// Observable things that happened at a [`LocalTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    Message { speaker: String, text: String },
    Vote { voter: String, target: String },
    Joined(String),
    Exited(String),
    PhaseChanged(Phase),
}

/// Broadcasts kept for [`LocalTable::transcript`]
pub const TRANSCRIPT_CAPACITY: usize = 500;

#[derive(Default)]
struct TableState {
    participants: BTreeMap<String, ParticipantHandle>,
    members: BTreeSet<String>,
    dead: BTreeSet<String>,
    votes: BTreeMap<String, String>,
    transcript: VecDeque<(String, String)>,
    phase: Phase,
}

/// In-memory game table implementing every collaborator contract
///
/// Votes are cleared on every phase change. Nothing here enforces game rules.
pub struct LocalTable {
    state: RwLock<TableState>,
    events: Option<mpsc::UnboundedSender<TableEvent>>,
}

impl Default for LocalTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalTable {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(TableState::default()),
            events: None,
        }
    }

    /// Create a table that reports everything it sees on a channel
    pub fn with_events() -> (Self, mpsc::UnboundedReceiver<TableEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let table = Self {
            state: RwLock::new(TableState::default()),
            events: Some(tx),
        };
        (table, rx)
    }

    fn emit(&self, event: TableEvent) {
        if let Some(ref tx) = self.events {
            // Receiver gone just means nobody is watching
            let _ = tx.send(event);
        }
    }

    /// Register a human and seat them in the game
    pub fn add_human(&self, nick: &str) -> ParticipantHandle {
        let handle = self.register(nick, ParticipantMetadata::human(nick, "local"));
        self.join(&handle);
        handle
    }

    pub fn set_phase(&self, phase: Phase) {
        {
            let mut state = self.state.write();
            state.phase = phase;
            state.votes.clear();
            if phase == Phase::None {
                state.members.clear();
                state.dead.clear();
            }
        }
        tracing::debug!("Local table entered phase '{}'", phase);
        self.emit(TableEvent::PhaseChanged(phase));
    }

    pub fn kill(&self, identity: &str) {
        self.state.write().dead.insert(identity.to_string());
    }

    pub fn votes(&self) -> BTreeMap<String, String> {
        self.state.read().votes.clone()
    }

    /// Most recent broadcasts, oldest first
    pub fn transcript(&self) -> Vec<(String, String)> {
        self.state.read().transcript.iter().cloned().collect()
    }

    pub fn members(&self) -> BTreeSet<String> {
        self.state.read().members.clone()
    }
}

impl GamePhaseOracle for LocalTable {
    fn current_phase(&self) -> Phase {
        self.state.read().phase
    }

    fn living_participants(&self) -> BTreeSet<String> {
        let state = self.state.read();
        state.members.difference(&state.dead).cloned().collect()
    }
}

impl ParticipantNamespace for LocalTable {
    fn exists(&self, identity: &str) -> bool {
        self.state.read().participants.contains_key(identity)
    }

    fn register(&self, identity: &str, metadata: ParticipantMetadata) -> ParticipantHandle {
        let handle = ParticipantHandle::new(identity, metadata.kind);
        self.state
            .write()
            .participants
            .insert(identity.to_string(), handle.clone());
        handle
    }

    fn unregister(&self, identity: &str) {
        self.state.write().participants.remove(identity);
    }

    fn lookup(&self, identity: &str) -> Option<ParticipantHandle> {
        self.state.read().participants.get(identity).cloned()
    }
}

impl MessagingCollaborator for LocalTable {
    fn broadcast(&self, speaker: &str, text: &str) {
        {
            let mut state = self.state.write();
            if state.transcript.len() == TRANSCRIPT_CAPACITY {
                state.transcript.pop_front();
            }
            state.transcript.push_back((speaker.to_string(), text.to_string()));
        }
        self.emit(TableEvent::Message {
            speaker: speaker.to_string(),
            text: text.to_string(),
        });
    }
}

impl VoteCollaborator for LocalTable {
    fn has_voted(&self, identity: &str) -> bool {
        self.state.read().votes.contains_key(identity)
    }

    fn cast_vote(&self, identity: &str, target: &str) {
        self.state
            .write()
            .votes
            .insert(identity.to_string(), target.to_string());
        self.emit(TableEvent::Vote {
            voter: identity.to_string(),
            target: target.to_string(),
        });
    }
}

impl GameMembership for LocalTable {
    fn join(&self, participant: &ParticipantHandle) {
        self.state
            .write()
            .members
            .insert(participant.identity().to_string());
        self.emit(TableEvent::Joined(participant.identity().to_string()));
    }

    fn force_exit(&self, participant: &ParticipantHandle) {
        {
            let mut state = self.state.write();
            state.members.remove(participant.identity());
            state.dead.remove(participant.identity());
            state.votes.remove(participant.identity());
        }
        self.emit(TableEvent::Exited(participant.identity().to_string()));
    }

    fn is_member(&self, identity: &str) -> bool {
        self.state.read().members.contains(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_living_excludes_dead() {
        let table = LocalTable::new();
        table.add_human("alice");
        table.add_human("bob");
        table.kill("bob");

        let living = table.living_participants();
        assert!(living.contains("alice"));
        assert!(!living.contains("bob"));
        assert_eq!(table.lookup("bob").map(|h| h.kind()), Some(ParticipantKind::Human));
    }

    #[test]
    fn test_phase_change_clears_votes() {
        let table = LocalTable::new();
        table.set_phase(Phase::Day);
        table.cast_vote("alice", "bob");
        assert!(table.has_voted("alice"));

        table.set_phase(Phase::Night);
        assert!(!table.has_voted("alice"));
        assert_eq!(table.current_phase(), Phase::Night);
    }

    #[test]
    fn test_transcript_is_bounded() {
        let table = LocalTable::new();
        assert_eq!(table.current_phase(), Phase::None);
        for i in 0..TRANSCRIPT_CAPACITY + 10 {
            table.broadcast("1", &i.to_string());
        }

        let transcript = table.transcript();
        assert_eq!(transcript.len(), TRANSCRIPT_CAPACITY);
        assert_eq!(transcript[0].1, "10");
    }

    #[test]
    fn test_events_are_reported() {
        let (table, mut rx) = LocalTable::with_events();
        table.broadcast("alice", "hi");
        assert_eq!(
            rx.try_recv().unwrap(),
            TableEvent::Message { speaker: "alice".into(), text: "hi".into() }
        );
    }
}
