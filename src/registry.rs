//! Live agents of a session and their seats in the host game

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use rand::Rng;
use crate::agent::{Agent, Personality};
use crate::ai::ResponseGenerator;
use crate::error::{LycanError, LycanResult};
use crate::game::{
    GameCollaborators, GameMembership, GamePhaseOracle, ParticipantMetadata, ParticipantNamespace,
};

/// Owns the set of live agents
///
/// Agents are kept in creation order and identities are unique. Every agent
/// gets a numeric nick that is free in the participant namespace at the time
/// it is minted.
pub struct AgentRegistry {
    agents: RwLock<Vec<Arc<Agent>>>,
    nick_counter: AtomicU64,
    namespace: Arc<dyn ParticipantNamespace>,
    membership: Arc<dyn GameMembership>,
    phase: Arc<dyn GamePhaseOracle>,
    generator: Option<Arc<dyn ResponseGenerator>>,
}

impl AgentRegistry {
    pub fn new(collaborators: &GameCollaborators, generator: Option<Arc<dyn ResponseGenerator>>) -> Self {
        Self {
            agents: RwLock::new(Vec::new()),
            nick_counter: AtomicU64::new(0),
            namespace: collaborators.namespace.clone(),
            membership: collaborators.membership.clone(),
            phase: collaborators.phase.clone(),
            generator,
        }
    }

    /// Create and register a new agent
    ///
    /// Without a personality one is picked uniformly at random. The nick
    /// search has no upper bound: a namespace that holds every number would
    /// keep this looping.
    pub fn create_agent(&self, personality: Option<Personality>) -> Arc<Agent> {
        let personality = personality.unwrap_or_else(|| {
            let index = rand::thread_rng().gen_range(0..Personality::ALL.len());
            Personality::ALL[index]
        });

        let nick = loop {
            let candidate = (self.nick_counter.fetch_add(1, Ordering::SeqCst) + 1).to_string();
            if !self.namespace.exists(&candidate) && self.get_agent(&candidate).is_none() {
                break candidate;
            }
            tracing::debug!("Nick '{}' is taken, trying the next one", candidate);
        };

        let seat = self.namespace.register(&nick, ParticipantMetadata::agent());
        let agent = Arc::new(Agent::new(seat, personality, self.generator.clone()));
        self.agents.write().push(agent.clone());

        tracing::info!("Created agent '{}' ({})", nick, personality);
        agent
    }

    /// Seat an agent in the running game. Must not be called twice for one agent.
    pub fn join_agent(&self, agent: &Agent) {
        self.membership.join(agent.seat());
        tracing::info!("Agent '{}' joined the game", agent.id());
    }

    pub fn join_agent_by_id(&self, identity: &str) -> LycanResult<()> {
        let agent = self
            .get_agent(identity)
            .ok_or_else(|| LycanError::AgentNotFound(identity.to_string()))?;
        self.join_agent(&agent);
        Ok(())
    }

    /// Remove a live agent, pulling it out of the game first if needed
    ///
    /// Returns `false` when no such agent is live.
    pub fn remove_agent(&self, identity: &str) -> bool {
        let removed = {
            let mut agents = self.agents.write();
            agents
                .iter()
                .position(|a| a.id() == identity)
                .map(|index| agents.remove(index))
        };
        let Some(agent) = removed else {
            return false;
        };

        if self.phase.current_phase().has_game() && self.membership.is_member(identity) {
            self.membership.force_exit(agent.seat());
        }
        self.namespace.unregister(identity);

        tracing::info!("Removed agent '{}'", identity);
        true
    }

    pub fn get_agent(&self, identity: &str) -> Option<Arc<Agent>> {
        self.agents
            .read()
            .iter()
            .find(|a| a.id() == identity)
            .cloned()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.agents.read().iter().any(|a| a.id() == identity)
    }

    pub fn clear_all(&self) {
        let ids: Vec<String> = self.agents.read().iter().map(|a| a.id().to_string()).collect();
        for id in ids {
            self.remove_agent(&id);
        }
    }

    /// Point-in-time copy of the live agents, in creation order
    pub fn snapshot(&self) -> Vec<Arc<Agent>> {
        self.agents.read().clone()
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }
}
