//! One game session: log, registry and loops behind a single handle

use std::sync::Arc;
use uuid::Uuid;
use crate::agent::{Agent, ConversationLog, Personality};
use crate::ai::{self, ResponseGenerator};
use crate::commands::{self, AgentCommand};
use crate::error::LycanResult;
use crate::game::{GameCollaborators, Phase};
use crate::registry::AgentRegistry;
use crate::scheduler::{shared_rng, Scheduler, SpeakingLoop, VotingLoop};
use crate::Config;

/// Everything that lives for the duration of one game session
///
/// Nothing here is process-global; drop the session (or call [`Session::end`])
/// and all of its state goes with it.
pub struct Session {
    id: Uuid,
    config: Config,
    log: Arc<ConversationLog>,
    registry: Arc<AgentRegistry>,
    speaking: Arc<SpeakingLoop>,
    voting: Arc<VotingLoop>,
    scheduler: Scheduler,
    collaborators: GameCollaborators,
}

impl Session {
    /// Create a session using the generation backend described by `config`
    pub fn new(config: Config, collaborators: GameCollaborators) -> Self {
        let generator = ai::backend_from_config(&config);
        Self::with_generator(config, collaborators, generator)
    }

    pub fn with_generator(
        config: Config,
        collaborators: GameCollaborators,
        generator: Option<Arc<dyn ResponseGenerator>>,
    ) -> Self {
        let id = Uuid::new_v4();
        let log = Arc::new(ConversationLog::new(config.log_capacity));
        let registry = Arc::new(AgentRegistry::new(&collaborators, generator));
        let rng = shared_rng(config.rng_seed);

        let speaking = Arc::new(SpeakingLoop::new(
            registry.clone(),
            log.clone(),
            collaborators.phase.clone(),
            collaborators.messaging.clone(),
            config.eligible_phase,
            config.speaking,
            rng.clone(),
        ));
        let voting = Arc::new(VotingLoop::new(
            registry.clone(),
            log.clone(),
            collaborators.phase.clone(),
            collaborators.votes.clone(),
            config.eligible_phase,
            config.voting,
            rng,
        ));
        let scheduler = Scheduler::new(speaking.clone(), voting.clone());

        tracing::info!(session = %id, "Session created (log capacity {})", log.capacity());
        Self {
            id,
            config,
            log,
            registry,
            speaking,
            voting,
            scheduler,
            collaborators,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn log(&self) -> &Arc<ConversationLog> {
        &self.log
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn speaking_loop(&self) -> &Arc<SpeakingLoop> {
        &self.speaking
    }

    pub fn voting_loop(&self) -> &Arc<VotingLoop> {
        &self.voting
    }

    pub fn collaborators(&self) -> &GameCollaborators {
        &self.collaborators
    }

    /// Record an inbound chat message
    pub fn record_message(&self, speaker: &str, text: &str) {
        self.log.append(speaker, text);
    }

    /// Record a relayed `<speaker> text` line whose speaker is not known
    /// separately; agents parse it when building their turns
    pub fn record_line(&self, line: &str) {
        self.log.append("", line);
    }

    /// React to the host game changing phase
    pub fn on_phase_change(&self, phase: Phase) {
        tracing::debug!(session = %self.id, "Phase changed to '{}'", phase);
        self.sync_loops(phase);
    }

    /// Re-check whether the loops should be running
    pub fn refresh(&self) {
        self.sync_loops(self.collaborators.phase.current_phase());
    }

    fn sync_loops(&self, phase: Phase) {
        if phase == self.config.eligible_phase && !self.registry.is_empty() {
            self.scheduler.start_all();
        } else {
            self.scheduler.stop_all();
        }
    }

    pub fn create_agent(&self, personality: Option<Personality>) -> Arc<Agent> {
        let agent = self.registry.create_agent(personality);
        self.refresh();
        agent
    }

    pub fn join_agent(&self, identity: &str) -> LycanResult<()> {
        self.registry.join_agent_by_id(identity)
    }

    pub fn remove_agent(&self, identity: &str) -> bool {
        let removed = self.registry.remove_agent(identity);
        if removed {
            self.refresh();
        }
        removed
    }

    /// Parse and run an operator command, returning the reply
    pub fn execute(&self, line: &str) -> String {
        match line.parse::<AgentCommand>() {
            Ok(command) => commands::execute(self, command),
            Err(e) => e.to_string(),
        }
    }

    /// Tear the session down: stop loops, remove every agent, forget the chat
    pub fn end(&self) {
        self.scheduler.stop_all();
        self.registry.clear_all();
        self.log.clear();
        tracing::info!(session = %self.id, "Session ended");
    }
}
