use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use crate::agent::{Agent, ConversationLog};
use crate::game::{GamePhaseOracle, MessagingCollaborator, Phase};
use crate::registry::AgentRegistry;
use super::periodic::{TickHandler, TickOutcome};
use super::selection::{first_success, trial_probability};
use super::{SharedRng, SpeakingPolicy};

/// Lets at most one agent speak per tick
pub struct SpeakingLoop {
    registry: Arc<AgentRegistry>,
    log: Arc<ConversationLog>,
    phase: Arc<dyn GamePhaseOracle>,
    messaging: Arc<dyn MessagingCollaborator>,
    eligible_phase: Phase,
    policy: SpeakingPolicy,
    rng: SharedRng,
}

impl SpeakingLoop {
    pub fn new(
        registry: Arc<AgentRegistry>,
        log: Arc<ConversationLog>,
        phase: Arc<dyn GamePhaseOracle>,
        messaging: Arc<dyn MessagingCollaborator>,
        eligible_phase: Phase,
        policy: SpeakingPolicy,
        rng: SharedRng,
    ) -> Self {
        Self {
            registry,
            log,
            phase,
            messaging,
            eligible_phase,
            policy,
            rng,
        }
    }

    /// Run a single tick
    pub async fn tick(&self) -> TickOutcome {
        let phase = self.phase.current_phase();
        if phase != self.eligible_phase {
            tracing::debug!("Phase is '{}', speaking loop going idle", phase);
            return TickOutcome::Stop;
        }

        let agents = self.registry.snapshot();
        if agents.is_empty() {
            tracing::debug!("No live agents, speaking loop going idle");
            return TickOutcome::Stop;
        }

        let Some(agent) = self.pick_speaker(&agents) else {
            tracing::debug!("Nobody spoke this tick");
            return TickOutcome::Rearm;
        };

        let reply = agent.respond(&self.log.snapshot()).await;
        let reply = reply.trim();
        if reply.is_empty() {
            tracing::debug!("Agent '{}' had nothing to say", agent.id());
            return TickOutcome::Rearm;
        }

        self.log.append(agent.id(), reply);
        self.messaging.broadcast(agent.id(), reply);
        TickOutcome::Rearm
    }

    /// At most one agent from `agents`; agents removed since the snapshot never win
    fn pick_speaker(&self, agents: &[Arc<Agent>]) -> Option<Arc<Agent>> {
        let mut rng = self.rng.lock();
        first_success(agents, trial_probability(agents.len()), &mut *rng, |agent| {
            self.registry.contains(agent.id())
        })
        .cloned()
    }
}

#[async_trait]
impl TickHandler for SpeakingLoop {
    fn name(&self) -> &'static str {
        "speaking"
    }

    fn next_delay(&self) -> Duration {
        self.policy.draw(self.registry.len(), &mut *self.rng.lock())
    }

    async fn on_tick(&self) -> TickOutcome {
        self.tick().await
    }
}
