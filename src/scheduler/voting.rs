use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use crate::agent::{Agent, ConversationLog};
use crate::game::{GamePhaseOracle, Phase, VoteCollaborator};
use crate::registry::AgentRegistry;
use super::periodic::{TickHandler, TickOutcome};
use super::selection::{first_success, trial_probability};
use super::{SharedRng, VotingPolicy};

/// Lets at most one agent vote per tick
///
/// An agent takes part only if it is alive, has not voted yet this phase and
/// has at least one living player other than itself to vote for.
pub struct VotingLoop {
    registry: Arc<AgentRegistry>,
    log: Arc<ConversationLog>,
    phase: Arc<dyn GamePhaseOracle>,
    votes: Arc<dyn VoteCollaborator>,
    eligible_phase: Phase,
    policy: VotingPolicy,
    rng: SharedRng,
}

impl VotingLoop {
    pub fn new(
        registry: Arc<AgentRegistry>,
        log: Arc<ConversationLog>,
        phase: Arc<dyn GamePhaseOracle>,
        votes: Arc<dyn VoteCollaborator>,
        eligible_phase: Phase,
        policy: VotingPolicy,
        rng: SharedRng,
    ) -> Self {
        Self {
            registry,
            log,
            phase,
            votes,
            eligible_phase,
            policy,
            rng,
        }
    }

    /// Run a single tick
    pub async fn tick(&self) -> TickOutcome {
        let phase = self.phase.current_phase();
        if phase != self.eligible_phase {
            tracing::debug!("Phase is '{}', voting loop going idle", phase);
            return TickOutcome::Stop;
        }

        let agents = self.registry.snapshot();
        if agents.is_empty() {
            tracing::debug!("No live agents, voting loop going idle");
            return TickOutcome::Stop;
        }

        let living = self.phase.living_participants();
        let Some(agent) = self.pick_voter(&agents, &living) else {
            tracing::debug!("Nobody voted this tick");
            return TickOutcome::Rearm;
        };

        let candidates: Vec<String> = living
            .iter()
            .filter(|name| name.as_str() != agent.id())
            .cloned()
            .collect();

        match agent.vote(&self.log.snapshot(), &candidates).await {
            Some(target) => {
                tracing::info!("Agent '{}' votes for '{}'", agent.id(), target);
                self.votes.cast_vote(agent.id(), &target);
            }
            None => tracing::debug!("Agent '{}' made no decision", agent.id()),
        }
        TickOutcome::Rearm
    }

    /// At most one agent that is still live, alive, has not voted and has someone to vote for
    fn pick_voter(&self, agents: &[Arc<Agent>], living: &BTreeSet<String>) -> Option<Arc<Agent>> {
        let mut rng = self.rng.lock();
        first_success(agents, trial_probability(agents.len()), &mut *rng, |agent| {
            let id = agent.id();
            self.registry.contains(id)
                && living.contains(id)
                && !self.votes.has_voted(id)
                && living.iter().any(|other| other != id)
        })
        .cloned()
    }
}

#[async_trait]
impl TickHandler for VotingLoop {
    fn name(&self) -> &'static str {
        "voting"
    }

    fn next_delay(&self) -> Duration {
        self.policy.draw(&mut *self.rng.lock())
    }

    async fn on_tick(&self) -> TickOutcome {
        self.tick().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedGenerator;
    use crate::game::{GameCollaborators, LocalTable};
    use crate::scheduler::shared_rng;

    fn voting_on(table: &Arc<LocalTable>, generator: Arc<ScriptedGenerator>) -> (Arc<AgentRegistry>, VotingLoop) {
        let collaborators = GameCollaborators::from_table(table.clone());
        let registry = Arc::new(AgentRegistry::new(&collaborators, Some(generator)));
        let voting = VotingLoop::new(
            registry.clone(),
            Arc::new(ConversationLog::default()),
            collaborators.phase.clone(),
            collaborators.votes.clone(),
            Phase::Day,
            VotingPolicy::default(),
            shared_rng(Some(5)),
        );
        (registry, voting)
    }

    #[tokio::test]
    async fn test_sole_survivor_has_nobody_to_vote_for() {
        let table = Arc::new(LocalTable::new());
        let generator = Arc::new(ScriptedGenerator::new(["alice"]));
        let (registry, voting) = voting_on(&table, generator.clone());
        table.set_phase(Phase::Join);
        table.add_human("alice");
        let agent = registry.create_agent(None);
        registry.join_agent(&agent);
        table.set_phase(Phase::Day);
        table.kill("alice");

        assert_eq!(table.living_participants().len(), 1);
        assert_eq!(voting.tick().await, TickOutcome::Rearm);
        assert_eq!(generator.call_count(), 0);
        assert!(table.votes().is_empty());
    }

    #[tokio::test]
    async fn test_agent_removed_after_snapshot_does_not_vote() {
        let table = Arc::new(LocalTable::new());
        let (registry, voting) = voting_on(&table, Arc::new(ScriptedGenerator::new(["alice"])));
        table.set_phase(Phase::Join);
        table.add_human("alice");
        let agent = registry.create_agent(None);
        registry.join_agent(&agent);
        table.set_phase(Phase::Day);

        let snapshot = registry.snapshot();
        let living = table.living_participants();
        assert!(voting.pick_voter(&snapshot, &living).is_some());

        registry.remove_agent(agent.id());
        for _ in 0..20 {
            assert!(voting.pick_voter(&snapshot, &living).is_none());
        }
    }
}
