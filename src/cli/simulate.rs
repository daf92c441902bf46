//! Unattended run of one day at a local table

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{bail, Result};
use crate::ai::ResponseGenerator;
use crate::game::{GameCollaborators, LocalTable, Phase, TableEvent};
use crate::session::Session;
use crate::Config;
use super::describe;

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub humans: usize,
    pub agents: usize,
    pub duration: Duration,
    /// Print table events as they happen
    pub echo: bool,
}

/// What the agents did during the day
#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub messages: Vec<(String, String)>,
    pub votes: BTreeMap<String, String>,
}

pub async fn run(
    config: Config,
    generator: Option<Arc<dyn ResponseGenerator>>,
    options: SimulationOptions,
) -> Result<SimulationReport> {
    if options.agents == 0 {
        bail!("a simulation needs at least one agent");
    }

    let (table, mut events) = LocalTable::with_events();
    let table = Arc::new(table);
    let session = Session::with_generator(config, GameCollaborators::from_table(table.clone()), generator);
    tracing::info!(session = %session.id(), "Simulating {} humans and {} agents", options.humans, options.agents);

    table.set_phase(Phase::Join);
    for i in 1..=options.humans {
        table.add_human(&format!("human{}", i));
    }
    for _ in 0..options.agents {
        let agent = session.create_agent(None);
        session.join_agent(agent.id())?;
    }

    table.set_phase(Phase::Day);
    session.on_phase_change(Phase::Day);
    for i in 1..=options.humans {
        session.record_message(&format!("human{}", i), "Good morning, village.");
    }

    let mut report = SimulationReport::default();
    let deadline = tokio::time::sleep(options.duration);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            Some(event) = events.recv() => {
                if options.echo {
                    println!("{}", describe(&event));
                }
                if let TableEvent::Message { speaker, text } = event {
                    report.messages.push((speaker, text));
                }
            }
        }
    }

    report.votes = table.votes();
    table.set_phase(Phase::Night);
    session.on_phase_change(Phase::Night);
    session.end();
    Ok(report)
}
