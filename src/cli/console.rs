use std::io::{self, Write};
use std::sync::Arc;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use crate::ai::ResponseGenerator;
use crate::game::{GameCollaborators, LocalTable, Phase};
use crate::session::Session;
use crate::Config;
use super::describe;

const HELP: &str = "\
Plain text is said by you. Other commands:
  !addagent [personality]   !removeagent <nick>   !listagents   !joinagent <nick>
  :phase <none|join|day|night>
  :say <nick> <text>        speak as someone else
  :relay <nick> <text>      feed a raw relayed line
  :join <nick>              seat a human player
  :kill <nick>
  :votes
  :log
  exit";

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

pub async fn run(config: Config, generator: Option<Arc<dyn ResponseGenerator>>) -> Result<()> {
    let (table, mut events) = LocalTable::with_events();
    let table = Arc::new(table);
    let session = Session::with_generator(config, GameCollaborators::from_table(table.clone()), generator);

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("{}", describe(&event));
        }
    });

    println!("Welcome to the lycan console");
    println!("Type ':help' for commands or 'exit' to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("Enter your nick: ");
    io::stdout().flush()?;
    let nick = match lines.next_line().await? {
        Some(line) if !line.trim().is_empty() => line.trim().to_string(),
        _ => "operator".to_string(),
    };
    table.add_human(&nick);

    loop {
        prompt()?;
        let Some(input) = lines.next_line().await? else {
            break;
        };
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }

        if input.starts_with('!') {
            println!("{}", session.execute(input));
            continue;
        }

        if let Some(rest) = input.strip_prefix(':') {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            match parts[0] {
                "help" => println!("{}", HELP),
                "phase" if parts.len() == 2 => match parts[1].parse::<Phase>() {
                    Ok(phase) => {
                        table.set_phase(phase);
                        session.on_phase_change(phase);
                    }
                    Err(e) => eprintln!("Error: {}", e),
                },
                "say" if parts.len() >= 3 => {
                    session.record_message(parts[1], &parts[2..].join(" "));
                }
                "relay" if parts.len() >= 3 => {
                    session.record_line(&format!("<{}> {}", parts[1], parts[2..].join(" ")));
                }
                "join" if parts.len() == 2 => {
                    table.add_human(parts[1]);
                }
                "kill" if parts.len() == 2 => {
                    table.kill(parts[1]);
                    println!("{} is dead.", parts[1]);
                }
                "votes" => {
                    let votes = table.votes();
                    if votes.is_empty() {
                        println!("No votes yet.");
                    }
                    for (voter, target) in votes {
                        println!("  {} -> {}", voter, target);
                    }
                }
                "log" => {
                    for entry in session.log().snapshot() {
                        println!("  [{}] {}", entry.timestamp.format("%H:%M:%S"), entry);
                    }
                }
                _ => eprintln!("Unknown command. Type ':help' for the list."),
            }
            continue;
        }

        session.record_message(&nick, input);
    }

    session.end();
    printer.abort();
    println!("Goodbye!");
    Ok(())
}
