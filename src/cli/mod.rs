//! Terminal front-ends over a [`LocalTable`](crate::game::LocalTable)

pub mod console;
pub mod simulate;

use crate::game::TableEvent;

/// One line of output for something that happened at the table
pub fn describe(event: &TableEvent) -> String {
    match event {
        TableEvent::Message { speaker, text } => format!("<{}> {}", speaker, text),
        TableEvent::Vote { voter, target } => format!("* {} votes for {}", voter, target),
        TableEvent::Joined(nick) => format!("* {} joined the game", nick),
        TableEvent::Exited(nick) => format!("* {} left the game", nick),
        TableEvent::PhaseChanged(phase) => format!("* phase is now {}", phase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Phase;

    #[test]
    fn test_describe() {
        let message = TableEvent::Message { speaker: "3".into(), text: "hmm".into() };
        assert_eq!(describe(&message), "<3> hmm");
        assert_eq!(
            describe(&TableEvent::Vote { voter: "3".into(), target: "bob".into() }),
            "* 3 votes for bob"
        );
        assert_eq!(describe(&TableEvent::PhaseChanged(Phase::Night)), "* phase is now night");
    }
}
