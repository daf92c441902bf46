//! Shared conversation history for all agents of a session

use std::collections::VecDeque;
use parking_lot::RwLock;
use super::types::ConversationEntry;

/// Default number of entries kept
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded, insertion-ordered chat history
///
/// When full, appending evicts the oldest entry. Readers always get a copy,
/// taken under the same lock as writers, so a snapshot never sees a
/// half-applied append.
pub struct ConversationLog {
    entries: RwLock<VecDeque<ConversationEntry>>,
    capacity: usize,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ConversationLog {
    /// Create a log holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Add a message, evicting the oldest one if the log is full
    pub fn append(&self, speaker: &str, text: &str) {
        let entry = ConversationEntry::new(speaker, text);
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copy of the current entries, oldest first
    pub fn snapshot(&self) -> Vec<ConversationEntry> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_append_and_snapshot() {
        let log = ConversationLog::new(10);
        log.append("alice", "hello");
        log.append("bob", "hi");

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].speaker, "alice");
        assert_eq!(snapshot[1].text, "hi");
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let log = ConversationLog::new(3);
        for i in 0..10 {
            log.append("alice", &i.to_string());
            assert!(log.len() <= 3);
        }

        let texts: Vec<String> = log.snapshot().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["7", "8", "9"]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let log = ConversationLog::new(5);
        log.append("alice", "one");
        let snapshot = log.snapshot();
        log.append("bob", "two");
        log.clear();

        assert_eq!(snapshot.len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_default_keeps_order() {
        let log = ConversationLog::default();
        assert_eq!(log.capacity(), DEFAULT_CAPACITY);
        log.append("a", "1");
        log.append("b", "2");
        log.append("c", "3");

        let speakers: Vec<String> = log.snapshot().into_iter().map(|e| e.speaker).collect();
        assert_eq!(speakers, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_concurrent_appends_respect_capacity() {
        let log = Arc::new(ConversationLog::new(50));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        log.append(&format!("t{}", t), &i.to_string());
                        assert!(log.snapshot().len() <= 50);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(log.len(), 50);
    }
}
