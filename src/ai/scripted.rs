use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use parking_lot::Mutex;
use crate::agent::Turn;
use crate::error::{LycanError, LycanResult};
use super::ResponseGenerator;

/// Offline generator that cycles through canned replies
///
/// Every request is recorded, which makes it handy for inspecting what an
/// agent would have sent to a real model.
pub struct ScriptedGenerator {
    replies: Vec<String>,
    next: AtomicUsize,
    failure: Option<String>,
    calls: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with `reason`
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new(Vec::<String>::new())
        }
    }

    /// Turns received by each call so far
    pub fn calls(&self) -> Vec<Vec<Turn>> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _directive: &str, turns: &[Turn]) -> LycanResult<String> {
        self.calls.lock().push(turns.to_vec());

        if let Some(ref reason) = self.failure {
            return Err(LycanError::Generation(reason.clone()));
        }
        if self.replies.is_empty() {
            return Ok(String::new());
        }
        let index = self.next.fetch_add(1, Ordering::SeqCst) % self.replies.len();
        Ok(self.replies[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cycles_replies() {
        let generator = ScriptedGenerator::new(["a", "b"]);
        assert_eq!(generator.complete("", &[]).await.unwrap(), "a");
        assert_eq!(generator.complete("", &[]).await.unwrap(), "b");
        assert_eq!(generator.complete("", &[Turn::other("x")]).await.unwrap(), "a");
        assert_eq!(generator.call_count(), 3);
        assert_eq!(generator.calls()[2], vec![Turn::other("x")]);
    }

    #[tokio::test]
    async fn test_failing() {
        let generator = ScriptedGenerator::failing("quota exceeded");
        assert!(generator.complete("", &[]).await.is_err());
        assert_eq!(generator.call_count(), 1);
    }
}
