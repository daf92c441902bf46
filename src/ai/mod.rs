//! Natural-language generation backends

#[cfg(feature = "gemini")]
mod gemini;
mod scripted;

#[cfg(feature = "gemini")]
pub use gemini::GeminiGenerator;
pub use scripted::ScriptedGenerator;

use std::sync::Arc;
use async_trait::async_trait;
use crate::agent::Turn;
use crate::error::LycanResult;
use crate::Config;

/// Produces the text an agent says next
///
/// `directive` is the agent's fixed system instruction; `turns` is the
/// role-tagged conversation, oldest first.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, directive: &str, turns: &[Turn]) -> LycanResult<String>;
}

/// Build the configured backend, or `None` when agents should run inert
#[cfg(feature = "gemini")]
pub fn backend_from_config(config: &Config) -> Option<Arc<dyn ResponseGenerator>> {
    let model = config.model_name.as_deref().filter(|m| !m.trim().is_empty())?;
    match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(api_key) => {
            let timeout = std::time::Duration::from_secs(config.request_timeout_secs.max(1));
            match GeminiGenerator::new(api_key, model, timeout) {
                Ok(generator) => {
                    tracing::info!("Using Gemini model '{}' for agent replies", model);
                    Some(Arc::new(generator))
                }
                Err(e) => {
                    tracing::warn!("{}; agents will stay silent", e);
                    None
                }
            }
        }
        None => {
            tracing::warn!("Model '{}' configured without an API key; agents will stay silent", model);
            None
        }
    }
}

#[cfg(not(feature = "gemini"))]
pub fn backend_from_config(config: &Config) -> Option<Arc<dyn ResponseGenerator>> {
    if config.model_name.is_some() {
        tracing::warn!("gemini feature is disabled; agents will stay silent");
    }
    None
}
