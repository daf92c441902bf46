use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use crate::agent::{Role, Turn};
use crate::error::{LycanError, LycanResult};
use super::ResponseGenerator;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Gemini `generateContent` client
///
/// The key travels in the `x-goog-api-key` header, so request URLs never
/// carry it.
pub struct GeminiGenerator {
    api_key: String,
    http_client: HttpClient,
    model: String,
}

impl GeminiGenerator {
    /// Build a client whose requests give up after `request_timeout`
    pub fn new(api_key: &str, model: &str, request_timeout: Duration) -> LycanResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(request_timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()
            .map_err(|e| LycanError::BackendUnavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.to_string(),
            http_client,
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", BASE_URL, self.model)
    }

    fn build_request(directive: &str, turns: &[Turn]) -> Value {
        let mut contents: Vec<Value> = turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::Own => "model",
                    Role::Other => "user",
                };
                json!({ "role": role, "parts": [{ "text": turn.text }] })
            })
            .collect();

        // The API rejects an empty conversation
        if contents.is_empty() {
            contents.push(json!({ "role": "user", "parts": [{ "text": "Nobody has said anything yet." }] }));
        }

        json!({
            "system_instruction": { "parts": [{ "text": directive }] },
            "contents": contents,
        })
    }

    fn parse_response(response: &Value) -> LycanResult<String> {
        let parts = response
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| LycanError::Generation("Gemini response has no candidates".to_string()))?;

        Ok(parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl ResponseGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, directive: &str, turns: &[Turn]) -> LycanResult<String> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(directive, turns))
            .send()
            .await
            .map_err(|e| LycanError::Generation(format!("Network error: {}", e.without_url())))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LycanError::Generation(format!("HTTP {}: {}", status, error_text)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LycanError::Generation(format!("Failed to parse response: {}", e.without_url())))?;

        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_maps_roles() {
        let turns = vec![Turn::other("alice: who is it?"), Turn::own("not me")];
        let request = GeminiGenerator::build_request("be brief", &turns);

        assert_eq!(request["system_instruction"]["parts"][0]["text"], "be brief");
        assert_eq!(request["contents"][0]["role"], "user");
        assert_eq!(request["contents"][1]["role"], "model");
        assert_eq!(request["contents"][1]["parts"][0]["text"], "not me");
    }

    #[test]
    fn test_request_never_empty() {
        let request = GeminiGenerator::build_request("be brief", &[]);
        assert_eq!(request["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "bob " }, { "text": "did it" }] } }]
        });
        assert_eq!(GeminiGenerator::parse_response(&body).unwrap(), "bob did it");

        let blocked = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(GeminiGenerator::parse_response(&blocked).is_err());
    }

    #[test]
    fn test_endpoint_keeps_key_out_of_url() {
        let generator =
            GeminiGenerator::new("secret-key", "gemini-2.5-flash", Duration::from_secs(5)).unwrap();
        let endpoint = generator.endpoint();
        assert!(endpoint.ends_with("/models/gemini-2.5-flash:generateContent"));
        assert!(!endpoint.contains("secret-key"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_times_out() {
        // Non-routable address: the connect attempt hangs until the timeout fires
        let generator = GeminiGenerator {
            api_key: "secret-key".to_string(),
            http_client: HttpClient::builder()
                .timeout(Duration::from_millis(200))
                .build()
                .unwrap(),
            model: "gemini-2.5-flash".to_string(),
        };
        let started = std::time::Instant::now();
        let err = generator
            .http_client
            .post("http://10.255.255.1/models/x:generateContent")
            .header("x-goog-api-key", &generator.api_key)
            .send()
            .await
            .map_err(|e| e.without_url().to_string())
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!err.contains("secret-key"));
    }
}
