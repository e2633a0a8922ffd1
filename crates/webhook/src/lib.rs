//! Workflow webhook client for Coscribe.
//!
//! Slash commands route here instead of the model. The endpoint is a single
//! configured workflow URL (typically an n8n webhook) that accepts two
//! request kinds: `research` and `prompt_enhancement`. Calls are synchronous
//! with a timeout and are never retried.

use async_trait::async_trait;
use coscribe_core::error::WebhookError;
use coscribe_core::webhook::WorkflowWebhook;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the configured workflow endpoint.
pub struct WorkflowClient {
    url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl WorkflowClient {
    /// Create a client for the given endpoint with the default 30s timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client with an explicit timeout in seconds.
    pub fn with_timeout(url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: url.into(),
            timeout_secs,
            client,
        }
    }

    /// Build a client from config. Errors if the webhook is enabled without
    /// a URL (config validation also rejects that, this is the last line).
    pub fn from_config(config: &coscribe_config::WebhookConfig) -> Result<Self, WebhookError> {
        let url = config.url.clone().ok_or_else(|| {
            WebhookError::NotConfigured("webhook.url is not set".into())
        })?;
        Ok(Self::with_timeout(url, config.timeout_secs))
    }

    async fn post(&self, payload: serde_json::Value) -> Result<String, WebhookError> {
        debug!(url = %self.url, kind = payload["type"].as_str().unwrap_or("?"), "Calling workflow webhook");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebhookError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    WebhookError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Webhook returned error status");
            return Err(WebhookError::Http { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| WebhookError::Network(e.to_string()))?;

        extract_response_text(&body)
    }
}

/// Payload for a `research` request. The attached document travels inside a
/// `context` object, matching what the workflow expects.
fn research_payload(query: &str, document_context: Option<&str>) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "query": query,
        "type": "research",
    });
    if let Some(doc) = document_context {
        payload["context"] = serde_json::json!({ "document": doc });
    }
    payload
}

/// Payload for a `prompt_enhancement` request. Here the document travels as
/// a flat `document_context` string.
fn enhancement_payload(prompt: &str, document_context: Option<&str>) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "prompt": prompt,
        "type": "prompt_enhancement",
    });
    if let Some(doc) = document_context {
        payload["document_context"] = serde_json::json!(doc);
    }
    payload
}

/// Pull the answer text out of a webhook response body.
///
/// A JSON object yields its `content`, `text`, or `output` string field
/// (first present); an object carrying an `error` string is a
/// webhook-reported failure. Any other non-empty body is returned verbatim.
fn extract_response_text(body: &str) -> Result<String, WebhookError> {
    if body.trim().is_empty() {
        return Err(WebhookError::InvalidResponse("empty response body".into()));
    }

    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(error) = map.get("error").and_then(|v| v.as_str()) {
            return Err(WebhookError::Reported(error.to_string()));
        }

        for field in ["content", "text", "output"] {
            if let Some(value) = map.get(field).and_then(|v| v.as_str()) {
                return Ok(value.to_string());
            }
        }
    }

    Ok(body.trim().to_string())
}

#[async_trait]
impl WorkflowWebhook for WorkflowClient {
    fn name(&self) -> &str {
        "workflow"
    }

    async fn research(
        &self,
        query: &str,
        document_context: Option<&str>,
    ) -> Result<String, WebhookError> {
        self.post(research_payload(query, document_context)).await
    }

    async fn enhance_prompt(
        &self,
        prompt: &str,
        document_context: Option<&str>,
    ) -> Result<String, WebhookError> {
        self.post(enhancement_payload(prompt, document_context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn research_payload_shape() {
        let payload = research_payload("quantum batteries", Some("Notes on energy storage"));
        assert_eq!(payload["query"], "quantum batteries");
        assert_eq!(payload["type"], "research");
        assert_eq!(payload["context"]["document"], "Notes on energy storage");
    }

    #[test]
    fn research_payload_without_document() {
        let payload = research_payload("quantum batteries", None);
        assert!(payload.get("context").is_none());
    }

    #[test]
    fn enhancement_payload_shape() {
        let payload = enhancement_payload("make it formal", Some("# Draft"));
        assert_eq!(payload["prompt"], "make it formal");
        assert_eq!(payload["type"], "prompt_enhancement");
        assert_eq!(payload["document_context"], "# Draft");
    }

    #[test]
    fn response_content_field_wins() {
        let body = r#"{"content": "the answer", "output": "ignored"}"#;
        assert_eq!(extract_response_text(body).unwrap(), "the answer");
    }

    #[test]
    fn response_text_field() {
        let body = r#"{"text": "from text field"}"#;
        assert_eq!(extract_response_text(body).unwrap(), "from text field");
    }

    #[test]
    fn response_output_field() {
        let body = r#"{"output": "from output field"}"#;
        assert_eq!(extract_response_text(body).unwrap(), "from output field");
    }

    #[test]
    fn response_error_field_is_a_failure() {
        let body = r#"{"error": "workflow node failed"}"#;
        let err = extract_response_text(body).unwrap_err();
        assert!(matches!(err, WebhookError::Reported(msg) if msg == "workflow node failed"));
    }

    #[test]
    fn plain_text_response_passes_through() {
        let body = "Just some plain text result\n";
        assert_eq!(
            extract_response_text(body).unwrap(),
            "Just some plain text result"
        );
    }

    #[test]
    fn object_without_known_fields_passes_through() {
        let body = r#"{"summary": "nothing standard here"}"#;
        assert_eq!(extract_response_text(body).unwrap(), body);
    }

    #[test]
    fn empty_response_is_invalid() {
        let err = extract_response_text("   ").unwrap_err();
        assert!(matches!(err, WebhookError::InvalidResponse(_)));
    }

    #[test]
    fn from_config_requires_url() {
        let config = coscribe_config::WebhookConfig::default();
        assert!(matches!(
            WorkflowClient::from_config(&config),
            Err(WebhookError::NotConfigured(_))
        ));
    }

    #[test]
    fn from_config_uses_configured_timeout() {
        let config = coscribe_config::WebhookConfig {
            enabled: true,
            url: Some("https://n8n.example/webhook/coscribe".into()),
            timeout_secs: 10,
        };
        let client = WorkflowClient::from_config(&config).unwrap();
        assert_eq!(client.timeout_secs, 10);
        assert_eq!(client.url, "https://n8n.example/webhook/coscribe");
    }
}
