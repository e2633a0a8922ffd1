//! Research tool backed by the Perplexity Sonar API.
//!
//! The model calls this when a question needs current facts or sources.
//! `SonarClient` speaks the Sonar chat-completions dialect; `ResearchTool`
//! wraps it behind the `Tool` trait and optionally attaches the current
//! document as context for the lookup.

use std::sync::Arc;

use async_trait::async_trait;
use coscribe_core::error::{Error, ProviderError, ToolError};
use coscribe_core::tool::{Tool, ToolResult};
use coscribe_document::DocumentHandle;
use serde::Deserialize;
use tracing::{debug, warn};

/// Sonar models and what they are good at.
pub const SONAR_MODELS: &[(&str, &str)] = &[
    ("sonar-reasoning", "Best for research and analysis"),
    (
        "sonar-reasoning-pro",
        "Enhanced research capabilities with improved reasoning",
    ),
    (
        "sonar-deep-research",
        "Specialized for in-depth research with comprehensive citations",
    ),
    ("sonar-small", "Faster, less detailed responses"),
    ("sonar-medium", "Balanced performance and detail"),
    ("sonar-large", "Most comprehensive responses"),
];

/// Whether `name` is one of the supported Sonar models.
pub fn is_known_model(name: &str) -> bool {
    SONAR_MODELS.iter().any(|(m, _)| *m == name)
}

/// Something that can answer a research question with cited text.
///
/// The seam exists so the dispatch loop can be tested without the network
/// and so an alternate backend can be swapped in per configuration.
#[async_trait]
pub trait ResearchBackend: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, ProviderError>;
}

/// HTTP client for the Sonar API.
pub struct SonarClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl SonarClient {
    /// Create a client. Rejects an empty key and unknown model names, the
    /// same inputs the API itself would refuse later.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::Config {
                message: "research API key is required".into(),
            });
        }

        let model = model.into();
        if !is_known_model(&model) {
            let names: Vec<&str> = SONAR_MODELS.iter().map(|(m, _)| *m).collect();
            return Err(Error::Config {
                message: format!(
                    "unknown research model '{}'. Available models: {}",
                    model,
                    names.join(", ")
                ),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model,
            client,
        })
    }

    /// Build a client from config. Errors if no API key is available.
    pub fn from_config(config: &coscribe_config::ResearchConfig) -> Result<Self, Error> {
        let api_key = config.api_key.clone().unwrap_or_default();
        Self::new(api_key, &config.base_url, &config.model, config.timeout_secs)
    }

    fn build_payload(&self, question: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "Be precise and concise."},
                {"role": "user", "content": question}
            ],
            "temperature": 0.2,
            "top_p": 0.9,
            "return_images": false,
            "return_related_questions": false,
            "search_recency_filter": "month",
            "top_k": 0,
            "stream": false,
            "presence_penalty": 0,
            "frequency_penalty": 1
        })
    }
}

#[async_trait]
impl ResearchBackend for SonarClient {
    async fn ask(&self, question: &str) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model, "Sending research request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_payload(question))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid research API key".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Research API returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: SonarResponse =
            response.json().await.map_err(|e| {
                ProviderError::InvalidResponse(format!("Failed to parse response: {e}"))
            })?;

        Ok(format_answer(&api_response))
    }
}

#[derive(Debug, Deserialize)]
struct SonarResponse {
    #[serde(default)]
    choices: Vec<SonarChoice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SonarChoice {
    message: SonarMessage,
}

#[derive(Debug, Deserialize)]
struct SonarMessage {
    #[serde(default)]
    content: String,
}

/// Render the answer with its citation list.
fn format_answer(response: &SonarResponse) -> String {
    let mut formatted = String::from("Answer:\n");

    for choice in &response.choices {
        formatted.push_str(&choice.message.content);
    }

    if !response.citations.is_empty() {
        formatted.push_str("\n\nCitations:\n");
        for citation in &response.citations {
            formatted.push_str(&format!("- {citation}\n"));
        }
    }

    formatted
}

/// The `research` tool declared to the model.
pub struct ResearchTool {
    backend: Arc<dyn ResearchBackend>,
    document: DocumentHandle,
}

impl ResearchTool {
    pub fn new(backend: Arc<dyn ResearchBackend>, document: DocumentHandle) -> Self {
        Self { backend, document }
    }
}

#[async_trait]
impl Tool for ResearchTool {
    fn name(&self) -> &str {
        "research"
    }

    fn description(&self) -> &str {
        "Research a topic using live web sources and return a cited answer. \
         Use this for current events, recent developments, or any fact that \
         may have changed since your training data."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question to research"
                },
                "include_document_context": {
                    "type": "boolean",
                    "description": "Attach the current document so the research accounts for what is already written (default false)",
                    "default": false
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        if query.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "'query' must not be empty".into(),
            ));
        }

        let include_context = arguments["include_document_context"]
            .as_bool()
            .unwrap_or(false);

        let question = if include_context {
            let document = self.document.current().await.content;
            if document.trim().is_empty() {
                query.to_string()
            } else {
                format!("{query}\n\nContext from the document being written:\n{document}")
            }
        } else {
            query.to_string()
        };

        let answer =
            self.backend
                .ask(&question)
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "research".into(),
                    reason: e.to_string(),
                })?;

        Ok(ToolResult::ok(String::new(), answer))
    }
}
