//! Remote assistant client.
//!
//! Sends one question plus the replayed conversation to Gemini's
//! `generateContent` endpoint with web search enabled and normalizes the
//! answer into text plus citations.
//!
//! API documentation: https://ai.google.dev/api/generate-content

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::env::{AiEnvironment, PROVIDER_ID};
use crate::error::AiError;
use crate::prompt::{system_instruction, user_prompt};
use crate::types::{AssistantReply, ChatTurn, Citation, EMPTY_REPLY};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Remote Assistant Trait
// ============================================================================

/// A model that can answer market questions.
///
/// The session only depends on this trait, so tests can plug in fakes that
/// never touch the network.
#[async_trait]
pub trait RemoteAssistant: Send + Sync {
    /// Ask `question` given the prior `history` and an optional stock context.
    ///
    /// `history` must not contain the question itself.
    async fn ask(
        &self,
        question: &str,
        history: &[ChatTurn],
        context: Option<&str>,
    ) -> Result<AssistantReply, AiError>;
}

/// Configuration for the Gemini client.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    /// Model ID (e.g., "gemini-2.5-flash").
    pub model: String,
    /// API root, without the `/v1beta` suffix.
    pub base_url: String,
    /// Temperature for sampling.
    pub temperature: f32,
    /// Attach the Google Search tool so answers can cite fresh sources.
    pub web_search: bool,
    /// Transport-level timeout for a single call.
    pub timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            web_search: true,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

// ============================================================================
// API Request Structures
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// ============================================================================
// GeminiAssistant
// ============================================================================

/// [`RemoteAssistant`] backed by the Gemini REST API.
pub struct GeminiAssistant<E: AiEnvironment> {
    env: Arc<E>,
    client: Client,
    config: AssistantConfig,
}

impl<E: AiEnvironment> GeminiAssistant<E> {
    pub fn new(env: Arc<E>, config: AssistantConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            env,
            client,
            config,
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(
        &self,
        question: &str,
        history: &[ChatTurn],
        context: Option<&str>,
    ) -> GenerateContentRequest {
        let tools = if self.config.web_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            system_instruction: Content::text(None, system_instruction(context)),
            contents: vec![Content::text(Some("user"), user_prompt(question, history))],
            tools,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        }
    }

    /// POST the request and return the raw response body.
    async fn fetch(&self, api_key: &str, body: &GenerateContentRequest) -> Result<String, AiError> {
        let url = self.endpoint();
        debug!(
            "Gemini request: model {} with {} tools",
            self.config.model,
            body.tools.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    AiError::Provider(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited(PROVIDER_ID.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                if let Some(message) = error_resp.error.message {
                    return Err(AiError::Provider(format!("HTTP {} - {}", status, message)));
                }
            }

            return Err(AiError::Provider(format!("HTTP {} - {}", status, body)));
        }

        response
            .text()
            .await
            .map_err(|e| AiError::Provider(format!("Failed to read response: {}", e)))
    }

    async fn generate(
        &self,
        question: &str,
        history: &[ChatTurn],
        context: Option<&str>,
    ) -> Result<AssistantReply, AiError> {
        let api_key = self.env.api_key()?;
        let request = self.build_request(question, history, context);
        let text = self.fetch(&api_key, &request).await?;
        parse_response(&text)
    }
}

#[async_trait]
impl<E: AiEnvironment + 'static> RemoteAssistant for GeminiAssistant<E> {
    async fn ask(
        &self,
        question: &str,
        history: &[ChatTurn],
        context: Option<&str>,
    ) -> Result<AssistantReply, AiError> {
        let result = self.generate(question, history, context).await;
        if let Err(e) = &result {
            error!("Gemini API Error: {}", e);
        }
        result
    }
}

fn parse_response(body: &str) -> Result<AssistantReply, AiError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| AiError::Provider(format!("Failed to parse response: {}", e)))?;
    Ok(normalize_response(response))
}

/// Text of the first candidate (or the fixed empty-reply text) plus its web
/// citations in order. Chunks without a URI are skipped.
fn normalize_response(response: GenerateContentResponse) -> AssistantReply {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return AssistantReply::text(EMPTY_REPLY);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = if text.trim().is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        text
    };

    let citations = candidate
        .grounding_metadata
        .map(|meta| {
            meta.grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| {
                    let uri = web.uri.filter(|u| !u.trim().is_empty())?;
                    Some(Citation {
                        source_uri: uri,
                        title: web.title.filter(|t| !t.trim().is_empty()),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    AssistantReply { text, citations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::test_env::MockEnvironment;
    use chrono::Utc;
    use serde_json::json;

    fn assistant(env: MockEnvironment, config: AssistantConfig) -> GeminiAssistant<MockEnvironment> {
        GeminiAssistant::new(Arc::new(env), config)
    }

    #[test]
    fn test_request_wire_format() {
        let gemini = assistant(MockEnvironment::new(), AssistantConfig::default());
        let history = vec![ChatTurn::user("Hi", Utc::now())];
        let request = gemini.build_request("Is NVDA a buy?", &history, Some("Symbol: NVDA"));
        let value = serde_json::to_value(&request).unwrap();

        assert!(value["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Real-time Stock Data: Symbol: NVDA"));
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(
            value["contents"][0]["parts"][0]["text"],
            "Conversation History:\nUser: Hi\n\nCurrent Question: Is NVDA a buy?"
        );
        assert_eq!(value["tools"], json!([{ "google_search": {} }]));
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_request_without_web_search() {
        let config = AssistantConfig {
            web_search: false,
            ..AssistantConfig::default()
        };
        let gemini = assistant(MockEnvironment::new(), config);
        let value = serde_json::to_value(gemini.build_request("q", &[], None)).unwrap();
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_endpoint() {
        let config = AssistantConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..AssistantConfig::default()
        };
        let gemini = assistant(MockEnvironment::new(), config);
        assert_eq!(
            gemini.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_parse_response_with_grounding() {
        let body = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "NVDA is " }, { "text": "up." }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://news.example/a", "title": "A" } },
                        { "web": { "title": "no uri" } },
                        { "retrievedContext": {} },
                        { "web": { "uri": "https://news.example/b", "title": "" } }
                    ]
                }
            }]
        })
        .to_string();

        let reply = parse_response(&body).unwrap();
        assert_eq!(reply.text, "NVDA is up.");
        assert_eq!(
            reply.citations,
            vec![
                Citation {
                    source_uri: "https://news.example/a".to_string(),
                    title: Some("A".to_string()),
                },
                Citation {
                    source_uri: "https://news.example/b".to_string(),
                    title: None,
                },
            ]
        );
    }

    #[test]
    fn test_parse_response_empty_text() {
        let body = json!({ "candidates": [{ "content": { "parts": [] } }] }).to_string();
        let reply = parse_response(&body).unwrap();
        assert_eq!(reply.text, EMPTY_REPLY);
        assert!(reply.citations.is_empty());

        let reply = parse_response("{}").unwrap();
        assert_eq!(reply.text, EMPTY_REPLY);
    }

    #[test]
    fn test_parse_response_malformed() {
        let err = parse_response("not json").unwrap_err();
        assert!(matches!(err, AiError::Provider(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let gemini = assistant(
            MockEnvironment::new().without_api_key(),
            AssistantConfig::default(),
        );
        let err = gemini.ask("hello", &[], None).await.unwrap_err();
        assert_eq!(err, AiError::MissingApiKey("gemini".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_error() {
        let config = AssistantConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(5),
            ..AssistantConfig::default()
        };
        let gemini = assistant(MockEnvironment::new(), config);
        let err = gemini.ask("hello", &[], None).await.unwrap_err();
        assert!(matches!(err, AiError::Provider(_) | AiError::Timeout(_)));
    }
}
