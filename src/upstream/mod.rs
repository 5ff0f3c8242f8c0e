use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::RelayConfig;
use crate::error::RelayError;

/// Persona every completion request is made under.
const SYSTEM_PROMPT: &str = "Você é um assistente de estudos especializado em preparação para concursos. Seu objetivo é ajudar os estudantes a se prepararem da melhor forma possível, fornecendo explicações claras, exemplos práticos e dicas de estudo. Mantenha suas respostas concisas e focadas. Sempre responda em português.";

/// Fixed sampling temperature for every request.
const TEMPERATURE: f64 = 0.7;

const FALLBACK_UPSTREAM_ERROR: &str = "Erro ao processar a resposta";

/// A single-turn completion call against the upstream chat API.
///
/// Deliberately takes one message rather than a history: the product sends
/// only the latest user turn under a fixed persona. Extending to multi-turn
/// context means widening this signature to an ordered message list.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, message: &str) -> Result<String, RelayError>;
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiClient {
    config: RelayConfig,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, message: &str) -> Result<String, RelayError> {
        info!("Relaying message upstream: {}", message);

        let url = format!("{}/chat/completions", self.config.base_url);
        let payload = chat_payload(&self.config.model, message);
        debug!("Payload: {}", payload);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::Internal(format!("upstream request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Upstream returned {}: {}", status, body);
            return Err(RelayError::Upstream(upstream_error_message(&body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::Internal(format!("invalid upstream response: {e}")))?;
        debug!("Upstream response: {}", body);

        let content = extract_reply(&body).ok_or_else(|| {
            RelayError::Internal("no message content in upstream response".to_string())
        })?;

        info!("Received {} characters from upstream", content.len());
        Ok(content)
    }
}

/// Builds the completion request body: fixed persona, the user's message as
/// the sole conversational turn, fixed temperature.
fn chat_payload(model: &str, message: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": message }
        ],
        "temperature": TEMPERATURE
    })
}

/// Pulls the first choice's text out of a completions response.
fn extract_reply(body: &Value) -> Option<String> {
    body.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_owned)
}

/// Error message for a non-success upstream response: the API's own message
/// when the body carries a non-empty one, else a generic fallback. The error
/// envelope never goes out empty.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| FALLBACK_UPSTREAM_ERROR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_persona_message_and_temperature() {
        let payload = chat_payload("gpt-4o-mini", "o que é concordância verbal?");
        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["temperature"], json!(0.7));

        let messages = payload["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], SYSTEM_PROMPT);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "o que é concordância verbal?");
    }

    #[test]
    fn extracts_the_first_choice_text() {
        let body = json!({
            "choices": [{ "message": { "content": "Concordância verbal é..." } }]
        });
        assert_eq!(
            extract_reply(&body).as_deref(),
            Some("Concordância verbal é...")
        );
    }

    #[test]
    fn extraction_fails_on_missing_fields() {
        assert!(extract_reply(&json!({})).is_none());
        assert!(extract_reply(&json!({ "choices": [] })).is_none());
        assert!(extract_reply(&json!({ "choices": [{ "message": {} }] })).is_none());
    }

    #[test]
    fn upstream_error_message_passes_the_api_message_through() {
        let body = r#"{"error":{"message":"invalid api key"}}"#;
        assert_eq!(upstream_error_message(body), "invalid api key");
    }

    #[test]
    fn upstream_error_message_falls_back_when_the_body_is_opaque() {
        assert_eq!(upstream_error_message("not json"), FALLBACK_UPSTREAM_ERROR);
        assert_eq!(
            upstream_error_message(r#"{"error":"plain"}"#),
            FALLBACK_UPSTREAM_ERROR
        );
        assert_eq!(upstream_error_message(""), FALLBACK_UPSTREAM_ERROR);
    }

    #[test]
    fn upstream_error_message_falls_back_when_the_api_message_is_empty() {
        assert_eq!(
            upstream_error_message(r#"{"error":{"message":""}}"#),
            FALLBACK_UPSTREAM_ERROR
        );
    }
}
