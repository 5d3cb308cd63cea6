//! HTTP client for OpenAI-compatible generation backends.
//!
//! One client handles both the single chat-completions call and the bulk
//! endpoint. Requests differ only in URL and body shape; auth and error
//! mapping are shared.

use std::collections::HashMap;

use briefwire_core::error::{BriefwireError, Result};
use briefwire_core::types::{ChatMessage, TopicConfig};
use serde::Serialize;
use serde_json::{Value, json};

use crate::backend::BackendConfig;
use crate::extract::extract_content;

/// System directive sent with every generation request.
pub const SYSTEM_DIRECTIVE: &str = "You are an elite research analyst generating executive-ready intelligence. Respond strictly in JSON with keys title, summary, markdown, sources (array of URLs). Use html-safe markdown and adhere to provided instructions.";

/// Build the two-message conversation for one topic.
pub fn build_messages(topic: &TopicConfig, instructions: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_DIRECTIVE),
        ChatMessage::user(format!(
            "{instructions}\n\nTOPIC_PROMPT: {}\n\nProvide a fresh report.",
            topic.prompt
        )),
    ]
}

/// One entry in a bulk request, tagged with the topic id so responses can
/// be matched back.
#[derive(Debug, Clone, Serialize)]
pub struct BulkRequest {
    pub id: String,
    pub messages: Vec<ChatMessage>,
}

/// Client for one resolved backend.
pub struct GenerationClient {
    backend: BackendConfig,
    client: reqwest::Client,
}

impl GenerationClient {
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            backend,
            client: reqwest::Client::new(),
        }
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.backend
    }

    /// Build the auth header for the request.
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.backend.api_key {
            Some(key) if !key.is_empty() => {
                req.header("Authorization", format!("Bearer {key}"))
            }
            _ => req,
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let req = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        let req = self.apply_auth(req);

        let resp = req
            .send()
            .await
            .map_err(|e| BriefwireError::Http(format!("connection failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BriefwireError::Backend(format!(
                "API error {status}: {text}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| BriefwireError::Http(e.to_string()))
    }

    /// Run one chat-completions request and extract the generated text.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let Some(url) = self.backend.endpoint.as_deref() else {
            return Err(BriefwireError::Backend("no endpoint configured".into()));
        };

        let body = json!({
            "model": self.backend.model,
            "messages": messages,
            "stream": false,
            "temperature": self.backend.temperature,
            "max_tokens": self.backend.max_tokens,
        });

        let response = self.post_json(url, &body).await?;
        let output = extract_content(&response);
        if output.is_empty() {
            return Err(BriefwireError::Backend("empty response body".into()));
        }
        Ok(output)
    }

    /// Run one bulk request and map outputs back by request id. Ids the
    /// backend skipped are simply absent from the map.
    pub async fn bulk(&self, requests: &[BulkRequest]) -> Result<HashMap<String, String>> {
        let Some(url) = self.backend.bulk_endpoint.as_deref() else {
            return Err(BriefwireError::Backend("no bulk endpoint configured".into()));
        };

        let body = json!({
            "model": self.backend.model,
            "requests": requests,
        });

        let response = self.post_json(url, &body).await?;
        let mut outputs = HashMap::new();
        if let Some(responses) = response.get("responses").and_then(Value::as_array) {
            for item in responses {
                if let (Some(id), Some(output)) = (
                    item.get("id").and_then(Value::as_str),
                    item.get("output").and_then(Value::as_str),
                ) {
                    outputs.insert(id.to_string(), output.to_string());
                }
            }
        }
        Ok(outputs)
    }
}
