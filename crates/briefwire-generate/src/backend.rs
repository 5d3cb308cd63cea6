//! Immutable backend description resolved once from configuration.
//!
//! Operators configure a base URL and the pipeline corrects it to the full
//! chat-completions path, so `https://gw.example.com`, `…/v1` and `…/v1/`
//! all end up at the same place. Correction is idempotent: feeding a
//! corrected URL back through produces the same URL.

use briefwire_core::BriefwireConfig;

/// Everything the generation client needs to talk to one backend.
///
/// Built once per run and never mutated afterwards; a new run re-reads
/// configuration and builds a fresh value.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Full chat-completions URL, `None` when no endpoint is configured.
    pub endpoint: Option<String>,
    /// Full bulk-generation URL derived from the same base.
    pub bulk_endpoint: Option<String>,
    /// API key for Bearer auth; `None` means unauthenticated.
    pub api_key: Option<String>,
    /// Model identifier passed through to the backend.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
}

impl BackendConfig {
    /// Resolve the backend from loaded configuration.
    pub fn from_config(config: &BriefwireConfig) -> Self {
        let generation = &config.generation;
        let (endpoint, bulk_endpoint) = if generation.endpoint.trim().is_empty() {
            (None, None)
        } else {
            let base = generation.endpoint.trim();
            (
                Some(correct_chat_url(base)),
                Some(correct_bulk_url(base)),
            )
        };
        Self {
            endpoint,
            bulk_endpoint,
            api_key: if generation.api_key.is_empty() {
                None
            } else {
                Some(generation.api_key.clone())
            },
            model: generation.model.clone(),
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
        }
    }

    /// True when no live endpoint is configured and only the placeholder
    /// strategy can produce output.
    pub fn is_offline(&self) -> bool {
        self.endpoint.is_none()
    }
}

/// Correct a configured base URL to the full chat-completions URL.
///
/// Rules, checked in order:
/// - already ends with `/v1/chat/completions` → unchanged
/// - ends with `/v1` → append `/chat/completions`
/// - ends with `/v1/` → append `chat/completions`
/// - anything else → append `/v1/chat/completions`
pub fn correct_chat_url(base_url: &str) -> String {
    if base_url.ends_with("/v1/chat/completions") {
        base_url.to_string()
    } else if base_url.ends_with("/v1") {
        format!("{base_url}/chat/completions")
    } else if base_url.ends_with("/v1/") {
        format!("{base_url}chat/completions")
    } else {
        format!("{base_url}/v1/chat/completions")
    }
}

/// Correct a configured base URL to the bulk-generation URL.
///
/// Same shape as [`correct_chat_url`] but targeting `/v1/bulk`. A base that
/// was already corrected for chat is mapped to the sibling bulk path rather
/// than nested under it.
pub fn correct_bulk_url(base_url: &str) -> String {
    if base_url.ends_with("/v1/bulk") {
        base_url.to_string()
    } else if let Some(root) = base_url.strip_suffix("/chat/completions") {
        format!("{root}/bulk")
    } else if base_url.ends_with("/v1") {
        format!("{base_url}/bulk")
    } else if base_url.ends_with("/v1/") {
        format!("{base_url}bulk")
    } else {
        format!("{base_url}/v1/bulk")
    }
}
