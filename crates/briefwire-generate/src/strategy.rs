//! Generation fallback chain — live backend first, placeholder last.
//!
//! Strategies are tried in order and the first one to produce output wins.
//! The standard chain ends in the placeholder, which cannot fail, so a
//! refresh run always has something to append even with the backend down.

use std::collections::HashMap;

use async_trait::async_trait;
use briefwire_core::error::{BriefwireError, Result};
use briefwire_core::types::TopicConfig;

use crate::backend::BackendConfig;
use crate::client::{BulkRequest, GenerationClient, build_messages};
use crate::placeholder::placeholder_content;

/// One way of producing raw report output for a topic.
#[async_trait]
pub trait GenerationStrategy: Send + Sync {
    fn name(&self) -> &str;
    async fn attempt(&self, topic: &TopicConfig, instructions: &str) -> Result<String>;
}

/// Live OpenAI-compatible backend call.
pub struct LiveBackend {
    client: GenerationClient,
}

impl LiveBackend {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GenerationStrategy for LiveBackend {
    fn name(&self) -> &str {
        "live-backend"
    }

    async fn attempt(&self, topic: &TopicConfig, instructions: &str) -> Result<String> {
        let messages = build_messages(topic, instructions);
        self.client.chat(&messages).await
    }
}

/// Deterministic placeholder; never fails.
pub struct Placeholder;

#[async_trait]
impl GenerationStrategy for Placeholder {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn attempt(&self, topic: &TopicConfig, _instructions: &str) -> Result<String> {
        Ok(placeholder_content(topic))
    }
}

/// Ordered strategy chain.
pub struct FallbackChain {
    strategies: Vec<Box<dyn GenerationStrategy>>,
}

impl FallbackChain {
    /// Create a chain from an ordered strategy list.
    /// First strategy is primary, rest are fallbacks.
    pub fn new(strategies: Vec<Box<dyn GenerationStrategy>>) -> Self {
        assert!(!strategies.is_empty(), "Need at least one strategy");
        Self { strategies }
    }

    /// Standard chain for a resolved backend: live call when an endpoint
    /// is configured, placeholder always last.
    pub fn for_backend(backend: BackendConfig) -> Self {
        let mut strategies: Vec<Box<dyn GenerationStrategy>> = Vec::new();
        if !backend.is_offline() {
            strategies.push(Box::new(LiveBackend::new(GenerationClient::new(backend))));
        }
        strategies.push(Box::new(Placeholder));
        Self::new(strategies)
    }

    /// Number of strategies in the chain.
    pub fn chain_len(&self) -> usize {
        self.strategies.len()
    }

    /// Walk the chain for one topic.
    ///
    /// With the standard chain this cannot fail — the placeholder sits last
    /// and is infallible. `Err` is reachable only for custom chains whose
    /// every strategy failed.
    pub async fn generate(&self, topic: &TopicConfig, instructions: &str) -> Result<String> {
        let mut last_error = None;

        for (idx, strategy) in self.strategies.iter().enumerate() {
            match strategy.attempt(topic, instructions).await {
                Ok(output) => {
                    if idx > 0 {
                        tracing::info!(
                            "🔄 Fallback: {} → {} for '{}'",
                            self.strategies[0].name(),
                            strategy.name(),
                            topic.title
                        );
                    }
                    return Ok(output);
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Strategy {} failed for '{}': {}",
                        strategy.name(),
                        topic.title,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| BriefwireError::Backend("all strategies failed".into())))
    }
}

/// Generate raw output for a batch of topics through the bulk endpoint.
///
/// Topics the backend skipped — and whole chunks whose request failed —
/// fall back to placeholder output individually, so the returned map always
/// covers every topic. `max_batch_size` of 0 sends everything in one chunk.
pub async fn generate_batch(
    client: &GenerationClient,
    topics: &[TopicConfig],
    instructions: &str,
    max_batch_size: usize,
) -> HashMap<String, String> {
    let mut outputs = HashMap::new();
    if topics.is_empty() {
        return outputs;
    }
    let chunk_size = if max_batch_size == 0 {
        topics.len()
    } else {
        max_batch_size
    };

    for chunk in topics.chunks(chunk_size) {
        let requests: Vec<BulkRequest> = chunk
            .iter()
            .map(|topic| BulkRequest {
                id: topic.id.clone(),
                messages: build_messages(topic, instructions),
            })
            .collect();

        match client.bulk(&requests).await {
            Ok(mut responses) => {
                for topic in chunk {
                    match responses.remove(&topic.id).filter(|o| !o.is_empty()) {
                        Some(output) => {
                            outputs.insert(topic.id.clone(), output);
                        }
                        None => {
                            tracing::warn!(
                                "⚠️ Bulk response missing output for '{}'; using placeholder",
                                topic.title
                            );
                            outputs.insert(topic.id.clone(), placeholder_content(topic));
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Bulk request failed for {} topic(s): {} — using placeholders",
                    chunk.len(),
                    e
                );
                for topic in chunk {
                    outputs.insert(topic.id.clone(), placeholder_content(topic));
                }
            }
        }
    }

    outputs
}
