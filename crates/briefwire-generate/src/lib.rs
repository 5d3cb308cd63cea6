//! # Briefwire Generate
//!
//! Report generation pipeline for Briefwire.
//!
//! A `FallbackChain` walks an ordered list of `GenerationStrategy` slots
//! (live OpenAI-compatible backend, then the deterministic placeholder) until
//! one produces output. Raw backend output is parsed and sanitized by
//! `normalize` into a `HistoryEntry` ready for the history log.

pub mod backend;
pub mod client;
pub mod extract;
pub mod markdown;
pub mod normalize;
pub mod placeholder;
pub mod strategy;

pub use backend::BackendConfig;
pub use client::{BulkRequest, GenerationClient};
pub use normalize::normalize;
pub use strategy::{FallbackChain, GenerationStrategy, generate_batch};
