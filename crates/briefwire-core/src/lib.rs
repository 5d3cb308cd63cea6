//! Briefwire core — configuration, error type, and the shared data model.

pub mod config;
pub mod error;
pub mod types;

pub use config::BriefwireConfig;
pub use error::{BriefwireError, Result};
