//! # Briefwire Schedule
//!
//! Schedule evaluation and the refresh runner.
//!
//! `evaluator` decides which rules fire at a given instant, `resolver`
//! scopes topics to their owning rules, `inputs` loads the externally
//! authored configuration files, and `runner` drives the whole refresh:
//! evaluate → scope → generate → normalize → append. `daemon` wraps the
//! runner in a minute-resolution loop for standalone deployments.

pub mod daemon;
pub mod evaluator;
pub mod inputs;
pub mod resolver;
pub mod runner;

pub use runner::{OutcomeStatus, RefreshRunner, RunReport, ScheduleOutcome};
