//! # Briefwire Gateway
//!
//! HTTP trigger surface for the refresh pipeline.
//!
//! One protected route (`GET /api/cron`) runs an evaluation on demand for
//! external cron services; the public routes expose health, the topic
//! catalog with latest entries, and a development-mode bulk endpoint that
//! answers in the live bulk wire shape.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
