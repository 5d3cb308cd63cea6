//! Briefwire history — append-only per-topic persistence of generation results.

pub mod store;

pub use store::HistoryStore;
