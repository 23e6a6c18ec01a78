//! # Beopardy Stats
//!
//! Player, episode and record statistics for the Beopardy trivia game show.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, episodes, appearances, teams)
//! - **calculate**: Scoring, standings, career stats, records and leaderboards
//! - **entry**: Admin forms and results entry
//! - **storage**: Row stores (local JSONL, hosted PostgREST) and read models
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod entry;
pub mod format;
pub mod media;
pub mod models;
pub mod storage;

pub use models::*;
