//! Transcript-driven episode promotion.
//!
//! Watches a podcast network's recent episodes, waits for each transcript to
//! be published, turns it into promo copy and posts it to chat, forum and
//! microblog channels, promoting every episode at most once.

pub mod api;
pub mod commands;
pub mod config;
pub mod delivery;
pub mod error;
pub mod llm;
pub mod models;
pub mod promo;
pub mod state;
pub mod transcript;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::{Config, RunContext, RunOptions};
pub use error::{PromoError, Result};
pub use worker::{EpisodeOutcome, PromotionWorker, RunReport};
