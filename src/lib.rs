//! # Q-Learning Connect Four
//!
//! A Connect Four rules engine paired with a tabular Q-learning opponent.
//! Opponents are persisted per difficulty tier as JSON agent files and can
//! be trained headlessly through self-play.
//!
//! ## Modules
//!
//! - [`game`]: Core game logic: board, player, fingerprint, rules engine
//! - [`ai`]: Agent trait, random and Q-learning agents, Q-table, rewards
//! - [`training`]: Episode driver, self-play trainer, metrics collection
//! - [`checkpoint`]: Agent file format and the per-tier agent store
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
