//! # Estimate Board
//!
//! Story point estimation with conversion into work durations.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (durations, stories, groups)
//! - **codec**: Minutes ⇄ duration ⇄ text conversion
//! - **calculate**: Point and time aggregation over the estimation tree
//! - **board**: In-memory board with copy-on-write edits
//! - **storage**: JSON board files
//! - **config**: Configuration loading and validation

pub mod board;
pub mod calculate;
pub mod codec;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
