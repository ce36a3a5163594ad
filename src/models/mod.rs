//! Core data models for the estimation board.

mod duration;
mod node;
mod story;

pub use duration::*;
pub use node::*;
pub use story::*;
