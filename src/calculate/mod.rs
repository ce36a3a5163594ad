//! Estimate aggregation engine.
//!
//! Computes derived totals over the estimation tree:
//! - Story point sums
//! - Estimated minutes with per-story overrides
//! - Minutes-per-point cascades

use std::sync::Arc;

use crate::models::{Group, Node, Story};

/// Sum of story points below a node.
pub fn total_points(node: &Node) -> u64 {
    match node {
        Node::Group(group) => group
            .children
            .iter()
            .fold(0u64, |acc, child| acc.saturating_add(total_points(child))),
        Node::Story(story) => u64::from(story.points),
    }
}

/// Sum of estimated minutes below a node.
///
/// Each story contributes its override, else its computed minutes, else zero.
pub fn total_minutes(node: &Node) -> u64 {
    match node {
        Node::Group(group) => group
            .children
            .iter()
            .fold(0u64, |acc, child| acc.saturating_add(total_minutes(child))),
        Node::Story(story) => story.effective_minutes(),
    }
}

/// Minutes for a story at the given factor.
pub fn story_minutes(points: u32, minutes_per_point: u64) -> u64 {
    u64::from(points).saturating_mul(minutes_per_point)
}

/// Return a copy of the tree with every story's computed minutes set to
/// `points * minutes_per_point`.
///
/// Overrides, titles and nesting are kept. The factor is not checked here; a
/// factor of zero zeroes all computed minutes.
pub fn apply_conversion_factor(node: &Node, minutes_per_point: u64) -> Node {
    match node {
        Node::Group(group) => Node::Group(Group {
            title: group.title.clone(),
            children: group
                .children
                .iter()
                .map(|child| Arc::new(apply_conversion_factor(child, minutes_per_point)))
                .collect(),
        }),
        Node::Story(story) => Node::Story(Story {
            minutes: Some(story_minutes(story.points, minutes_per_point)),
            ..story.clone()
        }),
    }
}
