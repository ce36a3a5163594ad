//! In-memory estimation board.
//!
//! Every edit replaces the path from the board to the edited node and reuses
//! all other nodes through their `Arc`, so a cloned `Board` is a cheap
//! snapshot of an earlier version.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{apply_conversion_factor, story_minutes, total_minutes, total_points};
use crate::codec;
use crate::models::{Group, Node, Story};

/// Errors that can occur while editing a board.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Group {0} does not exist")]
    GroupNotFound(usize),

    #[error("Story {story} does not exist in group {group}")]
    StoryNotFound { group: usize, story: usize },

    #[error("Node {0} is not a group")]
    NotAGroup(usize),

    #[error("Node {story} in group {group} is not a story")]
    NotAStory { group: usize, story: usize },

    #[error("Invalid minutes-per-point value: {0:?}")]
    InvalidConversionFactor(String),
}

/// Validate a raw minutes-per-point value typed by a user.
///
/// Only whole positive minutes are accepted, so `"7.5"` is rejected.
pub fn parse_minutes_per_point(raw: &str) -> Result<u64, BoardError> {
    let factor: u64 = raw
        .trim()
        .parse()
        .map_err(|_| BoardError::InvalidConversionFactor(raw.to_string()))?;
    if factor == 0 {
        return Err(BoardError::InvalidConversionFactor(raw.to_string()));
    }
    debug!("Accepted minutes-per-point factor {}", factor);
    Ok(factor)
}

/// Ordered top-level groups plus the optional minutes-per-point factor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    groups: Vec<Arc<Node>>,
    minutes_per_point: Option<u64>,
}

/// Totals for one top-level group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub title: String,
    pub stories: usize,
    /// Stories whose time was set by hand
    pub overridden: usize,
    pub points: u64,
    /// `None` while no minutes-per-point factor is set
    pub minutes: Option<u64>,
    pub display: Option<String>,
}

/// Totals for the whole board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub groups: Vec<GroupSummary>,
    pub total_points: u64,
    pub total_minutes: Option<u64>,
    pub total_display: Option<String>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from existing groups.
    ///
    /// When a factor is given, every story's minutes are recomputed from it,
    /// the same as [`Board::set_minutes_per_point`]. A zero factor is rejected.
    pub fn from_groups(
        groups: Vec<Group>,
        minutes_per_point: Option<u64>,
    ) -> Result<Self, BoardError> {
        let mut board = Self {
            groups: groups.into_iter().map(|g| Arc::new(Node::Group(g))).collect(),
            minutes_per_point: None,
        };
        if let Some(factor) = minutes_per_point {
            board.set_minutes_per_point(factor)?;
        }
        Ok(board)
    }

    pub fn minutes_per_point(&self) -> Option<u64> {
        self.minutes_per_point
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over the top-level groups.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter_map(|node| node.as_group())
    }

    /// The shared node for a top-level group.
    pub fn group_node(&self, group_idx: usize) -> Result<&Arc<Node>, BoardError> {
        self.groups
            .get(group_idx)
            .ok_or(BoardError::GroupNotFound(group_idx))
    }

    pub fn group(&self, group_idx: usize) -> Result<&Group, BoardError> {
        self.group_node(group_idx)?
            .as_group()
            .ok_or(BoardError::NotAGroup(group_idx))
    }

    pub fn story(&self, group_idx: usize, story_idx: usize) -> Result<&Story, BoardError> {
        self.group(group_idx)?
            .children
            .get(story_idx)
            .ok_or(BoardError::StoryNotFound {
                group: group_idx,
                story: story_idx,
            })?
            .as_story()
            .ok_or(BoardError::NotAStory {
                group: group_idx,
                story: story_idx,
            })
    }

    // Group operations

    pub fn add_group(&mut self, title: impl Into<String>) -> usize {
        let group = Group::new(title);
        debug!("Adding group {:?}", group.title);
        self.groups.push(Arc::new(Node::Group(group)));
        self.groups.len() - 1
    }

    pub fn rename_group(
        &mut self,
        group_idx: usize,
        title: impl Into<String>,
    ) -> Result<(), BoardError> {
        let group = self.group(group_idx)?;
        let renamed = Group {
            title: title.into(),
            children: group.children.clone(),
        };
        self.groups[group_idx] = Arc::new(Node::Group(renamed));
        Ok(())
    }

    pub fn remove_group(&mut self, group_idx: usize) -> Result<Group, BoardError> {
        self.group(group_idx)?;
        let node = self.groups.remove(group_idx);
        debug!("Removed group {:?}", node.label());
        match Arc::unwrap_or_clone(node) {
            Node::Group(group) => Ok(group),
            Node::Story(_) => Err(BoardError::NotAGroup(group_idx)),
        }
    }

    // Story operations

    /// Append a story to a group, computing its minutes from the live factor.
    pub fn add_story(
        &mut self,
        group_idx: usize,
        name: impl Into<String>,
        points: u32,
    ) -> Result<usize, BoardError> {
        let mut story = Story::new(name, points);
        story.minutes = self.minutes_for(points);

        let group = self.group(group_idx)?;
        let mut children = group.children.clone();
        children.push(Arc::new(Node::Story(story)));
        let story_idx = children.len() - 1;
        self.replace_children(group_idx, children);
        Ok(story_idx)
    }

    /// Rename a story. Overrides are kept.
    pub fn rename_story(
        &mut self,
        group_idx: usize,
        story_idx: usize,
        name: impl Into<String>,
    ) -> Result<(), BoardError> {
        let name = name.into();
        self.update_story(group_idx, story_idx, |story| Story {
            name,
            ..story.clone()
        })
    }

    /// Re-estimate a story.
    ///
    /// Minutes follow the live factor and any manual override is dropped.
    pub fn set_story_points(
        &mut self,
        group_idx: usize,
        story_idx: usize,
        points: u32,
    ) -> Result<(), BoardError> {
        let minutes = self.minutes_for(points);
        self.update_story(group_idx, story_idx, |story| Story {
            name: story.name.clone(),
            points,
            minutes,
            modified_minutes: None,
        })
    }

    pub fn remove_story(&mut self, group_idx: usize, story_idx: usize) -> Result<Story, BoardError> {
        let story = self.story(group_idx, story_idx)?.clone();
        let mut children = self.group(group_idx)?.children.clone();
        children.remove(story_idx);
        self.replace_children(group_idx, children);
        debug!("Removed story {:?} from group {}", story.name, group_idx);
        Ok(story)
    }

    /// Pin a story's time to a manual value.
    pub fn override_minutes(
        &mut self,
        group_idx: usize,
        story_idx: usize,
        minutes: u64,
    ) -> Result<(), BoardError> {
        self.update_story(group_idx, story_idx, |story| Story {
            modified_minutes: Some(minutes),
            ..story.clone()
        })
    }

    /// Pin a story's time from typed text such as `"1d4h"`.
    ///
    /// Returns the parsed minutes. Unparseable text yields an override of zero.
    pub fn override_from_str(
        &mut self,
        group_idx: usize,
        story_idx: usize,
        text: &str,
    ) -> Result<u64, BoardError> {
        let minutes = codec::parse_minutes(text);
        self.override_minutes(group_idx, story_idx, minutes)?;
        Ok(minutes)
    }

    /// Drop a manual override so the computed minutes apply again.
    pub fn restore_minutes(&mut self, group_idx: usize, story_idx: usize) -> Result<(), BoardError> {
        self.update_story(group_idx, story_idx, |story| Story {
            modified_minutes: None,
            ..story.clone()
        })
    }

    // Conversion factor

    /// Set the minutes-per-point factor and recompute every story's minutes.
    ///
    /// Overrides survive the cascade.
    pub fn set_minutes_per_point(&mut self, minutes_per_point: u64) -> Result<(), BoardError> {
        if minutes_per_point == 0 {
            return Err(BoardError::InvalidConversionFactor(
                minutes_per_point.to_string(),
            ));
        }

        self.groups = self
            .groups
            .iter()
            .map(|node| Arc::new(apply_conversion_factor(node, minutes_per_point)))
            .collect();
        self.minutes_per_point = Some(minutes_per_point);

        info!(
            "Applied {} minutes per point to {} groups",
            minutes_per_point,
            self.groups.len()
        );
        Ok(())
    }

    // Totals

    pub fn total_points(&self) -> u64 {
        self.groups
            .iter()
            .fold(0u64, |acc, node| acc.saturating_add(total_points(node)))
    }

    /// Estimated minutes for the whole board, `None` until a factor is set.
    pub fn total_minutes(&self) -> Option<u64> {
        self.minutes_per_point?;
        Some(
            self.groups
                .iter()
                .fold(0u64, |acc, node| acc.saturating_add(total_minutes(node))),
        )
    }

    pub fn summary(&self) -> BoardSummary {
        let time_visible = self.minutes_per_point.is_some();
        let groups = self
            .groups
            .iter()
            .map(|node| {
                let minutes = time_visible.then(|| total_minutes(node));
                GroupSummary {
                    title: node.label().to_string(),
                    stories: node.as_group().map_or(0, |g| g.stories().count()),
                    overridden: node
                        .as_group()
                        .map_or(0, |g| g.stories().filter(|s| s.is_overridden()).count()),
                    points: total_points(node),
                    minutes,
                    display: minutes.map(codec::format_minutes),
                }
            })
            .collect();

        let total_minutes = self.total_minutes();
        BoardSummary {
            groups,
            total_points: self.total_points(),
            total_minutes,
            total_display: total_minutes.map(codec::format_minutes),
        }
    }

    fn minutes_for(&self, points: u32) -> Option<u64> {
        self.minutes_per_point
            .map(|factor| story_minutes(points, factor))
    }

    fn update_story(
        &mut self,
        group_idx: usize,
        story_idx: usize,
        update: impl FnOnce(&Story) -> Story,
    ) -> Result<(), BoardError> {
        let updated = update(self.story(group_idx, story_idx)?);
        let mut children = self.group(group_idx)?.children.clone();
        children[story_idx] = Arc::new(Node::Story(updated));
        self.replace_children(group_idx, children);
        Ok(())
    }

    /// Swap in a new child list for a group that is known to exist.
    fn replace_children(&mut self, group_idx: usize, children: Vec<Arc<Node>>) {
        let title = self.groups[group_idx].label().to_string();
        self.groups[group_idx] = Arc::new(Node::Group(Group { title, children }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_board() -> Board {
        let mut board = Board::new();
        let backend = board.add_group("Backend");
        board.add_story(backend, "API", 3).unwrap();
        board.add_story(backend, "Database", 5).unwrap();
        let frontend = board.add_group("Frontend");
        board.add_story(frontend, "Forms", 8).unwrap();
        board
    }

    #[test]
    fn test_add_groups_and_stories() {
        let board = sample_board();
        assert_eq!(board.len(), 2);
        assert_eq!(board.group(0).unwrap().title, "Backend");
        assert_eq!(board.story(0, 1).unwrap().name, "Database");
        assert_eq!(board.story(1, 0).unwrap().points, 8);
        assert_eq!(board.story(0, 0).unwrap().minutes, None);
    }

    #[test]
    fn test_time_hidden_until_factor_set() {
        let board = sample_board();
        assert_eq!(board.total_points(), 16);
        assert_eq!(board.total_minutes(), None);

        let summary = board.summary();
        assert_eq!(summary.total_display, None);
        assert!(summary.groups.iter().all(|g| g.minutes.is_none()));
    }

    #[test]
    fn test_set_minutes_per_point_cascades() {
        let mut board = sample_board();
        board.override_minutes(1, 0, 999).unwrap();
        board.set_minutes_per_point(10).unwrap();

        assert_eq!(board.story(0, 0).unwrap().minutes, Some(30));
        assert_eq!(board.story(0, 1).unwrap().minutes, Some(50));
        assert_eq!(board.story(1, 0).unwrap().minutes, Some(80));
        assert_eq!(board.story(1, 0).unwrap().modified_minutes, Some(999));
        assert_eq!(board.total_minutes(), Some(30 + 50 + 999));
    }

    #[test]
    fn test_set_minutes_per_point_rejects_zero() {
        let mut board = sample_board();
        assert_eq!(
            board.set_minutes_per_point(0),
            Err(BoardError::InvalidConversionFactor("0".to_string()))
        );
        assert_eq!(board.minutes_per_point(), None);
    }

    #[test]
    fn test_new_story_uses_live_factor() {
        let mut board = sample_board();
        board.set_minutes_per_point(60).unwrap();
        let idx = board.add_story(0, "Cache", 2).unwrap();
        assert_eq!(board.story(0, idx).unwrap().minutes, Some(120));
    }

    #[test]
    fn test_set_story_points_recomputes_and_clears_override() {
        let mut board = sample_board();
        board.set_minutes_per_point(60).unwrap();
        board.override_minutes(0, 0, 15).unwrap();

        board.set_story_points(0, 0, 13).unwrap();
        let story = board.story(0, 0).unwrap();
        assert_eq!(story.points, 13);
        assert_eq!(story.minutes, Some(780));
        assert_eq!(story.modified_minutes, None);
    }

    #[test]
    fn test_rename_story_keeps_override() {
        let mut board = sample_board();
        board.override_minutes(0, 0, 15).unwrap();
        board.rename_story(0, 0, "REST API").unwrap();

        let story = board.story(0, 0).unwrap();
        assert_eq!(story.name, "REST API");
        assert_eq!(story.modified_minutes, Some(15));
    }

    #[test]
    fn test_override_from_str_and_restore() {
        let mut board = sample_board();
        board.set_minutes_per_point(30).unwrap();

        let minutes = board.override_from_str(0, 1, "1d2h").unwrap();
        assert_eq!(minutes, 600);
        assert_eq!(board.story(0, 1).unwrap().effective_minutes(), 600);

        board.restore_minutes(0, 1).unwrap();
        assert_eq!(board.story(0, 1).unwrap().effective_minutes(), 150);
    }

    #[test]
    fn test_remove_story_uses_story_index() {
        let mut board = sample_board();
        let removed = board.remove_story(0, 1).unwrap();
        assert_eq!(removed.name, "Database");
        assert_eq!(board.group(0).unwrap().children.len(), 1);
        assert_eq!(board.story(0, 0).unwrap().name, "API");
        assert_eq!(board.group(1).unwrap().children.len(), 1);
    }

    #[test]
    fn test_rename_and_remove_group() {
        let mut board = sample_board();
        board.rename_group(1, "UI").unwrap();
        assert_eq!(board.group(1).unwrap().title, "UI");
        assert_eq!(board.story(1, 0).unwrap().name, "Forms");

        let removed = board.remove_group(0).unwrap();
        assert_eq!(removed.title, "Backend");
        assert_eq!(board.len(), 1);
        assert_eq!(board.total_points(), 8);
    }

    #[test]
    fn test_invalid_indices() {
        let mut board = sample_board();
        assert_eq!(board.group(5).unwrap_err(), BoardError::GroupNotFound(5));
        assert_eq!(
            board.story(0, 9).unwrap_err(),
            BoardError::StoryNotFound { group: 0, story: 9 }
        );
        assert!(board.add_story(7, "x", 1).is_err());
        assert!(board.remove_story(1, 3).is_err());
        assert!(board.remove_group(2).is_err());
    }

    #[test]
    fn test_nested_group_is_not_a_story() {
        let nested = Group::new("Outer").with_child(Group::new("Inner"));
        let mut board = Board::from_groups(vec![nested], None).unwrap();
        assert_eq!(
            board.override_minutes(0, 0, 10).unwrap_err(),
            BoardError::NotAStory { group: 0, story: 0 }
        );
    }

    #[test]
    fn test_edits_share_unchanged_nodes() {
        let before = sample_board();
        let mut after = before.clone();
        after.override_minutes(0, 1, 42).unwrap();

        // Untouched group is shared.
        assert!(Arc::ptr_eq(
            before.group_node(1).unwrap(),
            after.group_node(1).unwrap()
        ));
        // Untouched sibling inside the edited group is shared.
        assert!(Arc::ptr_eq(
            &before.group(0).unwrap().children[0],
            &after.group(0).unwrap().children[0]
        ));
        // Edited path is replaced, earlier snapshot unchanged.
        assert!(!Arc::ptr_eq(
            before.group_node(0).unwrap(),
            after.group_node(0).unwrap()
        ));
        assert_eq!(before.story(0, 1).unwrap().modified_minutes, None);
    }

    #[test]
    fn test_from_groups_applies_factor() {
        let group = Group::new("Backend")
            .with_child(Story::new("API", 3))
            .with_child(Story::new("DB", 5).with_minutes(1).with_modified_minutes(90));
        let board = Board::from_groups(vec![group], Some(60)).unwrap();

        assert_eq!(board.minutes_per_point(), Some(60));
        assert_eq!(board.story(0, 0).unwrap().minutes, Some(180));
        assert_eq!(board.story(0, 1).unwrap().minutes, Some(300));
        assert_eq!(board.story(0, 1).unwrap().modified_minutes, Some(90));
        assert_eq!(board.total_minutes(), Some(270));
    }

    #[test]
    fn test_from_groups_without_factor_keeps_stored_minutes() {
        let group = Group::new("Backend").with_child(Story::new("API", 3).with_minutes(7));
        let board = Board::from_groups(vec![group], None).unwrap();

        assert_eq!(board.minutes_per_point(), None);
        assert_eq!(board.story(0, 0).unwrap().minutes, Some(7));
        assert_eq!(board.total_minutes(), None);
    }

    #[test]
    fn test_from_groups_rejects_zero_factor() {
        let err = Board::from_groups(vec![Group::new("Backend")], Some(0)).unwrap_err();
        assert_eq!(err, BoardError::InvalidConversionFactor("0".to_string()));
    }

    #[test]
    fn test_parse_minutes_per_point() {
        assert_eq!(parse_minutes_per_point("30").unwrap(), 30);
        assert_eq!(parse_minutes_per_point(" 45 ").unwrap(), 45);
        assert!(parse_minutes_per_point("0").is_err());
        assert!(parse_minutes_per_point("-5").is_err());
        assert!(parse_minutes_per_point("abc").is_err());
        assert!(parse_minutes_per_point("").is_err());
    }

    #[test]
    fn test_parse_minutes_per_point_rejects_fractions() {
        assert_eq!(
            parse_minutes_per_point("7.5").unwrap_err(),
            BoardError::InvalidConversionFactor("7.5".to_string())
        );
    }

    #[test]
    fn test_summary_counts_overrides() {
        let mut board = sample_board();
        board.override_minutes(0, 1, 20).unwrap();

        let summary = board.summary();
        assert_eq!(summary.groups[0].overridden, 1);
        assert_eq!(summary.groups[1].overridden, 0);
    }

    #[test]
    fn test_summary() {
        let mut board = sample_board();
        board.set_minutes_per_point(480).unwrap();
        board.add_group("Empty");

        let summary = board.summary();
        assert_eq!(summary.total_points, 16);
        assert_eq!(summary.total_minutes, Some(16 * 480));
        assert_eq!(summary.total_display.as_deref(), Some("3w1d"));

        assert_eq!(summary.groups.len(), 3);
        assert_eq!(summary.groups[0].points, 8);
        assert_eq!(summary.groups[0].stories, 2);
        assert_eq!(summary.groups[0].display.as_deref(), Some("1w3d"));
        assert_eq!(summary.groups[2].points, 0);
        assert_eq!(summary.groups[2].display.as_deref(), Some(""));
    }
}
