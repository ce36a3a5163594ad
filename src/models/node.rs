//! Estimation tree: groups of stories.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Story;

/// A titled collection of child nodes.
///
/// Children are shared through `Arc` so that an edited tree can reuse every
/// sibling that did not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub title: String,
    #[serde(default)]
    pub children: Vec<Arc<Node>>,
}

impl Group {
    /// Create an empty group.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
        }
    }

    /// Append a child, builder style.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(Arc::new(child.into()));
        self
    }

    /// Iterate over the direct children that are stories.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.children.iter().filter_map(|child| child.as_story())
    }
}

/// A node in the estimation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Group(Group),
    Story(Story),
}

impl Node {
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            Node::Story(_) => None,
        }
    }

    pub fn as_story(&self) -> Option<&Story> {
        match self {
            Node::Story(story) => Some(story),
            Node::Group(_) => None,
        }
    }

    /// Display label: a group's title or a story's name.
    pub fn label(&self) -> &str {
        match self {
            Node::Group(group) => &group.title,
            Node::Story(story) => &story.name,
        }
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl From<Story> for Node {
    fn from(story: Story) -> Self {
        Node::Story(story)
    }
}
