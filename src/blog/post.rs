//! Post model for Quill.
//!
//! This module defines the Post struct and the ownership rules that
//! govern who may edit a post.

/// Outcome of an edit-access check for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAccess {
    /// The requester is the post's author.
    Owner,
    /// The requester is authenticated but is not the author.
    NotOwner,
    /// No requester identity was supplied.
    Anonymous,
}

/// Post entity representing a single authored text entry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    /// Unique post ID.
    pub id: i64,
    /// ID of the user who created the post. Assigned at creation, never changed.
    pub author_id: i64,
    /// ID of the group this post belongs to (None for ungrouped posts).
    pub group_id: Option<i64>,
    /// Post text content.
    pub text: String,
    /// Post creation timestamp.
    pub created_at: String,
}

impl Post {
    /// Check if the given requester may edit this post.
    ///
    /// Only the author may edit a post.
    pub fn can_edit(&self, requester_id: i64) -> bool {
        requester_id == self.author_id
    }

    /// Classify the requester's edit access to this post.
    pub fn edit_access(&self, requester: Option<i64>) -> EditAccess {
        match requester {
            None => EditAccess::Anonymous,
            Some(id) if self.can_edit(id) => EditAccess::Owner,
            Some(_) => EditAccess::NotOwner,
        }
    }

    /// Check if this post is assigned to a group.
    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }
}

/// Data for creating a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// ID of the user creating the post.
    pub author_id: i64,
    /// ID of the group to assign the post to (optional).
    pub group_id: Option<i64>,
    /// Post text content.
    pub text: String,
}

impl NewPost {
    /// Create a new post with required fields.
    pub fn new(author_id: i64, text: impl Into<String>) -> Self {
        Self {
            author_id,
            group_id: None,
            text: text.into(),
        }
    }

    /// Set the group.
    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }
}

/// Data for updating an existing post.
///
/// Only text and group may change; author and creation timestamp never do.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    /// New text.
    pub text: Option<String>,
    /// New group assignment (Some(None) clears the group).
    pub group_id: Option<Option<i64>>,
}

impl PostUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set new group assignment.
    pub fn group_id(mut self, group_id: Option<i64>) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.group_id.is_none()
    }
}
