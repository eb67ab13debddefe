//! Group model for Quill.
//!
//! A group is a named topic that posts may belong to. The slug is the
//! unique URL-safe key used for external lookups.

/// Group entity representing a post topic.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Group {
    /// Unique group ID.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// URL-safe identifier (unique).
    pub slug: String,
    /// Group description.
    pub description: Option<String>,
    /// Group creation timestamp.
    pub created_at: String,
}

/// Data for creating a new group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    /// Display title.
    pub title: String,
    /// URL-safe identifier.
    pub slug: String,
    /// Group description.
    pub description: Option<String>,
}

impl NewGroup {
    /// Create a new group with minimal required fields.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
