//! Blog service for Quill.
//!
//! This module provides high-level operations for post listings and
//! authoring, with built-in ownership checking and pagination support.

use crate::config::ListingConfig;
use crate::db::{Database, User, UserRepository};
use crate::{QuillError, Result};

use super::group_repository::GroupRepository;
use super::post::{EditAccess, NewPost, Post, PostUpdate};
use super::post_repository::PostRepository;
use super::Group;

/// Maximum length for post text (in characters).
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Validate post text.
fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(QuillError::Validation(
            "text must not be empty".to_string(),
        ));
    }
    let char_count = text.chars().count();
    if char_count > MAX_TEXT_LENGTH {
        return Err(QuillError::Validation(format!(
            "text must be at most {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Result of a paginated query.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page (at most `page_size`).
    pub items: Vec<T>,
    /// 1-indexed page number.
    pub page: u32,
    /// Page size used for this query.
    pub page_size: u32,
    /// Total number of items (across all pages).
    pub total: i64,
}

impl<T> Page<T> {
    /// Total number of pages, computed with exact integer arithmetic.
    pub fn total_pages(&self) -> u32 {
        let size = self.page_size as i64;
        ((self.total + size - 1) / size) as u32
    }

    /// Check if there are more items after this page.
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Service for post listing and authoring with ownership checking.
pub struct BlogService<'a> {
    db: &'a Database,
    page_size: u32,
}

impl<'a> BlogService<'a> {
    /// Create a new BlogService with the given database reference and
    /// listing configuration.
    pub fn new(db: &'a Database, listing: &ListingConfig) -> Self {
        Self {
            db,
            page_size: listing.page_size.max(1),
        }
    }

    /// Convert a 1-indexed page number to an (offset, limit) slice.
    fn slice(&self, page: u32) -> (i64, i64) {
        let page = page.max(1) as i64;
        let limit = self.page_size as i64;
        ((page - 1) * limit, limit)
    }

    fn page_of(&self, items: Vec<Post>, page: u32, total: i64) -> Page<Post> {
        Page {
            items,
            page: page.max(1),
            page_size: self.page_size,
            total,
        }
    }

    // ========== Listing Operations ==========

    /// List all posts, newest first.
    ///
    /// A page beyond the last is an empty page, not an error.
    pub async fn list_all(&self, page: u32) -> Result<Page<Post>> {
        let repo = PostRepository::new(self.db.pool());
        let total = repo.count().await?;
        let (offset, limit) = self.slice(page);
        let items = repo.list_paginated(offset, limit).await?;

        Ok(self.page_of(items, page, total))
    }

    /// List posts in the group with the given slug, newest first.
    ///
    /// Returns the group alongside the page. Fails with NotFound if no
    /// group matches the slug; an empty listing is a valid empty page.
    pub async fn list_by_group(&self, slug: &str, page: u32) -> Result<(Group, Page<Post>)> {
        let group = self.get_group(slug).await?;

        let repo = PostRepository::new(self.db.pool());
        let total = repo.count_by_group(group.id).await?;
        let (offset, limit) = self.slice(page);
        let items = repo.list_by_group_paginated(group.id, offset, limit).await?;

        let page = self.page_of(items, page, total);
        Ok((group, page))
    }

    /// List posts by the author with the given username, newest first.
    ///
    /// Returns the author alongside the page. Fails with NotFound if no
    /// user matches the username.
    pub async fn list_by_author(&self, username: &str, page: u32) -> Result<(User, Page<Post>)> {
        let author = self.get_author(username).await?;

        let repo = PostRepository::new(self.db.pool());
        let total = repo.count_by_author(author.id).await?;
        let (offset, limit) = self.slice(page);
        let items = repo
            .list_by_author_paginated(author.id, offset, limit)
            .await?;

        let page = self.page_of(items, page, total);
        Ok((author, page))
    }

    /// Get a single post by ID.
    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        let repo = PostRepository::new(self.db.pool());
        repo.get_by_id(post_id)
            .await?
            .ok_or_else(|| QuillError::NotFound("post".to_string()))
    }

    /// Get a group by slug.
    pub async fn get_group(&self, slug: &str) -> Result<Group> {
        let repo = GroupRepository::new(self.db.pool());
        repo.get_by_slug(slug)
            .await?
            .ok_or_else(|| QuillError::NotFound("group".to_string()))
    }

    /// Get an author by username.
    pub async fn get_author(&self, username: &str) -> Result<User> {
        let repo = UserRepository::new(self.db.pool());
        repo.get_by_username(username)
            .await?
            .ok_or_else(|| QuillError::NotFound("user".to_string()))
    }

    /// List all groups ordered by title.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        let repo = GroupRepository::new(self.db.pool());
        repo.list_all().await
    }

    // ========== Authoring Operations ==========

    /// Create a new post.
    ///
    /// The author is assigned at creation and never changes. The group, if
    /// supplied, must exist.
    pub async fn create_post(
        &self,
        author_id: i64,
        text: &str,
        group_id: Option<i64>,
    ) -> Result<Post> {
        validate_text(text)?;
        self.validate_group(group_id).await?;

        let repo = PostRepository::new(self.db.pool());
        let mut new_post = NewPost::new(author_id, text);
        if let Some(group_id) = group_id {
            new_post = new_post.with_group(group_id);
        }
        repo.create(&new_post).await
    }

    /// Edit an existing post.
    ///
    /// Only the post's author may edit. Text and group are replaced; the
    /// author and creation timestamp are unchanged.
    pub async fn edit_post(
        &self,
        post_id: i64,
        requester: Option<i64>,
        text: &str,
        group_id: Option<i64>,
    ) -> Result<Post> {
        let post = self.get_post(post_id).await?;

        match post.edit_access(requester) {
            EditAccess::Owner => {}
            EditAccess::NotOwner => {
                return Err(QuillError::Forbidden(
                    "only the author can edit this post".to_string(),
                ));
            }
            EditAccess::Anonymous => {
                return Err(QuillError::Auth("login required".to_string()));
            }
        }

        validate_text(text)?;
        self.validate_group(group_id).await?;

        let repo = PostRepository::new(self.db.pool());
        let update = PostUpdate::new().text(text).group_id(group_id);
        repo.update(post_id, &update)
            .await?
            .ok_or_else(|| QuillError::NotFound("post".to_string()))
    }

    /// Check that a group reference, when supplied, points at an existing group.
    async fn validate_group(&self, group_id: Option<i64>) -> Result<()> {
        if let Some(group_id) = group_id {
            let repo = GroupRepository::new(self.db.pool());
            if !repo.exists(group_id).await? {
                return Err(QuillError::Validation(format!(
                    "group {group_id} does not exist"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::NewGroup;
    use crate::db::NewUser;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn listing(page_size: u32) -> ListingConfig {
        ListingConfig { page_size }
    }

    async fn create_test_user(db: &Database, username: &str) -> i64 {
        UserRepository::new(db.pool())
            .create(&NewUser::new(username, "hash", username))
            .await
            .unwrap()
            .id
    }

    async fn create_test_group(db: &Database, slug: &str) -> i64 {
        GroupRepository::new(db.pool())
            .create(&NewGroup::new(slug, slug))
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_page_total_pages_exact() {
        let page = |total| Page::<Post> {
            items: vec![],
            page: 1,
            page_size: 10,
            total,
        };
        assert_eq!(page(0).total_pages(), 0);
        assert_eq!(page(1).total_pages(), 1);
        assert_eq!(page(10).total_pages(), 1);
        assert_eq!(page(11).total_pages(), 2);
        assert_eq!(page(13).total_pages(), 2);
        assert_eq!(page(20).total_pages(), 2);
        assert_eq!(page(21).total_pages(), 3);
    }

    #[test]
    fn test_page_has_more() {
        let page = Page::<Post> {
            items: vec![],
            page: 1,
            page_size: 10,
            total: 13,
        };
        assert!(page.has_more());

        let last = Page::<Post> {
            items: vec![],
            page: 2,
            page_size: 10,
            total: 13,
        };
        assert!(!last.has_more());
    }

    #[tokio::test]
    async fn test_list_all_empty_first_page_is_success() {
        let db = setup_db().await;
        let service = BlogService::new(&db, &listing(10));

        let page = service.list_all(1).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages(), 0);
    }

    #[tokio::test]
    async fn test_list_all_pagination_walk() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(10));

        for i in 1..=13 {
            service
                .create_post(author_id, &format!("Post {i}"), None)
                .await
                .unwrap();
        }

        let page1 = service.list_all(1).await.unwrap();
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page1.items[0].text, "Post 13");
        assert_eq!(page1.total, 13);
        assert_eq!(page1.total_pages(), 2);

        let page2 = service.list_all(2).await.unwrap();
        assert_eq!(page2.items.len(), 3);
        assert_eq!(page2.items[2].text, "Post 1");

        // Beyond the last page: empty page, not an error
        let page3 = service.list_all(3).await.unwrap();
        assert!(page3.items.is_empty());
        assert_eq!(page3.total, 13);
    }

    #[tokio::test]
    async fn test_list_by_group_pagination_walk() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let group_id = create_test_group(&db, "news").await;
        let service = BlogService::new(&db, &listing(10));

        for i in 1..=13 {
            service
                .create_post(author_id, &format!("News {i}"), Some(group_id))
                .await
                .unwrap();
        }
        // A post outside the group must not leak into the listing
        service.create_post(author_id, "Ungrouped", None).await.unwrap();

        let (group, page1) = service.list_by_group("news", 1).await.unwrap();
        assert_eq!(group.slug, "news");
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page1.items[0].text, "News 13");
        assert_eq!(page1.total, 13);

        let (_, page2) = service.list_by_group("news", 2).await.unwrap();
        assert_eq!(page2.items.len(), 3);

        let (_, page3) = service.list_by_group("news", 3).await.unwrap();
        assert!(page3.items.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_group_unknown_slug_is_not_found() {
        let db = setup_db().await;
        let service = BlogService::new(&db, &listing(10));

        let result = service.list_by_group("missing", 1).await;
        assert!(matches!(result, Err(QuillError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_by_group_empty_is_success() {
        let db = setup_db().await;
        create_test_group(&db, "quiet").await;
        let service = BlogService::new(&db, &listing(10));

        let (_, page) = service.list_by_group("quiet", 1).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_list_by_author() {
        let db = setup_db().await;
        let alice = create_test_user(&db, "alice").await;
        let bob = create_test_user(&db, "bob").await;
        let service = BlogService::new(&db, &listing(10));

        service.create_post(alice, "By alice", None).await.unwrap();
        service.create_post(bob, "By bob", None).await.unwrap();

        let (author, page) = service.list_by_author("alice", 1).await.unwrap();
        assert_eq!(author.username, "alice");
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].text, "By alice");
    }

    #[tokio::test]
    async fn test_list_by_author_unknown_username_is_not_found() {
        let db = setup_db().await;
        let service = BlogService::new(&db, &listing(10));

        let result = service.list_by_author("nobody", 1).await;
        assert!(matches!(result, Err(QuillError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_created_post_visible_in_all_listings() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let group_id = create_test_group(&db, "news").await;
        let service = BlogService::new(&db, &listing(10));

        let post = service
            .create_post(author_id, "Visible everywhere", Some(group_id))
            .await
            .unwrap();

        let all = service.list_all(1).await.unwrap();
        assert!(all.items.iter().any(|p| p.id == post.id));

        let (_, by_group) = service.list_by_group("news", 1).await.unwrap();
        assert!(by_group.items.iter().any(|p| p.id == post.id));

        let (_, by_author) = service.list_by_author("alice", 1).await.unwrap();
        assert!(by_author.items.iter().any(|p| p.id == post.id));
    }

    #[tokio::test]
    async fn test_create_post_empty_text_rejected() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(10));

        for text in ["", "   ", "\n\t "] {
            let result = service.create_post(author_id, text, None).await;
            assert!(matches!(result, Err(QuillError::Validation(_))));
        }

        // Nothing was persisted
        let page = service.list_all(1).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_create_post_text_too_long_rejected() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(10));

        let long = "a".repeat(MAX_TEXT_LENGTH + 1);
        let result = service.create_post(author_id, &long, None).await;
        assert!(matches!(result, Err(QuillError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_post_unknown_group_rejected() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(10));

        let result = service.create_post(author_id, "Hello", Some(999)).await;
        assert!(matches!(result, Err(QuillError::Validation(_))));

        let page = service.list_all(1).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_edit_post_by_author() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let group_id = create_test_group(&db, "news").await;
        let service = BlogService::new(&db, &listing(10));

        let post = service.create_post(author_id, "Original", None).await.unwrap();

        let updated = service
            .edit_post(post.id, Some(author_id), "Edited", Some(group_id))
            .await
            .unwrap();

        assert_eq!(updated.text, "Edited");
        assert_eq!(updated.group_id, Some(group_id));
        // Author and creation timestamp are untouched
        assert_eq!(updated.author_id, post.author_id);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[tokio::test]
    async fn test_edit_post_clears_group() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let group_id = create_test_group(&db, "news").await;
        let service = BlogService::new(&db, &listing(10));

        let post = service
            .create_post(author_id, "Grouped", Some(group_id))
            .await
            .unwrap();

        let updated = service
            .edit_post(post.id, Some(author_id), "Grouped", None)
            .await
            .unwrap();
        assert!(updated.group_id.is_none());
    }

    #[tokio::test]
    async fn test_edit_post_by_non_author_is_forbidden() {
        let db = setup_db().await;
        let alice = create_test_user(&db, "alice").await;
        let bob = create_test_user(&db, "bob").await;
        let service = BlogService::new(&db, &listing(10));

        let post = service.create_post(alice, "Original", None).await.unwrap();

        let result = service.edit_post(post.id, Some(bob), "Hijacked", None).await;
        assert!(matches!(result, Err(QuillError::Forbidden(_))));

        // The post was not mutated
        let unchanged = service.get_post(post.id).await.unwrap();
        assert_eq!(unchanged.text, "Original");
    }

    #[tokio::test]
    async fn test_edit_post_anonymous_is_auth_error() {
        let db = setup_db().await;
        let alice = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(10));

        let post = service.create_post(alice, "Original", None).await.unwrap();

        let result = service.edit_post(post.id, None, "Sneaky", None).await;
        assert!(matches!(result, Err(QuillError::Auth(_))));

        let unchanged = service.get_post(post.id).await.unwrap();
        assert_eq!(unchanged.text, "Original");
    }

    #[tokio::test]
    async fn test_edit_post_not_found() {
        let db = setup_db().await;
        let alice = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(10));

        let result = service.edit_post(999, Some(alice), "Text", None).await;
        assert!(matches!(result, Err(QuillError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_edit_post_validation_applies() {
        let db = setup_db().await;
        let alice = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(10));

        let post = service.create_post(alice, "Original", None).await.unwrap();

        let empty = service.edit_post(post.id, Some(alice), "  ", None).await;
        assert!(matches!(empty, Err(QuillError::Validation(_))));

        let bad_group = service
            .edit_post(post.id, Some(alice), "Fine", Some(999))
            .await;
        assert!(matches!(bad_group, Err(QuillError::Validation(_))));

        let unchanged = service.get_post(post.id).await.unwrap();
        assert_eq!(unchanged.text, "Original");
        assert!(unchanged.group_id.is_none());
    }

    #[tokio::test]
    async fn test_get_post_not_found() {
        let db = setup_db().await;
        let service = BlogService::new(&db, &listing(10));

        let result = service.get_post(42).await;
        assert!(matches!(result, Err(QuillError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_custom_page_size() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(3));

        for i in 1..=7 {
            service
                .create_post(author_id, &format!("Post {i}"), None)
                .await
                .unwrap();
        }

        let page1 = service.list_all(1).await.unwrap();
        assert_eq!(page1.items.len(), 3);
        assert_eq!(page1.total_pages(), 3);

        let page3 = service.list_all(3).await.unwrap();
        assert_eq!(page3.items.len(), 1);
        assert_eq!(page3.items[0].text, "Post 1");
    }

    #[tokio::test]
    async fn test_page_zero_treated_as_first_page() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let service = BlogService::new(&db, &listing(10));

        service.create_post(author_id, "Only", None).await.unwrap();

        let page = service.list_all(0).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 1);
    }
}
