//! Post repository for Quill.
//!
//! This module provides CRUD operations and paginated listing queries for
//! posts. All listings share one ordering: newest first, with the post ID
//! as a stable tie-break so pagination is reproducible.

use sqlx::QueryBuilder;

use super::post::{NewPost, Post, PostUpdate};
use crate::db::DbPool;
use crate::{QuillError, Result};

const POST_COLUMNS: &str = "id, author_id, group_id, text, created_at";

/// Repository for post CRUD operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post.
    ///
    /// Returns the created post with the assigned ID.
    pub async fn create(&self, new_post: &NewPost) -> Result<Post> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (author_id, group_id, text) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(new_post.author_id)
        .bind(new_post.group_id)
        .bind(&new_post.text)
        .fetch_one(self.pool)
        .await
        .map_err(|e| QuillError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| QuillError::NotFound("post".to_string()))
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let result = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| QuillError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Update a post by ID.
    ///
    /// Only fields that are set in the update will be modified. The author
    /// and creation timestamp are never touched.
    /// Returns the updated post, or None if not found.
    pub async fn update(&self, id: i64, update: &PostUpdate) -> Result<Option<Post>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE posts SET ");
        let mut separated = query.separated(", ");

        if let Some(ref text) = update.text {
            separated.push("text = ");
            separated.push_bind_unseparated(text.clone());
        }
        if let Some(group_id) = update.group_id {
            separated.push("group_id = ");
            separated.push_bind_unseparated(group_id);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| QuillError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// List all posts, newest first, with pagination.
    pub async fn list_paginated(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| QuillError::Database(e.to_string()))?;

        Ok(posts)
    }

    /// List posts in a group, newest first, with pagination.
    pub async fn list_by_group_paginated(
        &self,
        group_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE group_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| QuillError::Database(e.to_string()))?;

        Ok(posts)
    }

    /// List posts by author, newest first, with pagination.
    pub async fn list_by_author_paginated(
        &self,
        author_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| QuillError::Database(e.to_string()))?;

        Ok(posts)
    }

    /// Count all posts.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool)
            .await
            .map_err(|e| QuillError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Count posts in a group.
    pub async fn count_by_group(&self, group_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| QuillError::Database(e.to_string()))?;
        Ok(count.0)
    }

    /// Count posts by author.
    pub async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| QuillError::Database(e.to_string()))?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{GroupRepository, NewGroup};
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn create_test_user(db: &Database, username: &str) -> i64 {
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(&NewUser::new(username, "hash", username))
            .await
            .unwrap();
        user.id
    }

    async fn create_test_group(db: &Database, slug: &str) -> i64 {
        let repo = GroupRepository::new(db.pool());
        let group = repo.create(&NewGroup::new(slug, slug)).await.unwrap();
        group.id
    }

    #[tokio::test]
    async fn test_create_post() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let repo = PostRepository::new(db.pool());

        let post = repo
            .create(&NewPost::new(author_id, "Hello World"))
            .await
            .unwrap();

        assert_eq!(post.author_id, author_id);
        assert!(post.group_id.is_none());
        assert_eq!(post.text, "Hello World");
        assert!(!post.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_create_post_with_group() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let group_id = create_test_group(&db, "news").await;
        let repo = PostRepository::new(db.pool());

        let post = repo
            .create(&NewPost::new(author_id, "Grouped").with_group(group_id))
            .await
            .unwrap();

        assert_eq!(post.group_id, Some(group_id));
    }

    #[tokio::test]
    async fn test_create_post_unknown_author_rejected() {
        let db = setup_db().await;
        let repo = PostRepository::new(db.pool());

        // Foreign keys are on; an unknown author must be rejected
        let result = repo.create(&NewPost::new(999, "Orphan")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let repo = PostRepository::new(db.pool());

        let created = repo.create(&NewPost::new(author_id, "Hello")).await.unwrap();

        let found = repo.get_by_id(created.id).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().text, "Hello");

        let not_found = repo.get_by_id(999).await.unwrap();
        assert!(not_found.is_none());
    }

    #[tokio::test]
    async fn test_update_text() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let repo = PostRepository::new(db.pool());

        let post = repo
            .create(&NewPost::new(author_id, "Original"))
            .await
            .unwrap();

        let update = PostUpdate::new().text("Updated");
        let updated = repo.update(post.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.text, "Updated");
        assert_eq!(updated.author_id, post.author_id);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[tokio::test]
    async fn test_update_group_and_clear() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let group_id = create_test_group(&db, "news").await;
        let repo = PostRepository::new(db.pool());

        let post = repo.create(&NewPost::new(author_id, "Hello")).await.unwrap();

        let updated = repo
            .update(post.id, &PostUpdate::new().group_id(Some(group_id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.group_id, Some(group_id));

        let cleared = repo
            .update(post.id, &PostUpdate::new().group_id(None))
            .await
            .unwrap()
            .unwrap();
        assert!(cleared.group_id.is_none());
    }

    #[tokio::test]
    async fn test_update_empty() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let repo = PostRepository::new(db.pool());

        let post = repo.create(&NewPost::new(author_id, "Hello")).await.unwrap();

        let result = repo.update(post.id, &PostUpdate::new()).await.unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().text, "Hello");
    }

    #[tokio::test]
    async fn test_update_nonexistent_post() {
        let db = setup_db().await;
        let repo = PostRepository::new(db.pool());

        let result = repo
            .update(999, &PostUpdate::new().text("New"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_paginated_newest_first() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let repo = PostRepository::new(db.pool());

        for i in 1..=5 {
            repo.create(&NewPost::new(author_id, format!("Post {i}")))
                .await
                .unwrap();
        }

        let page1 = repo.list_paginated(0, 2).await.unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].text, "Post 5");
        assert_eq!(page1[1].text, "Post 4");

        let page2 = repo.list_paginated(2, 2).await.unwrap();
        assert_eq!(page2.len(), 2);
        assert_eq!(page2[0].text, "Post 3");

        let beyond = repo.list_paginated(10, 2).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_tie_break_is_stable_within_same_timestamp() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let repo = PostRepository::new(db.pool());

        // Posts created in the same second share created_at; the id
        // tie-break must keep the newest-first order deterministic.
        for i in 1..=4 {
            repo.create(&NewPost::new(author_id, format!("Post {i}")))
                .await
                .unwrap();
        }

        let all = repo.list_paginated(0, 10).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|p| p.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn test_list_by_group_paginated() {
        let db = setup_db().await;
        let author_id = create_test_user(&db, "alice").await;
        let group_id = create_test_group(&db, "news").await;
        let other_group = create_test_group(&db, "sports").await;
        let repo = PostRepository::new(db.pool());

        repo.create(&NewPost::new(author_id, "In news").with_group(group_id))
            .await
            .unwrap();
        repo.create(&NewPost::new(author_id, "In sports").with_group(other_group))
            .await
            .unwrap();
        repo.create(&NewPost::new(author_id, "Ungrouped"))
            .await
            .unwrap();

        let posts = repo.list_by_group_paginated(group_id, 0, 10).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text, "In news");
    }

    #[tokio::test]
    async fn test_list_by_author_paginated() {
        let db = setup_db().await;
        let alice = create_test_user(&db, "alice").await;
        let bob = create_test_user(&db, "bob").await;
        let repo = PostRepository::new(db.pool());

        repo.create(&NewPost::new(alice, "By alice 1")).await.unwrap();
        repo.create(&NewPost::new(bob, "By bob")).await.unwrap();
        repo.create(&NewPost::new(alice, "By alice 2")).await.unwrap();

        let posts = repo.list_by_author_paginated(alice, 0, 10).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].text, "By alice 2");
        assert_eq!(posts[1].text, "By alice 1");
    }

    #[tokio::test]
    async fn test_counts() {
        let db = setup_db().await;
        let alice = create_test_user(&db, "alice").await;
        let bob = create_test_user(&db, "bob").await;
        let group_id = create_test_group(&db, "news").await;
        let repo = PostRepository::new(db.pool());

        assert_eq!(repo.count().await.unwrap(), 0);

        repo.create(&NewPost::new(alice, "One").with_group(group_id))
            .await
            .unwrap();
        repo.create(&NewPost::new(alice, "Two")).await.unwrap();
        repo.create(&NewPost::new(bob, "Three")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.count_by_group(group_id).await.unwrap(), 1);
        assert_eq!(repo.count_by_author(alice).await.unwrap(), 2);
        assert_eq!(repo.count_by_author(bob).await.unwrap(), 1);
    }
}
