use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Group, NewGroup, NewPost, Post, PostChanges, PostEntry, PostFilter, User,
};
use crate::error::RepoError;

/// Lookup shared by every repository keyed on a primary key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Persist a freshly registered user.
    async fn create(&self, user: User) -> Result<User, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i32> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;
}

/// Post repository.
///
/// Listings are ordered newest first, ties broken by descending id, so
/// that consecutive pages never overlap.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<PostEntry>, RepoError>;

    /// Number of posts matching `filter`.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// One slice of the feed described by `filter`.
    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError>;

    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace the editable fields of an existing post.
    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError>;
}
