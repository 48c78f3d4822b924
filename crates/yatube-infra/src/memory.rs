//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Note: Data is lost on process restart.

use std::cmp::Reverse;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{
    Author, Group, NewGroup, NewPost, Post, PostChanges, PostEntry, PostFilter, User,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    last_group_id: i32,
    last_post_id: i32,
}

impl Tables {
    fn entry(&self, post: &Post) -> Result<PostEntry, RepoError> {
        let author = self
            .users
            .iter()
            .find(|u| u.id == post.author_id)
            .map(Author::from)
            .ok_or_else(|| {
                RepoError::Constraint(format!("post {} references a missing author", post.id))
            })?;
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
            .cloned();

        Ok(PostEntry {
            post: post.clone(),
            author,
            group,
        })
    }

    fn check_references(&self, author_id: Uuid, group_id: Option<i32>) -> Result<(), RepoError> {
        if !self.users.iter().any(|u| u.id == author_id) {
            return Err(RepoError::Constraint(format!("unknown author {author_id}")));
        }
        if let Some(id) = group_id {
            if !self.groups.iter().any(|g| g.id == id) {
                return Err(RepoError::Constraint(format!("unknown group {id}")));
            }
        }
        Ok(())
    }
}

/// Users, groups and posts held in a single async `RwLock`.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.id == user.id || u.username == user.username)
        {
            return Err(RepoError::Constraint("User already exists".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BaseRepository<Group, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn create(&self, new_group: NewGroup) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == new_group.slug) {
            return Err(RepoError::Constraint(format!(
                "Group slug '{}' already exists",
                new_group.slug
            )));
        }

        tables.last_group_id += 1;
        let group = Group {
            id: tables.last_group_id,
            slug: new_group.slug,
            title: new_group.title,
            description: new_group.description,
        };
        tables.groups.push(group.clone());
        Ok(group)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.entry(p))
            .transpose()
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Post> = tables.posts.iter().filter(|p| filter.matches(p)).collect();
        matching.sort_by_key(|p| Reverse((p.created_at, p.id)));

        matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|p| tables.entry(p))
            .collect()
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_references(new_post.author_id, new_post.group_id)?;

        tables.last_post_id += 1;
        let post = Post {
            id: tables.last_post_id,
            text: new_post.text,
            author_id: new_post.author_id,
            group_id: new_post.group_id,
            created_at: new_post.created_at,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let author_id = tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.author_id)
            .ok_or(RepoError::NotFound)?;
        tables.check_references(author_id, changes.group_id)?;

        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        post.text = changes.text;
        post.group_id = changes.group_id;
        Ok(post.clone())
    }
}
