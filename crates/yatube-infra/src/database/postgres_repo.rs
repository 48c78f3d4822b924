//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use uuid::Uuid;

use yatube_core::domain::{
    Author, Group, NewGroup, NewPost, Post, PostChanges, PostEntry, PostFilter, User,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{GroupRepository, PostRepository, UserRepository};

use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new_group: NewGroup) -> Result<Group, RepoError> {
        let model = group::ActiveModel::from(new_group)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }
}

impl PostgresPostRepository {
    /// Posts matching `filter`, unordered.
    fn feed(filter: &PostFilter) -> Select<PostEntity> {
        let query = PostEntity::find();
        match filter {
            PostFilter::All => query,
            PostFilter::Group(group_id) => query.filter(post::Column::GroupId.eq(*group_id)),
            PostFilter::Author(author_id) => query.filter(post::Column::AuthorId.eq(*author_id)),
        }
    }

    /// Resolve the authors of `rows` with one query and build entries,
    /// preserving row order.
    async fn load_entries(
        &self,
        rows: Vec<(post::Model, Option<group::Model>)>,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let author_ids: HashSet<Uuid> = rows.iter().map(|(p, _)| p.author_id).collect();
        let authors: HashMap<Uuid, Author> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            UserEntity::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(self.db.as_ref())
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|u| {
                    let author = Author {
                        id: u.id,
                        username: u.username,
                    };
                    (author.id, author)
                })
                .collect()
        };

        rows.into_iter()
            .map(|(post, group)| {
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    RepoError::Constraint(format!("post {} references a missing author", post.id))
                })?;
                Ok(PostEntry {
                    post: post.into(),
                    author,
                    group: group.map(Into::into),
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<PostEntry>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(GroupEntity)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.load_entries(vec![row]).await?.pop())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        Self::feed(filter).count(self.db.as_ref()).await.map_err(map_db_err)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let rows = Self::feed(filter)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .find_also_related(GroupEntity)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        self.load_entries(rows).await
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(new_post)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        tracing::debug!(post_id = model.id, "Post inserted");
        Ok(model.into())
    }

    async fn update(&self, id: i32, changes: PostChanges) -> Result<Post, RepoError> {
        let existing = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut model: post::ActiveModel = existing.into();
        model.text = Set(changes.text);
        model.group_id = Set(changes.group_id);
        let updated = model.update(self.db.as_ref()).await.map_err(map_db_err)?;

        Ok(updated.into())
    }
}
