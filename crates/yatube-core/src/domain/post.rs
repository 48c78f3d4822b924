use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, Group};

/// Number of characters of the text used as a post's page title.
pub const TITLE_LENGTH: usize = 30;

/// Post entity - a text entry written by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub author_id: Uuid,
    pub group_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Whether `user_id` wrote this post.
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// The first characters of the text, used as the detail page title.
    pub fn title(&self) -> String {
        self.text.chars().take(TITLE_LENGTH).collect()
    }
}

/// A post about to be inserted. The id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: Uuid,
    pub group_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(author_id: Uuid, text: String, group_id: Option<i32>) -> Self {
        Self {
            text,
            author_id,
            group_id,
            created_at: Utc::now(),
        }
    }
}

/// The editable fields of a post. Author and timestamp never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i32>,
}

/// A post together with its author and group, as shown in feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEntry {
    pub post: Post,
    pub author: Author,
    pub group: Option<Group>,
}

/// Which posts a feed contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i32),
    Author(Uuid),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(*group_id),
            PostFilter::Author(author_id) => post.author_id == *author_id,
        }
    }
}
