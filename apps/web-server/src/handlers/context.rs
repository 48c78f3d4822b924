//! Template names and the contexts rendered into them.

use serde::Serialize;

use yatube_core::Page;
use yatube_core::domain::{Author, Group, PostEntry};
use yatube_core::forms::FormErrors;
use yatube_shared::dto::{AuthorItem, GroupItem, PostItem};

pub const INDEX_TEMPLATE: &str = "posts/index.html";
pub const GROUP_LIST_TEMPLATE: &str = "posts/group_list.html";
pub const PROFILE_TEMPLATE: &str = "posts/profile.html";
pub const POST_DETAIL_TEMPLATE: &str = "posts/post_detail.html";
/// Shared by post creation and editing.
pub const POST_FORM_TEMPLATE: &str = "posts/create.html";
pub const SIGNUP_TEMPLATE: &str = "users/signup.html";
pub const LOGIN_TEMPLATE: &str = "users/login.html";

#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub page_obj: Page<PostItem>,
}

#[derive(Debug, Serialize)]
pub struct GroupListContext {
    pub group: GroupItem,
    pub page_obj: Page<PostItem>,
}

#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub author: AuthorItem,
    pub posts_count: u64,
    pub page_obj: Page<PostItem>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    pub post: PostItem,
    /// First characters of the post text.
    pub title: String,
    /// Total posts by the same author.
    pub posts_count: u64,
    /// Whether the viewer wrote this post.
    pub can_edit: bool,
}

/// A bound form: submitted (or initial) values plus any errors.
#[derive(Debug, Serialize)]
pub struct FormView<D> {
    pub data: D,
    pub errors: FormErrors,
}

impl<D> FormView<D> {
    pub fn unbound(data: D) -> Self {
        Self {
            data,
            errors: FormErrors::new(),
        }
    }

    pub fn invalid(data: D, errors: FormErrors) -> Self {
        Self { data, errors }
    }
}

#[derive(Debug, Serialize)]
pub struct PostFormContext<D> {
    pub form: FormView<D>,
    /// Choices for the group select.
    pub groups: Vec<GroupItem>,
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AccountFormContext<D> {
    pub form: FormView<D>,
}

pub fn author_item(author: Author) -> AuthorItem {
    AuthorItem {
        id: author.id,
        username: author.username,
    }
}

pub fn group_item(group: Group) -> GroupItem {
    GroupItem {
        id: group.id,
        slug: group.slug,
        title: group.title,
        description: group.description,
    }
}

pub fn post_item(entry: PostEntry) -> PostItem {
    PostItem {
        id: entry.post.id,
        text: entry.post.text,
        created_at: entry.post.created_at,
        author: author_item(entry.author),
        group: entry.group.map(group_item),
    }
}
