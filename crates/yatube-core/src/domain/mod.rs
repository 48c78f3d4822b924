//! Domain entities - the core business objects.

mod group;
mod post;
mod user;

pub use group::{Group, NewGroup};
pub use post::{NewPost, Post, PostChanges, PostEntry, PostFilter, TITLE_LENGTH};
pub use user::{Author, User};
