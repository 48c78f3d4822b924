//! SeaORM entities backing the repositories.

pub mod group;
pub mod post;
pub mod user;
