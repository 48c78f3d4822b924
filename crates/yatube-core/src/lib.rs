//! # Yatube Core
//!
//! The domain layer of the Yatube blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the ports infrastructure implements, feed pagination and form
//! validation.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::RepoError;
pub use pagination::{Page, PageRequest, Paginator};
