//! # Yatube Shared
//!
//! Wire types shared by the server and its clients: the items placed into
//! template contexts, the rendered-page envelope and error bodies.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, Rendered};
