//! Quill - A group blogging platform with a JSON API.
//!
//! Registered users write text posts, optionally assigned to a group
//! (topic); anyone can browse paginated listings by feed, group, or
//! author, and view single posts.

pub mod auth;
pub mod blog;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password, PasswordError};
pub use blog::{BlogService, EditAccess, Group, NewGroup, NewPost, Page, Post, PostUpdate};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{QuillError, Result};
pub use web::WebServer;
