//! Authentication support for Quill.
//!
//! Password hashing and validation. Request-level authentication (JWT
//! extraction and verification) lives in the web middleware.

mod password;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
