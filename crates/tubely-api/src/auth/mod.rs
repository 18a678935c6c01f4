//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs whose `sub` claim is the caller's user id. Handlers take an
//! [`AuthUser`] argument to require one.

pub mod jwt;
pub mod models;

pub use jwt::{issue_token, verify_token};
pub use models::{AuthUser, Claims};
