//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs shared with the front end. Admin endpoints require
//! the `admin` or `super-admin` role.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtVerifier;
pub use middleware::{bearer_token, AdminUser};
pub use models::{AuthenticatedUser, Claims, Role};
