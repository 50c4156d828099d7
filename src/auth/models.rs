use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform roles carried in the `role` claim and stored on `users`.
///
/// Ordered by privilege: `User` is the least privileged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
    SuperAdmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "super-admin"),
        }
    }
}

impl Role {
    /// Parse a role (case-insensitive). Anything unrecognised is a plain user.
    pub fn from_str_ci(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Role::Admin,
            "super-admin" | "superadmin" | "super_admin" => Role::SuperAdmin,
            _ => Role::User,
        }
    }

    /// Returns `true` for roles allowed on the admin endpoints.
    pub fn is_admin(&self) -> bool {
        *self >= Role::Admin
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::from_str_ci(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

/// Claims carried by a CYBEV bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user id (ObjectId hex for real accounts).
    #[serde(alias = "userId")]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
}

/// A caller whose bearer token verified successfully.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            role: claims.role,
        }
    }
}
