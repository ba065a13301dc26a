//! Caller identity and the authentication context passed to every operation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::quota::UserId;
use crate::error::{Result, RotorError};

/// Dashboard role.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = RotorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(RotorError::InvalidInput(format!("unknown role '{}'", other))),
        }
    }
}

/// An authenticated user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user(user_id: UserId) -> Self {
        Self::new(user_id, Role::User)
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Who is making the current call, if anyone.
///
/// Operations receive this explicitly instead of reading a global session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthContext {
    identity: Option<Identity>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The caller's identity, or `Unauthorized`.
    pub fn require(&self) -> Result<&Identity> {
        self.identity.as_ref().ok_or(RotorError::Unauthorized)
    }

    /// The caller's identity if it holds the admin role.
    pub fn require_admin(&self) -> Result<&Identity> {
        let identity = self.require()?;
        if !identity.is_admin() {
            return Err(RotorError::Forbidden(format!(
                "user {} is not an admin",
                identity.user_id
            )));
        }
        Ok(identity)
    }

    /// Allow the caller to act on `user_id`: themself always, anyone else only as admin.
    pub fn require_self_or_admin(&self, user_id: UserId) -> Result<&Identity> {
        let identity = self.require()?;
        if identity.user_id == user_id {
            return Ok(identity);
        }
        self.require_admin()
    }
}

impl From<Identity> for AuthContext {
    fn from(identity: Identity) -> Self {
        Self::authenticated(identity)
    }
}
