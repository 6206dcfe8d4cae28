use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::role::{Department, Role};

/// A stored user account, including its password hash.
///
/// This type never leaves the auth/db boundary; everything user-facing works
/// with [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: String,
    pub department: Department,
    pub title: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }

    /// Returns the public subset of this user (no password hash).
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            department: self.department,
            title: self.title.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// A user with the password hash omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub department: Department,
    pub title: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for PublicUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.full_name, self.username)?;
        writeln!(f, "Email: {}", self.email)?;
        writeln!(f, "Department: {}", self.department)?;
        writeln!(f, "Title: {}", self.title)?;
        write!(f, "Role: {}", self.role.label())
    }
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub department: Department,
    pub title: String,
    /// Requested role; `None` registers a plain employee.
    #[serde(default)]
    pub role: Option<Role>,
}

impl NewUser {
    /// Checks the shape of the payload before anything touches storage.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().chars().count() < 3 {
            return Err("Username must be at least 3 characters".to_string());
        }
        if self.password.chars().count() < 6 {
            return Err("Password must be at least 6 characters".to_string());
        }
        if self.full_name.trim().chars().count() < 2 {
            return Err("Full name is required".to_string());
        }
        if !self.email.contains('@') {
            return Err(format!("Invalid email address '{}'", self.email));
        }
        Ok(())
    }
}
