//! User accounts and roles.

use crate::validation::{into_result, FieldError, FieldErrors};
use crate::{Error, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const LOGIN_MIN: usize = 3;
const LOGIN_MAX: usize = 20;
const PASSWORD_MIN: usize = 4;

/// Access level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Read,
    Write,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }

    /// Every role may list licences.
    #[must_use]
    pub fn can_read(&self) -> bool {
        true
    }

    /// Returns true if the role may create, update or delete licences.
    #[must_use]
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Write | Self::Admin)
    }

    /// Returns true if the role may manage other users.
    #[must_use]
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "admin" => Ok(Self::Admin),
            other => Err(Error::InvalidRole(other.to_string())),
        }
    }
}

/// Hashes a password, salted with the login it belongs to.
#[must_use]
pub fn hash_password(login: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"lictrack:");
    hasher.update(login.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub login: String,
    pub password_hash: String,
    pub role: Role,
    pub must_change_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a user from a validated draft, hashing its password.
    #[must_use]
    pub fn from_draft(id: RecordId, draft: &UserDraft, now: DateTime<Utc>) -> Self {
        let login = draft.login.trim().to_string();
        Self {
            id,
            password_hash: hash_password(&login, &draft.password),
            login,
            role: draft.role,
            must_change_password: draft.must_change_password,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks `password` against the stored hash.
    #[must_use]
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(&self.login, password) == self.password_hash
    }

    /// Applies `patch` and stamps `updated_at`. Logins are immutable.
    ///
    /// Setting a new password clears `must_change_password` unless the
    /// patch sets that flag explicitly.
    pub fn patched(&self, patch: &UserPatch, now: DateTime<Utc>) -> Result<Self, FieldErrors> {
        patch.validate()?;

        let mut merged = self.clone();
        if let Some(password) = &patch.password {
            merged.password_hash = hash_password(&merged.login, password);
            merged.must_change_password = false;
        }
        if let Some(role) = patch.role {
            merged.role = role;
        }
        if let Some(flag) = patch.must_change_password {
            merged.must_change_password = flag;
        }
        merged.updated_at = now;
        Ok(merged)
    }
}

/// The caller-supplied fields of a new user. The password is plaintext
/// until the store hashes it.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct UserDraft {
    pub login: String,
    pub password: String,
    pub role: Role,
    pub must_change_password: bool,
}

impl fmt::Debug for UserDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDraft")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("must_change_password", &self.must_change_password)
            .finish()
    }
}

impl UserDraft {
    pub fn new(login: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            role,
            must_change_password: false,
        }
    }

    /// The account created when a user store starts out empty.
    #[must_use]
    pub fn default_admin() -> Self {
        Self {
            login: "admin".to_string(),
            password: "admin".to_string(),
            role: Role::Admin,
            must_change_password: true,
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = Vec::new();

        let login = self.login.trim();
        if login.is_empty() {
            errors.push(FieldError::new("login", "login is required"));
        } else if !is_valid_login(login) {
            errors.push(FieldError::new(
                "login",
                "login must be 3-20 characters of letters, digits, '-' or '_'",
            ));
        }
        if let Some(e) = password_error(&self.password) {
            errors.push(e);
        }

        into_result(errors)
    }
}

/// A partial update to a user.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub password: Option<String>,
    pub role: Option<Role>,
    pub must_change_password: Option<bool>,
}

impl fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPatch")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("must_change_password", &self.must_change_password)
            .finish()
    }
}

impl UserPatch {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let errors = self
            .password
            .as_deref()
            .and_then(password_error)
            .into_iter()
            .collect();
        into_result(errors)
    }
}

fn is_valid_login(login: &str) -> bool {
    (LOGIN_MIN..=LOGIN_MAX).contains(&login.chars().count())
        && login
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn password_error(password: &str) -> Option<FieldError> {
    if password.is_empty() {
        Some(FieldError::new("password", "password is required"))
    } else if password.chars().count() < PASSWORD_MIN {
        Some(FieldError::new(
            "password",
            format!("password must be at least {PASSWORD_MIN} characters"),
        ))
    } else {
        None
    }
}
