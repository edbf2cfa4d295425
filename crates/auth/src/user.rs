//! Staff user model and its repository port.
//!
//! Users are managed exclusively by the Management department; the lifecycle
//! layer enforces that, this module enforces record-level validity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use banquet_core::{DomainError, DomainResult, Entity, StoreResult, UserId};

use crate::department::Department;

/// A staff user.
///
/// # Invariants
/// - `employee_id` and `email` are unique across the directory (enforced by
///   the repository).
/// - `email` is stored trimmed and lowercased.
/// - `password_hash` is an Argon2id PHC string; the plaintext never lands here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub department: Department,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a user. The password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub department: Department,
    pub created_at: DateTime<Utc>,
}

/// Partial update: `None` keeps the existing value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<Department>,
    pub password_hash: Option<String>,
}

impl User {
    pub fn create(input: NewUser) -> DomainResult<User> {
        let employee_id = input.employee_id.trim().to_string();
        if employee_id.is_empty() {
            return Err(DomainError::validation("employee id cannot be empty"));
        }

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(User {
            id: UserId::new(),
            employee_id,
            name,
            email: normalize_email(&input.email)?,
            password_hash: input.password_hash,
            department: input.department,
            created_at: input.created_at,
        })
    }

    /// Merge a partial update into a validated copy.
    ///
    /// The receiver is untouched; on error no new state exists, so a caller
    /// that persists the returned copy gets all-or-nothing semantics for free.
    pub fn apply_patch(&self, patch: &UserPatch) -> DomainResult<User> {
        let mut next = self.clone();

        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            next.name = name.to_string();
        }
        if let Some(email) = &patch.email {
            next.email = normalize_email(email)?;
        }
        if let Some(department) = patch.department {
            next.department = department;
        }
        if let Some(hash) = &patch.password_hash {
            next.password_hash = hash.clone();
        }

        Ok(next)
    }
}

pub(crate) fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

/// Credential store port.
///
/// Lookups return `Ok(None)` on a miss; mutations report uniqueness clashes
/// as `StoreError::Conflict`. The backing store provides the transactional
/// semantics.
pub trait UserRepository: Send + Sync {
    fn create_user(&self, user: &User) -> StoreResult<()>;
    fn update_user(&self, user: &User) -> StoreResult<()>;
    fn delete_user(&self, id: UserId) -> StoreResult<()>;
    fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
    /// Case-insensitive exact match on email.
    fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    fn list_users(&self) -> StoreResult<Vec<User>>;
}
