//! In-memory user store.
//!
//! DESIGN
//! ======
//! A `Mutex<HashMap>` with an incrementing integer id, nothing more. No
//! authentication sits on top of this (non-goal); the password field is
//! carried opaquely and never serialized out of the store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("username already taken: {0}")]
    DuplicateUsername(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

struct UserMap {
    users: HashMap<u64, User>,
    next_id: u64,
}

/// Process-wide user registry.
pub struct UserStore {
    inner: Mutex<UserMap>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Mutex::new(UserMap { users: HashMap::new(), next_id: 1 }) }
    }

    /// Create a user with the next auto-incremented id.
    ///
    /// # Errors
    ///
    /// `DuplicateUsername` if the username is already registered.
    pub fn create_user(&self, username: &str, password: &str) -> Result<User, UserError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.users.values().any(|u| u.username == username) {
            return Err(UserError::DuplicateUsername(username.to_string()));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        let user = User { id, username: username.to_string(), password: password.to_string() };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    #[must_use]
    pub fn get_user(&self, id: u64) -> Option<User> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.users.get(&id).cloned()
    }

    #[must_use]
    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.users.values().find(|u| u.username == username).cloned()
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
