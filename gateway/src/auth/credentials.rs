//! Username/password lookup for the login endpoint.

use std::collections::HashMap;

use async_trait::async_trait;

/// Capability for checking login credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Return `true` only when `username` exists and `password` matches.
    async fn authenticate(&self, username: &str, password: &str) -> bool;
}

/// Fixed in-memory credential map.
///
/// Passwords are stored and compared in plaintext. This keeps parity with
/// the existing clients and is NOT suitable for production use; swap in a
/// hashed store before exposing the service.
#[derive(Debug, Clone)]
pub struct StaticCredentialStore {
    users: HashMap<String, String>,
}

impl StaticCredentialStore {
    pub fn new<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }
}

impl Default for StaticCredentialStore {
    fn default() -> Self {
        Self::new([("testuser", "testpassword")])
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn authenticate(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(stored) => constant_time_compare(stored, password),
            None => false,
        }
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_user_authenticates() {
        let store = StaticCredentialStore::default();
        assert!(store.authenticate("testuser", "testpassword").await);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let store = StaticCredentialStore::default();
        assert!(!store.authenticate("testuser", "wrong").await);
        assert!(!store.authenticate("testuser", "").await);
        assert!(!store.authenticate("testuser", "testpassword ").await);
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let store = StaticCredentialStore::default();
        assert!(!store.authenticate("nouser", "testpassword").await);
        assert!(!store.authenticate("nouser", "anything").await);
    }

    #[tokio::test]
    async fn test_custom_users() {
        let store = StaticCredentialStore::new([("ana", "s3cret"), ("luis", "hunter2")]);
        assert!(store.authenticate("luis", "hunter2").await);
        assert!(!store.authenticate("testuser", "testpassword").await);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
