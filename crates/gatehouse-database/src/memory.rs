//! In-process credential store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::user::{NewUser, User, UserRole};

use crate::store::CredentialStore;

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

/// A [`CredentialStore`] backed by a map behind a tokio `RwLock`.
///
/// Used by the `memory` database provider and by tests. Deletes are hard
/// deletes; ids are never reused.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn username_taken(inner: &Inner, username: &str, except: Option<i64>) -> bool {
    inner
        .users
        .values()
        .any(|u| Some(u.id) != except && u.username.eq_ignore_ascii_case(username))
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if username_taken(&inner, &user.username, None) {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }
        inner.next_id += 1;
        let now = Utc::now();
        let created = User {
            id: inner.next_id,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user.id) {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        }
        if username_taken(&inner, &user.username, Some(user.id)) {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }
        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        inner.users.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        match self.inner.write().await.users.remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("User {id} not found"))),
        }
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.inner.read().await.users.len() as u64)
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().filter(|u| u.role == role).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;

    fn new_user(name: &str, role: UserRole) -> NewUser {
        NewUser {
            username: name.to_string(),
            password_hash: "hash".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryCredentialStore::new();
        let a = store.create(new_user("alice", UserRole::Admin)).await.unwrap();
        let b = store
            .create(new_user("bob", UserRole::SuperAdmin))
            .await
            .unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.count_by_role(UserRole::SuperAdmin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryCredentialStore::new();
        store.create(new_user("alice", UserRole::Admin)).await.unwrap();
        let err = store
            .create(new_user("ALICE", UserRole::Admin))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_username_is_case_insensitive() {
        let store = MemoryCredentialStore::new();
        store.create(new_user("Alice", UserRole::Admin)).await.unwrap();
        let found = store.find_by_username("alice").await.unwrap();
        assert_eq!(found.map(|u| u.username), Some("Alice".to_string()));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryCredentialStore::new();
        let mut user = store.create(new_user("alice", UserRole::Admin)).await.unwrap();
        user.password_hash = "new-hash".to_string();
        let updated = store.update(&user).await.unwrap();
        assert_eq!(updated.password_hash, "new-hash");

        user.id = 99;
        assert_eq!(
            store.update(&user).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(store.delete(99).await.unwrap_err().kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_frees_username() {
        let store = MemoryCredentialStore::new();
        let user = store.create(new_user("alice", UserRole::Admin)).await.unwrap();
        store.delete(user.id).await.unwrap();
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        let again = store.create(new_user("alice", UserRole::Admin)).await.unwrap();
        assert_ne!(again.id, user.id);
    }
}
