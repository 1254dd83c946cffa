use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a clash on email or username is [`UserError::AlreadyTaken`]
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Case-insensitive email lookup
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Newest first
    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>>;

    async fn count(&self) -> UserResult<u64>;

    /// Replace the stored record with `user`
    async fn update(&self, user: User) -> UserResult<User>;

    /// Returns false when no row matched
    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    /// Whether another user (other than `exclude`) already has this email
    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool>;

    async fn username_exists(&self, username: &str, exclude: Option<Uuid>) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clash(users: &HashMap<Uuid, User>, candidate: &User) -> Option<&'static str> {
    let others = || users.values().filter(|u| u.id != candidate.id);

    if others().any(|u| u.email.eq_ignore_ascii_case(&candidate.email)) {
        Some("email")
    } else if others().any(|u| u.username == candidate.username) {
        Some("username")
    } else {
        None
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if let Some(field) = clash(&users, &user) {
            return Err(UserError::AlreadyTaken(field));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(result
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> UserResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        if let Some(field) = clash(&users, &user) {
            return Err(UserError::AlreadyTaken(field));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .any(|u| Some(u.id) != exclude && u.email.eq_ignore_ascii_case(email)))
    }

    async fn username_exists(&self, username: &str, exclude: Option<Uuid>) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .any(|u| Some(u.id) != exclude && u.username == username))
    }
}
