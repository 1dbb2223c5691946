//! In-memory [`UserRepository`].

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{User, UserId};

/// User store kept in process memory, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Name the unique field `candidate` would collide on, ignoring its own row.
fn collision(users: &[User], candidate: &User) -> Option<&'static str> {
    users
        .iter()
        .filter(|u| u.id != candidate.id)
        .find_map(|u| {
            if u.username == candidate.username {
                Some("username")
            } else if u.email == candidate.email {
                Some("email")
            } else {
                None
            }
        })
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        if let Some(field) = collision(&users, user) {
            return Err(UserRepositoryError::duplicate(field));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let mut users = self.users.write().await;
        if let Some(field) = collision(&users, user) {
            return Err(UserRepositoryError::duplicate(field));
        }
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.users.read().await.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        Ok(self.users.read().await.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| &u.id != id);
        Ok(users.len() != before)
    }
}
