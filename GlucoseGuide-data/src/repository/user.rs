use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::models::{CreateUserRequest, User};
use super::errors::RepositoryError;
use super::in_memory::InMemoryUserStore;
use super::store::{ScanFilter, UserStore};

/// Repository trait for registered users
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Users that are not soft-deleted
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// A single live user; `NotFound` when missing or soft-deleted
    async fn find_one(&self, id: &str) -> Result<User, RepositoryError>;

    /// Whether any user, live or soft-deleted, carries `id`
    async fn is_exist(&self, id: &str) -> bool;

    /// Register a user who has not agreed to the terms yet
    async fn create_one(&self, request: CreateUserRequest) -> Result<User, RepositoryError>;

    /// Record that the user agreed to the terms now
    async fn update_term_agreed_at(&self, id: &str) -> Result<User, RepositoryError>;
}

/// Repository for users, backed by any [`UserStore`]
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Repository over a fresh, empty in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryUserStore::new()))
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        debug!("Getting all users");
        self.store.scan(ScanFilter::Live).await
    }

    async fn find_one(&self, id: &str) -> Result<User, RepositoryError> {
        debug!("Getting user by ID: {}", id);
        match self.store.get(id).await? {
            Some(user) if !user.is_deleted => Ok(user),
            _ => Err(RepositoryError::NotFound(id.to_string())),
        }
    }

    async fn is_exist(&self, id: &str) -> bool {
        match self.store.get(id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                error!("Failed to look up user {}: {}", id, e);
                false
            }
        }
    }

    async fn create_one(&self, request: CreateUserRequest) -> Result<User, RepositoryError> {
        let now = Utc::now();
        let user = User {
            id: request.id,
            term_agreed_at: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        self.store.insert(user.clone()).await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    async fn update_term_agreed_at(&self, id: &str) -> Result<User, RepositoryError> {
        let mut user = self.find_one(id).await?;

        let now = Utc::now();
        user.term_agreed_at = Some(now);
        user.updated_at = now;

        self.store.put(user.clone()).await?;
        info!("User {} agreed to the terms", user.id);
        Ok(user)
    }
}
