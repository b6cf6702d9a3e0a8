use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, instrument, warn};
use validator::Validate;

use glucose_guide_data::repository::{RepositoryError, UserRepository, UserRepositoryTrait, UserStore};

use crate::entities::conversions;
use crate::entities::{CreateUser, User};
use crate::services::measurement::validation_message;

/// User service errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserServiceError {
    #[error("User not found: {0}")]
    NotFound(String),

    /// The id is already registered
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for UserServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => UserServiceError::NotFound(id),
            RepositoryError::AlreadyExists(id) => UserServiceError::AlreadyExists(id),
            _ => {
                error!("User repository failure: {}", err);
                UserServiceError::Storage(err.to_string())
            }
        }
    }
}

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// All live users
    async fn find_all(&self) -> Result<Vec<User>, UserServiceError>;

    /// A single live user
    async fn find_one(&self, id: &str) -> Result<User, UserServiceError>;

    /// Validate and register a user
    async fn create_one(&self, request: CreateUser) -> Result<User, UserServiceError>;

    /// Mark the user as having agreed to the terms of service
    async fn agree_to_terms(&self, id: &str) -> Result<User, UserServiceError>;
}

/// User service for domain logic
pub struct UserService<R: UserRepositoryTrait> {
    repository: R,
}

impl<R: UserRepositoryTrait> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: UserRepositoryTrait> UserServiceTrait for UserService<R> {
    async fn find_all(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.find_all().await?)
    }

    async fn find_one(&self, id: &str) -> Result<User, UserServiceError> {
        Ok(self.repository.find_one(id).await?)
    }

    #[instrument(skip(self, request))]
    async fn create_one(&self, request: CreateUser) -> Result<User, UserServiceError> {
        request.validate().map_err(|errors| {
            let message = validation_message(&errors);
            warn!("Rejected user input: {}", message);
            UserServiceError::Validation(message)
        })?;

        Ok(self
            .repository
            .create_one(conversions::convert_to_data_create_user_request(request))
            .await?)
    }

    #[instrument(skip(self))]
    async fn agree_to_terms(&self, id: &str) -> Result<User, UserServiceError> {
        Ok(self.repository.update_term_agreed_at(id).await?)
    }
}

/// Create a user service over the given store
pub fn create_user_service(store: Arc<dyn UserStore>) -> Arc<dyn UserServiceTrait> {
    Arc::new(UserService::new(UserRepository::new(store)))
}

/// Create a user service over a fresh in-memory store
pub fn create_in_memory_user_service() -> Arc<dyn UserServiceTrait> {
    Arc::new(UserService::new(UserRepository::in_memory()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use glucose_guide_data::models::CreateUserRequest;
    use mockall::mock;

    mock! {
        pub UserRepo {}

        #[async_trait]
        impl UserRepositoryTrait for UserRepo {
            async fn find_all(&self) -> Result<Vec<User>, RepositoryError>;
            async fn find_one(&self, id: &str) -> Result<User, RepositoryError>;
            async fn is_exist(&self, id: &str) -> bool;
            async fn create_one(&self, request: CreateUserRequest) -> Result<User, RepositoryError>;
            async fn update_term_agreed_at(&self, id: &str) -> Result<User, RepositoryError>;
        }
    }

    fn stored(id: &str) -> User {
        User {
            id: id.to_string(),
            term_agreed_at: None,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_blank_id_never_reaches_repository() {
        let mut repo = MockUserRepo::new();
        repo.expect_create_one().times(0);

        let service = UserService::new(repo);
        assert!(matches!(
            service.create_one(CreateUser { id: "  ".to_string() }).await,
            Err(UserServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_forwards_trimmed_id() {
        let mut repo = MockUserRepo::new();
        repo.expect_create_one()
            .withf(|request| request.id == "000001")
            .times(1)
            .returning(|request| Ok(stored(&request.id)));

        let service = UserService::new(repo);
        let created = service
            .create_one(CreateUser { id: " 000001 ".to_string() })
            .await
            .unwrap();
        assert_eq!(created.id, "000001");
    }

    #[tokio::test]
    async fn test_repository_errors_are_mapped() {
        let mut repo = MockUserRepo::new();
        repo.expect_create_one()
            .returning(|request| Err(RepositoryError::AlreadyExists(request.id)));
        repo.expect_find_one()
            .returning(|id| Err(RepositoryError::NotFound(id.to_string())));
        repo.expect_find_all()
            .returning(|| Err(RepositoryError::Lock("store mutex poisoned".to_string())));

        let service = UserService::new(repo);
        assert_eq!(
            service.create_one(CreateUser { id: "000001".to_string() }).await,
            Err(UserServiceError::AlreadyExists("000001".to_string()))
        );
        assert_eq!(
            service.find_one("missing").await,
            Err(UserServiceError::NotFound("missing".to_string()))
        );
        assert!(matches!(service.find_all().await, Err(UserServiceError::Storage(_))));
    }

    #[tokio::test]
    async fn test_in_memory_agreement_flow() {
        let service = create_in_memory_user_service();
        let created = service
            .create_one(CreateUser { id: "000001".to_string() })
            .await
            .unwrap();
        assert!(!created.term_agreed());

        let agreed = service.agree_to_terms("000001").await.unwrap();
        assert!(agreed.term_agreed());
        assert_eq!(service.find_all().await.unwrap(), vec![agreed]);

        assert!(matches!(
            service.agree_to_terms("missing").await,
            Err(UserServiceError::NotFound(_))
        ));
    }
}
