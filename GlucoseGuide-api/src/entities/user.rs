use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use glucose_guide_domain::entities::{CreateUser, User};

/// Public representation of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    /// Whether the user has agreed to the terms of service
    pub term_agreed: bool,
    pub term_agreed_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            term_agreed: user.term_agreed(),
            id: user.id,
            term_agreed_at: user.term_agreed_at,
            is_deleted: user.is_deleted,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request body for registering a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub id: String,
}

impl From<CreateUserBody> for CreateUser {
    fn from(body: CreateUserBody) -> Self {
        Self { id: body.id }
    }
}
