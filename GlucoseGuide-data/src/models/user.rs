use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for an app user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Client-supplied identifier; measurements refer to it as `user_id`
    pub id: String,

    /// When the user agreed to the terms of service, if ever
    pub term_agreed_at: Option<DateTime<Utc>>,

    /// Soft-delete flag
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user has agreed to the terms of service
    pub fn term_agreed(&self) -> bool {
        self.term_agreed_at.is_some()
    }
}

/// Input data for registering a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub id: String,
}
