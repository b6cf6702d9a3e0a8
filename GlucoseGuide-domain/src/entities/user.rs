use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::measurement::not_blank;

/// Request payload for registering a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    /// Identifier chosen by the client
    #[validate(custom = "not_blank")]
    pub id: String,
}
