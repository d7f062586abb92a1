use serde::{Deserialize, Serialize};
use validator::Validate;

/// Self-registration body. The handler trims `name` before validating.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct RegisterPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,
}
