//! Authentication request/response models

use crate::db::models::{Identity, Role};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user_id: i64,
    pub user_role: Role,
    pub name: String,
}

/// Patient self-registration request
#[derive(Debug, Deserialize)]
pub struct RegisterPatientRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Patient self-registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterPatientResponse {
    pub message: String,
    pub patient_id: i64,
}

/// The authenticated caller (without password)
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub id: i64,
    pub role: Role,
    pub email: String,
    pub name: String,
}

impl From<&Identity> for CurrentUserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id(),
            role: identity.role(),
            email: identity.email().to_string(),
            name: identity.display_name(),
        }
    }
}
