//! JWT token generation and validation

use crate::core::error::{CareError, Result};
use crate::db::models::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Record id of the subject, as a decimal string
    pub sub: String,
    /// Role tag; absent or unknown tags are rejected by [`Claims::subject`]
    #[serde(default)]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Numeric subject id and role, or an authentication error
    pub fn subject(&self) -> Result<(i64, Role)> {
        let id = self
            .sub
            .parse::<i64>()
            .map_err(|_| CareError::AuthenticationError("Invalid token subject".to_string()))?;
        let role = self
            .role
            .as_deref()
            .ok_or_else(|| CareError::AuthenticationError("Token carries no role".to_string()))?
            .parse::<Role>()?;
        Ok((id, role))
    }
}

/// A freshly signed token and its lifetime in seconds
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

/// Signs and verifies HS256 access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Mint a token for `subject_id` acting as `role`
    pub fn issue(&self, subject_id: i64, role: Role) -> Result<IssuedToken> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| CareError::TaskError("Failed to calculate expiration".to_string()))?;

        let claims = Claims {
            sub: subject_id.to_string(),
            role: Some(role.as_str().to_string()),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CareError::TaskError(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Check signature and expiry and return the claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            CareError::AuthenticationError("Could not validate credentials".to_string())
        })?;

        Ok(token_data.claims)
    }
}
