//! Token-to-identity resolution

use crate::auth::jwt::TokenService;
use crate::core::error::{CareError, Result};
use crate::db::repository::CredentialRepository;
use std::sync::Arc;

pub use crate::db::models::{Identity, Role};

/// Turns a bearer token into the stored identity it names
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: TokenService,
    credentials: Arc<CredentialRepository>,
}

impl IdentityResolver {
    pub fn new(tokens: TokenService, credentials: Arc<CredentialRepository>) -> Self {
        Self {
            tokens,
            credentials,
        }
    }

    /// Validate `token` and load the record for its `(subject, role)` pair.
    ///
    /// The credential store is only queried once the signature, expiry and
    /// claims have all been accepted.
    pub async fn resolve(&self, token: &str) -> Result<Identity> {
        let claims = self.tokens.validate(token)?;
        let (id, role) = claims.subject()?;

        self.credentials
            .find_by_id(role, id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(subject = id, role = %role, "Token subject no longer exists");
                CareError::AuthenticationError("Could not validate credentials".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseManager;
    use chrono::Duration;

    const SECRET: &str = "resolver-test-secret-0123456789";

    async fn resolver_with_admin() -> (IdentityResolver, i64) {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let credentials = Arc::new(CredentialRepository::new(db));
        let id = credentials
            .create_admin("root@dgh.cm", "hash", Some("Root".to_string()))
            .await
            .unwrap();
        let resolver = IdentityResolver::new(
            TokenService::new(SECRET, Duration::minutes(15)),
            credentials,
        );
        (resolver, id)
    }

    #[tokio::test]
    async fn test_resolves_matching_record() {
        let (resolver, id) = resolver_with_admin().await;
        let token = resolver.tokens.issue(id, Role::Admin).unwrap();

        let identity = resolver.resolve(&token.access_token).await.unwrap();
        assert_eq!(identity.id(), id);
        assert_eq!(identity.role(), Role::Admin);
        assert_eq!(identity.display_name(), "Root");
    }

    #[tokio::test]
    async fn test_role_mismatch_rejected() {
        let (resolver, id) = resolver_with_admin().await;
        // Same numeric id, but no patient with that id exists
        let token = resolver.tokens.issue(id, Role::Patient).unwrap();

        let result = resolver.resolve(&token.access_token).await;
        assert!(matches!(result, Err(CareError::AuthenticationError(_))));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let (resolver, id) = resolver_with_admin().await;
        let stale = TokenService::new(SECRET, Duration::seconds(-1))
            .issue(id, Role::Admin)
            .unwrap();

        let result = resolver.resolve(&stale.access_token).await;
        assert!(matches!(result, Err(CareError::AuthenticationError(_))));
    }
}
