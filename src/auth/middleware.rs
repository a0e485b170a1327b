//! Authentication middleware

use crate::api::handlers::AppState;
use crate::core::error::{CareError, Result};
use crate::db::models::{Identity, Role};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Identity of the caller, stored in request extensions by [`authenticate`]
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity: Identity,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.identity.id()
    }

    pub fn role(&self) -> Role {
        self.identity.role()
    }

    /// Fail with 403 unless the caller holds one of `roles`
    pub fn require_any(&self, roles: &[Role]) -> Result<()> {
        if roles.contains(&self.role()) {
            return Ok(());
        }
        let allowed: Vec<&str> = roles.iter().map(Role::as_str).collect();
        Err(CareError::PermissionDenied(format!(
            "{} access required",
            allowed.join(" or ")
        )))
    }

    pub fn require_admin(&self) -> Result<()> {
        self.require_any(&[Role::Admin])
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| {
            let (scheme, token) = h.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|t| !t.is_empty())
}

/// Authentication middleware
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(t) => t.to_string(),
        None => {
            return CareError::AuthenticationError("Not authenticated".to_string()).into_response();
        }
    };

    let identity = match state.resolver.resolve(&token).await {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(user_id = identity.id(), role = %identity.role(), "Request authenticated");

    request.extensions_mut().insert(AuthUser { identity });

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = CareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| CareError::AuthenticationError("Not authenticated".to_string()))
    }
}
