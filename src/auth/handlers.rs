//! Authentication API handlers

use crate::api::handlers::AppState;
use crate::auth::middleware::AuthUser;
use crate::auth::models::{
    CurrentUserResponse, LoginRequest, LoginResponse, RegisterPatientRequest,
    RegisterPatientResponse,
};
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::core::error::{CareError, Result};
use crate::core::utils::{normalize_email, require_non_blank};
use crate::db::repository::PatientDraft;
use crate::api::extract::Json;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// Minimum accepted length of a self-chosen patient password
pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Handler for POST /auth/token - Login for any role
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let email = req.email.trim().to_lowercase();
    tracing::info!(email = %email, "Login attempt");

    let candidate = state.credentials.find_login_candidate(&email).await?;

    // Unknown emails still pay for one bcrypt verification
    let digest = match &candidate {
        Some(identity) => identity.password_hash().to_string(),
        None => state.dummy_hash.to_string(),
    };
    let password_ok = verify_password_blocking(req.password, digest).await;

    let identity = match candidate {
        Some(identity) if password_ok => identity,
        _ => {
            tracing::warn!(email = %email, "Login rejected");
            return Err(CareError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
        }
    };

    let issued = state.tokens.issue(identity.id(), identity.role())?;

    tracing::info!(
        user_id = identity.id(),
        role = %identity.role(),
        "Login successful"
    );

    Ok(Json(LoginResponse {
        access_token: issued.access_token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
        user_id: identity.id(),
        user_role: identity.role(),
        name: identity.display_name(),
    }))
}

/// Handler for POST /auth/patient - Patient self-registration
pub async fn register_patient(
    State(state): State<AppState>,
    Json(req): Json<RegisterPatientRequest>,
) -> Result<impl IntoResponse> {
    let email = normalize_email(&req.email)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CareError::ValidationError(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    require_non_blank("first_name", &req.first_name)?;
    require_non_blank("last_name", &req.last_name)?;

    tracing::info!(email = %email, "Patient registration attempt");

    let password_hash =
        hash_password_blocking(req.password, state.config.security.bcrypt_cost).await?;

    let phone_number = req
        .phone_number
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let patient_id = state
        .patients
        .register(PatientDraft {
            email: email.clone(),
            password_hash,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            phone_number,
        })
        .await?;

    tracing::info!(patient_id, email = %email, "Patient registered successfully");

    Ok((
        StatusCode::CREATED,
        Json(RegisterPatientResponse {
            message: "Patient registered successfully".to_string(),
            patient_id,
        }),
    ))
}

/// Handler for GET /auth/me - The authenticated caller
pub async fn get_me(user: AuthUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse::from(&user.identity))
}
