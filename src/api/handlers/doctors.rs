use crate::api::models::{DoctorListQuery, DoctorProfileQuery, DoctorRequest, DoctorResponse};
use crate::auth::handlers::MIN_PASSWORD_LEN;
use crate::auth::middleware::AuthUser;
use crate::auth::password::hash_password_blocking;
use crate::core::error::{CareError, Result};
use crate::core::utils::{normalize_email, require_non_blank};
use crate::db::repository::DoctorDraft;
use crate::api::extract::{Json, Path, Query};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use super::AppState;

/// Validate a doctor body and hash its password when one is given
async fn doctor_draft(state: &AppState, req: DoctorRequest, password_required: bool) -> Result<DoctorDraft> {
    require_non_blank("name", &req.name)?;
    require_non_blank("specialty", &req.specialty)?;
    let email = normalize_email(&req.email)?;

    let password = req.password.filter(|p| !p.is_empty());
    let password_hash = match password {
        Some(password) => {
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(CareError::ValidationError(format!(
                    "password must be at least {} characters",
                    MIN_PASSWORD_LEN
                )));
            }
            Some(hash_password_blocking(password, state.config.security.bcrypt_cost).await?)
        }
        None if password_required => {
            return Err(CareError::ValidationError("password cannot be empty".to_string()));
        }
        None => None,
    };

    Ok(DoctorDraft {
        name: req.name.trim().to_string(),
        specialty: req.specialty.trim().to_string(),
        email,
        password_hash,
    })
}

/// Handler for GET /doctor - List doctors, optionally by specialty
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorListQuery>,
) -> Result<impl IntoResponse> {
    let specialty = query
        .specialty
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let doctors: Vec<DoctorResponse> = state
        .doctors
        .list(specialty)
        .await?
        .into_iter()
        .map(DoctorResponse::from)
        .collect();

    Ok(Json(doctors))
}

/// Handler for GET /doctor/profile?email= - Look a doctor up by email
pub async fn get_doctor_profile(
    State(state): State<AppState>,
    Query(query): Query<DoctorProfileQuery>,
) -> Result<impl IntoResponse> {
    let email = query.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(CareError::InvalidRequest("Email parameter is required".to_string()));
    }

    let doctor = state
        .doctors
        .find_by_email(&email)
        .await?
        .ok_or_else(|| CareError::NotFound("Doctor not found".to_string()))?;

    Ok(Json(DoctorResponse::from(doctor)))
}

/// Handler for GET /doctor/:id
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let doctor = state
        .doctors
        .find_by_id(id)
        .await?
        .ok_or_else(|| CareError::NotFound("Doctor not found".to_string()))?;

    Ok(Json(DoctorResponse::from(doctor)))
}

/// Handler for POST /doctor - Create a doctor (admin only)
pub async fn create_doctor(
    State(state): State<AppState>,
    admin: AuthUser,
    Json(req): Json<DoctorRequest>,
) -> Result<impl IntoResponse> {
    admin.require_admin()?;

    let draft = doctor_draft(&state, req, true).await?;
    let email = draft.email.clone();
    let id = state.doctors.create(draft).await?;

    tracing::info!(doctor_id = id, email = %email, admin_id = admin.id(), "Doctor created");

    let doctor = state
        .doctors
        .find_by_id(id)
        .await?
        .ok_or_else(|| CareError::NotFound("Doctor not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(DoctorResponse::from(doctor))))
}

/// Handler for PUT /doctor/:id - Replace a doctor's profile (admin only)
pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    admin: AuthUser,
    Json(req): Json<DoctorRequest>,
) -> Result<impl IntoResponse> {
    admin.require_admin()?;

    let draft = doctor_draft(&state, req, false).await?;
    if !state.doctors.update(id, draft).await? {
        return Err(CareError::NotFound("Doctor not found".to_string()));
    }

    tracing::info!(doctor_id = id, admin_id = admin.id(), "Doctor updated");

    let doctor = state
        .doctors
        .find_by_id(id)
        .await?
        .ok_or_else(|| CareError::NotFound("Doctor not found".to_string()))?;

    Ok(Json(DoctorResponse::from(doctor)))
}

/// Handler for PATCH /doctor/:id/status - Toggle activation (admin only)
pub async fn toggle_doctor_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    admin: AuthUser,
) -> Result<impl IntoResponse> {
    admin.require_admin()?;

    let doctor = state
        .doctors
        .toggle_status(id)
        .await?
        .ok_or_else(|| CareError::NotFound("Doctor not found".to_string()))?;

    tracing::info!(
        doctor_id = id,
        is_active = doctor.doctor.is_active,
        "Doctor status changed"
    );

    Ok(Json(DoctorResponse::from(doctor)))
}
