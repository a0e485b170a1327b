use crate::api::models::{PatientResponse, PatientSearchQuery};
use crate::auth::middleware::AuthUser;
use crate::core::error::{CareError, Result};
use crate::db::models::Role;
use crate::api::extract::{Json, Path, Query};
use axum::{
    extract::State,
    response::IntoResponse,
};
use super::AppState;

const STAFF: [Role; 2] = [Role::Admin, Role::Doctor];

/// Handler for GET /patients - List all patients (admin or doctor)
pub async fn list_patients(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    user.require_any(&STAFF)?;

    let patients: Vec<PatientResponse> = state
        .patients
        .list()
        .await?
        .into_iter()
        .map(PatientResponse::from)
        .collect();

    Ok(Json(patients))
}

/// Handler for GET /patients/search?name= - Search by first or last name (admin or doctor)
pub async fn search_patients(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PatientSearchQuery>,
) -> Result<impl IntoResponse> {
    user.require_any(&STAFF)?;

    let name = query.name.filter(|n| !n.trim().is_empty());
    let patients: Vec<PatientResponse> = state
        .patients
        .search(name)
        .await?
        .into_iter()
        .map(PatientResponse::from)
        .collect();

    Ok(Json(patients))
}

/// Handler for PATCH /patients/:id/status - Toggle activation (admin only)
pub async fn toggle_patient_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    admin: AuthUser,
) -> Result<impl IntoResponse> {
    admin.require_admin()?;

    let patient = state
        .patients
        .toggle_status(id)
        .await?
        .ok_or_else(|| CareError::NotFound("Patient not found".to_string()))?;

    tracing::info!(
        patient_id = id,
        is_active = patient.is_active,
        "Patient status changed"
    );

    Ok(Json(PatientResponse::from(patient)))
}
