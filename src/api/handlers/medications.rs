use crate::api::models::{MedicationRequest, MedicationResponse};
use crate::auth::middleware::AuthUser;
use crate::core::error::{CareError, Result};
use crate::core::utils::{parse_date, require_non_blank};
use crate::db::models::{Medication, MedicationFilter};
use crate::db::repository::Repository;
use crate::api::extract::{Json, Path, Query};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use super::AppState;

/// Treat blank optional strings as absent
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Validate a medication body into a record ready to store
fn into_record(id: i64, req: MedicationRequest) -> Result<Medication> {
    require_non_blank("medication", &req.medication)?;
    require_non_blank("dosage", &req.dosage)?;
    require_non_blank("frequency", &req.frequency)?;

    let start_date = blank_to_none(req.start_date);
    let end_date = blank_to_none(req.end_date);
    let start = start_date.as_deref().map(|d| parse_date("start_date", d)).transpose()?;
    let end = end_date.as_deref().map(|d| parse_date("end_date", d)).transpose()?;
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(CareError::ValidationError(
                "end_date cannot be before start_date".to_string(),
            ));
        }
    }

    Ok(Medication {
        id,
        patient_id: req.patient_id,
        doctor_id: req.doctor_id,
        medication: req.medication.trim().to_string(),
        dosage: req.dosage.trim().to_string(),
        frequency: req.frequency.trim().to_string(),
        instructions: blank_to_none(req.instructions),
        start_date,
        end_date,
        created_at: String::new(),
    })
}

async fn ensure_parties_exist(state: &AppState, patient_id: i64, doctor_id: i64) -> Result<()> {
    if state.patients.find_by_id(patient_id).await?.is_none() {
        return Err(CareError::NotFound(format!(
            "Patient with ID {} not found",
            patient_id
        )));
    }
    if state.doctors.find_by_id(doctor_id).await?.is_none() {
        return Err(CareError::NotFound(format!(
            "Doctor with ID {} not found",
            doctor_id
        )));
    }
    Ok(())
}

async fn load_response(state: &AppState, id: i64) -> Result<MedicationResponse> {
    state
        .medications
        .find_details(id)
        .await?
        .map(MedicationResponse::from)
        .ok_or_else(|| CareError::NotFound("Medication not found".to_string()))
}

/// Handler for POST /medications
pub async fn create_medication(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<MedicationRequest>,
) -> Result<impl IntoResponse> {
    ensure_parties_exist(&state, req.patient_id, req.doctor_id).await?;
    let record = into_record(0, req)?;

    let id = state.medications.create(&record).await?;
    tracing::info!(medication_id = id, prescribed_by = user.id(), "Medication created");

    Ok((StatusCode::CREATED, Json(load_response(&state, id).await?)))
}

/// Handler for GET /medications - Filtered listing
pub async fn list_medications(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<MedicationFilter>,
) -> Result<impl IntoResponse> {
    let medications: Vec<MedicationResponse> = state
        .medications
        .list(filter)
        .await?
        .into_iter()
        .map(MedicationResponse::from)
        .collect();

    Ok(Json(medications))
}

/// Handler for GET /medications/:id
pub async fn get_medication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: AuthUser,
) -> Result<impl IntoResponse> {
    Ok(Json(load_response(&state, id).await?))
}

/// Handler for PUT /medications/:id - Full replace
pub async fn update_medication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: AuthUser,
    Json(req): Json<MedicationRequest>,
) -> Result<impl IntoResponse> {
    if state.medications.find_by_id(id).await?.is_none() {
        return Err(CareError::NotFound("Medication not found".to_string()));
    }
    ensure_parties_exist(&state, req.patient_id, req.doctor_id).await?;
    let record = into_record(id, req)?;

    if !state.medications.update(&record).await? {
        return Err(CareError::NotFound("Medication not found".to_string()));
    }
    tracing::info!(medication_id = id, updated_by = user.id(), "Medication updated");

    Ok(Json(load_response(&state, id).await?))
}

/// Handler for DELETE /medications/:id
pub async fn delete_medication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    if !state.medications.delete(id).await? {
        return Err(CareError::NotFound("Medication not found".to_string()));
    }
    tracing::info!(medication_id = id, deleted_by = user.id(), "Medication deleted");
    Ok(StatusCode::NO_CONTENT)
}
