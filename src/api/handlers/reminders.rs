use crate::api::models::{DetailResponse, ReminderQuery, ReminderRequest, ReminderResponse};
use crate::auth::middleware::AuthUser;
use crate::core::error::{CareError, Result};
use crate::core::notifier::{dispatch_in_background, reminder_message};
use crate::core::utils::{parse_time, require_non_blank};
use crate::api::extract::{Json, Path, Query};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use super::AppState;

/// Handler for POST /reminders - Store a reminder and text the patient
pub async fn create_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ReminderRequest>,
) -> Result<impl IntoResponse> {
    require_non_blank("medication", &req.medication)?;
    require_non_blank("frequency", &req.frequency)?;
    parse_time("time", &req.time)?;

    let patient = state
        .patients
        .find_by_id(req.patient_id)
        .await?
        .ok_or_else(|| CareError::NotFound("Patient not found".to_string()))?;

    let reminder = state
        .reminders
        .create(
            patient.id,
            req.medication.trim().to_string(),
            req.time.trim().to_string(),
            req.frequency.trim().to_string(),
        )
        .await?;

    tracing::info!(
        reminder_id = reminder.id,
        patient_id = patient.id,
        created_by = user.id(),
        "Medication reminder created"
    );

    match patient.phone_number.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(phone) => {
            let body = reminder_message(
                &reminder.medication,
                &reminder.time,
                &reminder.frequency,
                &state.config.sms.hospital_name,
            );
            dispatch_in_background(state.notifier.clone(), phone.to_string(), body);
        }
        None => tracing::debug!(patient_id = patient.id, "No phone number, reminder SMS not sent"),
    }

    Ok((StatusCode::CREATED, Json(ReminderResponse::from(reminder))))
}

/// Handler for GET /reminders?patient_id= - Active reminders of a patient
pub async fn list_reminders(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ReminderQuery>,
) -> Result<impl IntoResponse> {
    let patient_id = query
        .patient_id
        .ok_or_else(|| CareError::InvalidRequest("patient_id is required".to_string()))?;

    if state.patients.find_by_id(patient_id).await?.is_none() {
        return Err(CareError::NotFound("Patient not found".to_string()));
    }

    let reminders: Vec<ReminderResponse> = state
        .reminders
        .active_for_patient(patient_id)
        .await?
        .into_iter()
        .map(ReminderResponse::from)
        .collect();

    Ok(Json(reminders))
}

/// Handler for DELETE /reminders/:id - Deactivate a reminder
pub async fn delete_reminder(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    if !state.reminders.deactivate(id).await? {
        return Err(CareError::NotFound("Reminder not found".to_string()));
    }

    tracing::info!(reminder_id = id, deleted_by = user.id(), "Medication reminder deactivated");

    Ok(Json(DetailResponse {
        detail: "Reminder successfully deleted".to_string(),
    }))
}
