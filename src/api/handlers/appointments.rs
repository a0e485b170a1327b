use crate::api::models::{AppointmentRequest, AppointmentResponse};
use crate::auth::middleware::AuthUser;
use crate::core::error::{CareError, Result};
use crate::core::utils::{parse_date, parse_time};
use crate::db::models::{Appointment, AppointmentFilter, AppointmentStatus};
use crate::db::repository::Repository;
use crate::api::extract::{Json, Path, Query};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use super::AppState;

/// Check formats, status and (on create) that the date is not in the past
fn validate_appointment(req: &AppointmentRequest, reject_past: bool) -> Result<AppointmentStatus> {
    let date = parse_date("date", &req.date)?;
    parse_time("time", &req.time)?;

    if reject_past && date < chrono::Local::now().date_naive() {
        return Err(CareError::ValidationError(
            "Cannot schedule appointments for past dates".to_string(),
        ));
    }

    match req.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(status) => status.parse(),
        None => Ok(AppointmentStatus::Scheduled),
    }
}

/// Both parties must exist before an appointment can reference them
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

fn into_record(id: i64, req: AppointmentRequest, status: AppointmentStatus) -> Appointment {
    Appointment {
        id,
        patient_id: req.patient_id,
        doctor_id: req.doctor_id,
        date: req.date,
        time: req.time,
        category: req.category.filter(|c| !c.trim().is_empty()),
        description: req.description,
        status: status.as_str().to_string(),
        created_at: String::new(),
    }
}

async fn load_response(state: &AppState, id: i64) -> Result<AppointmentResponse> {
    state
        .appointments
        .find_details(id)
        .await?
        .map(AppointmentResponse::from)
        .ok_or_else(|| CareError::NotFound("Appointment not found".to_string()))
}

async fn filtered(state: &AppState, filter: AppointmentFilter) -> Result<Vec<AppointmentResponse>> {
    Ok(state
        .appointments
        .list(filter)
        .await?
        .into_iter()
        .map(AppointmentResponse::from)
        .collect())
}

/// Handler for POST /appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<AppointmentRequest>,
) -> Result<impl IntoResponse> {
    ensure_parties_exist(&state, req.patient_id, req.doctor_id).await?;
    let status = validate_appointment(&req, true)?;

    let id = state.appointments.create(&into_record(0, req, status)).await?;
    tracing::info!(appointment_id = id, created_by = user.id(), "Appointment created");

    Ok((StatusCode::CREATED, Json(load_response(&state, id).await?)))
}

/// Handler for GET /appointments - Filtered listing
pub async fn list_appointments(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<AppointmentFilter>,
) -> Result<impl IntoResponse> {
    Ok(Json(filtered(&state, filter).await?))
}

/// Handler for GET /appointments/public - Filtered listing without authentication
pub async fn list_public_appointments(
    State(state): State<AppState>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<impl IntoResponse> {
    Ok(Json(filtered(&state, filter).await?))
}

/// Handler for GET /appointments/:id
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: AuthUser,
) -> Result<impl IntoResponse> {
    Ok(Json(load_response(&state, id).await?))
}

/// Handler for PUT /appointments/:id - Full replace
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: AuthUser,
    Json(req): Json<AppointmentRequest>,
) -> Result<impl IntoResponse> {
    if state.appointments.find_by_id(id).await?.is_none() {
        return Err(CareError::NotFound("Appointment not found".to_string()));
    }
    ensure_parties_exist(&state, req.patient_id, req.doctor_id).await?;
    let status = validate_appointment(&req, false)?;

    if !state.appointments.update(&into_record(id, req, status)).await? {
        return Err(CareError::NotFound("Appointment not found".to_string()));
    }
    tracing::info!(appointment_id = id, updated_by = user.id(), "Appointment updated");

    Ok(Json(load_response(&state, id).await?))
}

/// Handler for DELETE /appointments/:id
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    if !state.appointments.delete(id).await? {
        return Err(CareError::NotFound("Appointment not found".to_string()));
    }
    tracing::info!(appointment_id = id, deleted_by = user.id(), "Appointment deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(date: &str, time: &str, status: Option<&str>) -> AppointmentRequest {
        AppointmentRequest {
            patient_id: 1,
            doctor_id: 1,
            date: date.to_string(),
            time: time.to_string(),
            category: None,
            description: None,
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_appointment() {
        assert_eq!(
            validate_appointment(&request("2999-01-01", "09:30", None), true).unwrap(),
            AppointmentStatus::Scheduled
        );
        assert_eq!(
            validate_appointment(&request("2999-01-01", "09:30", Some("completed")), true).unwrap(),
            AppointmentStatus::Completed
        );
        assert!(validate_appointment(&request("2000-01-01", "09:30", None), true).is_err());
        // Past dates are allowed when editing an existing appointment
        assert!(validate_appointment(&request("2000-01-01", "09:30", None), false).is_ok());
        assert!(validate_appointment(&request("01-01-2999", "09:30", None), true).is_err());
        assert!(validate_appointment(&request("2999-01-01", "9h30", None), true).is_err());
        assert!(validate_appointment(&request("2999-01-01", "09:30", Some("postponed")), true).is_err());
    }
}
