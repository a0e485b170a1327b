use crate::api::models::{FeedbackCategoryResponse, FeedbackRequest, FeedbackResponse};
use crate::auth::middleware::AuthUser;
use crate::core::error::{CareError, Result};
use crate::db::models::{FeedbackDetails, FeedbackFilter};
use crate::api::extract::{Json, Query};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use super::AppState;

const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Handler for GET /feedback/feedback_categories
pub async fn list_feedback_categories(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories: Vec<FeedbackCategoryResponse> = state
        .feedback
        .categories()
        .await?
        .into_iter()
        .map(FeedbackCategoryResponse::from)
        .collect();

    if categories.is_empty() {
        return Err(CareError::NotFound("No feedback categories found".to_string()));
    }

    Ok(Json(categories))
}

/// Handler for GET /feedback - Filter by doctor and/or patient
pub async fn list_feedback(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(filter): Query<FeedbackFilter>,
) -> Result<impl IntoResponse> {
    let feedback: Vec<FeedbackResponse> = state
        .feedback
        .list(filter)
        .await?
        .into_iter()
        .map(FeedbackResponse::from)
        .collect();

    Ok(Json(feedback))
}

/// Handler for POST /feedback
pub async fn create_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl IntoResponse> {
    if !RATING_RANGE.contains(&req.rating) {
        return Err(CareError::ValidationError(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let doctor = state
        .doctors
        .find_by_id(req.doctor_id)
        .await?
        .ok_or_else(|| CareError::NotFound("Doctor not found".to_string()))?;
    let patient = state
        .patients
        .find_by_id(req.patient_id)
        .await?
        .ok_or_else(|| CareError::NotFound("Patient not found".to_string()))?;
    let category = state
        .feedback
        .find_category(req.category_id)
        .await?
        .ok_or_else(|| CareError::NotFound("Feedback category not found".to_string()))?;

    let feedback = state
        .feedback
        .create(
            req.patient_id,
            req.doctor_id,
            req.category_id,
            req.rating,
            req.comment.trim().to_string(),
        )
        .await?;

    tracing::info!(
        feedback_id = feedback.id,
        doctor_id = feedback.doctor_id,
        rating = feedback.rating,
        submitted_by = user.id(),
        "Feedback submitted"
    );

    // Re-read the doctor so the embedded average includes this rating
    let doctor = state.doctors.find_by_id(req.doctor_id).await?.or(Some(doctor));

    let details = FeedbackDetails {
        feedback,
        category: Some(category),
        doctor,
        patient: Some(patient),
    };

    Ok((StatusCode::CREATED, Json(FeedbackResponse::from(details))))
}
