use super::{DoctorResponse, PatientResponse};
use crate::db::models::{Feedback, FeedbackCategory, FeedbackDetails};
use serde::{Deserialize, Serialize};

/// Request body for POST /feedback
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub category_id: i64,
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackCategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<FeedbackCategory> for FeedbackCategoryResponse {
    fn from(category: FeedbackCategory) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// Feedback entry with its category and both parties embedded
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub category_id: i64,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
    pub category: Option<FeedbackCategoryResponse>,
    pub doctor: Option<DoctorResponse>,
    pub patient: Option<PatientResponse>,
}

impl FeedbackResponse {
    fn base(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            patient_id: feedback.patient_id,
            doctor_id: feedback.doctor_id,
            category_id: feedback.category_id,
            rating: feedback.rating,
            comment: feedback.comment,
            created_at: feedback.created_at,
            category: None,
            doctor: None,
            patient: None,
        }
    }
}

impl From<FeedbackDetails> for FeedbackResponse {
    fn from(details: FeedbackDetails) -> Self {
        Self {
            category: details.category.map(Into::into),
            doctor: details.doctor.map(Into::into),
            patient: details.patient.map(Into::into),
            ..Self::base(details.feedback)
        }
    }
}
