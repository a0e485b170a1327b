use crate::db::models::DoctorSummary;
use serde::{Deserialize, Serialize};

/// Request body for creating or replacing a doctor
#[derive(Debug, Deserialize)]
pub struct DoctorRequest {
    pub name: String,
    pub specialty: String,
    pub email: String,
    /// Required on create; on update an empty or missing value keeps the current password
    #[serde(default)]
    pub password: Option<String>,
}

/// Query for GET /doctor
#[derive(Debug, Default, Deserialize)]
pub struct DoctorListQuery {
    pub specialty: Option<String>,
}

/// Query for GET /doctor/profile
#[derive(Debug, Default, Deserialize)]
pub struct DoctorProfileQuery {
    #[serde(default)]
    pub email: String,
}

/// Public view of a doctor
#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorResponse {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub is_active: bool,
    #[serde(rename = "patientCount")]
    pub patient_count: i64,
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
}

impl From<DoctorSummary> for DoctorResponse {
    fn from(summary: DoctorSummary) -> Self {
        Self {
            id: summary.doctor.id,
            name: summary.doctor.name,
            specialty: summary.doctor.specialty,
            email: summary.doctor.email,
            is_active: summary.doctor.is_active,
            patient_count: summary.patient_count,
            average_rating: summary.average_rating,
        }
    }
}
