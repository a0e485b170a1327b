use crate::db::models::AppointmentDetails;
use serde::{Deserialize, Serialize};

/// Request body for creating or replacing an appointment
#[derive(Debug, Deserialize)]
pub struct AppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: String,
    pub time: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
}

impl From<AppointmentDetails> for AppointmentResponse {
    fn from(details: AppointmentDetails) -> Self {
        let a = details.appointment;
        Self {
            id: a.id,
            patient_id: a.patient_id,
            doctor_id: a.doctor_id,
            date: a.date,
            time: a.time,
            category: a.category,
            description: a.description,
            status: a.status,
            created_at: a.created_at,
            doctor_name: details.doctor_name,
            patient_name: details.patient_name,
        }
    }
}
