use crate::db::models::Patient;
use serde::{Deserialize, Serialize};

/// Query for GET /patients/search
#[derive(Debug, Default, Deserialize)]
pub struct PatientSearchQuery {
    pub name: Option<String>,
}

/// Patient as returned by the API (without password)
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub created_at: String,
    pub is_active: bool,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            email: patient.email,
            phone_number: patient.phone_number,
            created_at: patient.created_at,
            is_active: patient.is_active,
        }
    }
}
