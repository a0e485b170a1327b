use crate::db::models::MedicationDetails;
use serde::{Deserialize, Serialize};

/// Request body for creating or replacing a prescribed medication
#[derive(Debug, Deserialize)]
pub struct MedicationRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MedicationResponse {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
}

impl From<MedicationDetails> for MedicationResponse {
    fn from(details: MedicationDetails) -> Self {
        let m = details.medication;
        Self {
            id: m.id,
            patient_id: m.patient_id,
            doctor_id: m.doctor_id,
            medication: m.medication,
            dosage: m.dosage,
            frequency: m.frequency,
            instructions: m.instructions,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
            doctor_name: details.doctor_name,
            patient_name: details.patient_name,
        }
    }
}
