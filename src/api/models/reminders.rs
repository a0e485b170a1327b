use crate::db::models::MedicationReminder;
use serde::{Deserialize, Serialize};

/// Request body for POST /reminders
#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub patient_id: i64,
    pub medication: String,
    /// `HH:MM`
    pub time: String,
    pub frequency: String,
}

/// Query for GET /reminders
#[derive(Debug, Default, Deserialize)]
pub struct ReminderQuery {
    pub patient_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderResponse {
    pub id: i64,
    pub patient_id: i64,
    pub medication: String,
    pub time: String,
    pub frequency: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<MedicationReminder> for ReminderResponse {
    fn from(reminder: MedicationReminder) -> Self {
        Self {
            id: reminder.id,
            patient_id: reminder.patient_id,
            medication: reminder.medication,
            time: reminder.time,
            frequency: reminder.frequency,
            is_active: reminder.is_active,
            created_at: reminder.created_at,
        }
    }
}

/// Body returned by DELETE /reminders/{id}
#[derive(Debug, Serialize, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}
