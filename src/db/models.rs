//! Database models
//!
//! Data structures representing database tables

use crate::core::error::CareError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrator record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
}

/// Doctor record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub specialty: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Patient record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Role of an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(alias = "clinician")]
    Doctor,
    Patient,
}

impl Role {
    /// Order in which the credential tables are searched at login
    pub const LOGIN_ORDER: [Role; 3] = [Role::Admin, Role::Doctor, Role::Patient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }

    /// Table holding the credentials for this role
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Role::Admin => "admins",
            Role::Doctor => "doctors",
            Role::Patient => "patients",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "doctor" | "clinician" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            other => Err(CareError::AuthenticationError(format!(
                "Unrecognised role '{}'",
                other
            ))),
        }
    }
}

/// A stored identity of any role
#[derive(Debug, Clone)]
pub enum Identity {
    Admin(Admin),
    Doctor(Doctor),
    Patient(Patient),
}

impl Identity {
    pub fn id(&self) -> i64 {
        match self {
            Identity::Admin(a) => a.id,
            Identity::Doctor(d) => d.id,
            Identity::Patient(p) => p.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Identity::Admin(_) => Role::Admin,
            Identity::Doctor(_) => Role::Doctor,
            Identity::Patient(_) => Role::Patient,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::Admin(a) => &a.email,
            Identity::Doctor(d) => &d.email,
            Identity::Patient(p) => &p.email,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Identity::Admin(a) => &a.password_hash,
            Identity::Doctor(d) => &d.password_hash,
            Identity::Patient(p) => &p.password_hash,
        }
    }

    /// Name shown to the client after login
    pub fn display_name(&self) -> String {
        match self {
            Identity::Admin(a) => a.name.clone().unwrap_or_else(|| a.email.clone()),
            Identity::Doctor(d) => d.name.clone(),
            Identity::Patient(p) => p.full_name(),
        }
    }
}

/// Doctor with the aggregates shown in listings
#[derive(Debug, Clone)]
pub struct DoctorSummary {
    pub doctor: Doctor,
    pub patient_count: i64,
    pub average_rating: f64,
}

/// Feedback category record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackCategory {
    pub id: i64,
    pub name: String,
}

/// Feedback record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub category_id: i64,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

/// Feedback with its category and both parties resolved
#[derive(Debug, Clone)]
pub struct FeedbackDetails {
    pub feedback: Feedback,
    pub category: Option<FeedbackCategory>,
    pub doctor: Option<DoctorSummary>,
    pub patient: Option<Patient>,
}

/// Medication reminder record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationReminder {
    pub id: i64,
    pub patient_id: i64,
    pub medication: String,
    pub time: String,
    pub frequency: String,
    pub is_active: bool,
    pub created_at: String,
}

/// Appointment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: String,
    pub time: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub status: String, // 'scheduled', 'completed', 'cancelled'
    pub created_at: String,
}

/// Lifecycle state of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(CareError::ValidationError(format!(
                "Invalid appointment status '{}', expected scheduled, completed or cancelled",
                other
            ))),
        }
    }
}

/// Appointment joined with the display names of both parties
#[derive(Debug, Clone)]
pub struct AppointmentDetails {
    pub appointment: Appointment,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
}

/// Prescribed medication record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
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
}

/// Medication joined with the display names of both parties
#[derive(Debug, Clone)]
pub struct MedicationDetails {
    pub medication: Medication,
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
}

/// Optional filters for appointment listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub date: Option<String>,
    pub status: Option<String>,
}

/// Optional filters for medication listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicationFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

/// Optional filters for feedback listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackFilter {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

/// Per-specialty aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentStat {
    pub name: String,
    pub avg_rating: f64,
    pub patients: i64,
    pub doctors: i64,
}

/// Hospital-wide counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HospitalTotals {
    pub patients: i64,
    pub appointments: i64,
    pub doctors: i64,
    pub average_rating: f64,
}

/// Doctor ranked by mean feedback rating
#[derive(Debug, Clone, PartialEq)]
pub struct RatedDoctor {
    pub name: String,
    pub specialty: String,
    pub rating: f64,
}

/// Appointment counts for one calendar month
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyAdmissions {
    pub month: u32,
    pub emergency: i64,
    pub scheduled: i64,
}
