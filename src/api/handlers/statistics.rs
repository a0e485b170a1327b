//! Dashboard aggregates
//!
//! Every figure is computed from stored rows. There is no historical
//! snapshot to compare against, so card trends are reported flat.

use crate::api::models::{
    AdmissionsResponse, DepartmentStatsResponse, DoctorStatsResponse, HospitalStatResponse,
    NamedCount, SpecialtyCount, StatIcon, TopPerformer,
};
use crate::core::error::Result;
use crate::core::utils::round_one_decimal;
use crate::db::models::{AppointmentStatus, HospitalTotals};
use axum::{extract::State, response::IntoResponse, Json};
use chrono::Datelike;
use super::AppState;

const TOP_PERFORMERS: i64 = 3;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const PATIENTS_ICON: &str = "M16 7a4 4 0 11-8 0 4 4 0 018 0zM12 14a7 7 0 00-7 7h14a7 7 0 00-7-7z";
const APPOINTMENTS_ICON: &str =
    "M8 7V3m8 4V3m-9 8h10M5 21h14a2 2 0 002-2V7a2 2 0 00-2-2H5a2 2 0 00-2 2v12a2 2 0 002 2z";
const DOCTORS_ICON: &str = "M17 20h5v-2a3 3 0 00-5.356-1.857M17 20H7m10 0v-2c0-.656-.126-1.283-.356-1.857M7 20H2v-2a3 3 0 015.356-1.857M7 20v-2c0-.656.126-1.283.356-1.857m0 0a5.002 5.002 0 019.288 0M15 7a3 3 0 11-6 0 3 3 0 016 0zm6 3a2 2 0 11-4 0 2 2 0 014 0zM7 10a2 2 0 11-4 0 2 2 0 014 0z";
const SATISFACTION_ICON: &str =
    "M14.828 14.828a4 4 0 01-5.656 0M9 10h.01M15 10h.01M21 12a9 9 0 11-18 0 9 9 0 0118 0z";

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn card(title: &str, value: String, path: &str, bg_color: &str) -> HospitalStatResponse {
    HospitalStatResponse {
        title: title.to_string(),
        value,
        change: "+0%".to_string(),
        trend: "up".to_string(),
        icon: StatIcon {
            path: path.to_string(),
            bg_color: bg_color.to_string(),
        },
    }
}

fn hospital_cards(totals: &HospitalTotals) -> Vec<HospitalStatResponse> {
    let satisfaction = totals.average_rating * 20.0;
    vec![
        card("Total Patients", format_thousands(totals.patients), PATIENTS_ICON, "bg-blue-500"),
        card("Appointments", format_thousands(totals.appointments), APPOINTMENTS_ICON, "bg-green-500"),
        card("Doctors", format_thousands(totals.doctors), DOCTORS_ICON, "bg-purple-500"),
        card(
            "Patient Satisfaction",
            format!("{:.1}%", satisfaction),
            SATISFACTION_ICON,
            "bg-indigo-500",
        ),
    ]
}

/// Every known status, title-cased, with zero for statuses never used
fn outcome_counts(counts: &[(String, i64)]) -> Vec<NamedCount> {
    AppointmentStatus::ALL
        .iter()
        .map(|status| {
            let key = status.as_str();
            let value = counts
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, count)| *count)
                .unwrap_or(0);
            let mut name = key.to_string();
            if let Some(first) = name.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            NamedCount { name, value }
        })
        .collect()
}

/// Handler for GET /statistics/departments
pub async fn department_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let departments: Vec<DepartmentStatsResponse> = state
        .statistics
        .departments()
        .await?
        .into_iter()
        .map(|d| DepartmentStatsResponse {
            name: d.name,
            avg_rating: d.avg_rating,
            patients: d.patients,
            doctors: d.doctors,
        })
        .collect();

    Ok(Json(departments))
}

/// Handler for GET /statistics/hospital
pub async fn hospital_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let totals = state.statistics.totals().await?;
    Ok(Json(hospital_cards(&totals)))
}

/// Handler for GET /statistics/doctors
pub async fn doctor_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let totals = state.statistics.totals().await?;
    let top_performers = state
        .statistics
        .top_doctors(TOP_PERFORMERS)
        .await?
        .into_iter()
        .map(|d| TopPerformer {
            name: d.name,
            specialty: d.specialty,
            rating: d.rating,
        })
        .collect();
    let specialties = state
        .statistics
        .specialty_counts()
        .await?
        .into_iter()
        .map(|(name, count)| SpecialtyCount { name, count })
        .collect();

    Ok(Json(DoctorStatsResponse {
        total_doctors: totals.doctors,
        average_rating: round_one_decimal(totals.average_rating),
        top_performers,
        specialties,
    }))
}

/// Handler for GET /statistics/treatment-outcomes
pub async fn treatment_outcomes(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let counts = state.statistics.status_counts().await?;
    Ok(Json(outcome_counts(&counts)))
}

/// Handler for GET /statistics/patient-admissions - January through the current month
pub async fn patient_admissions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let today = chrono::Local::now().date_naive();
    let admissions: Vec<AdmissionsResponse> = state
        .statistics
        .monthly_admissions(today.year(), today.month())
        .await?
        .into_iter()
        .map(|m| AdmissionsResponse {
            name: MONTH_NAMES
                .get(m.month.saturating_sub(1) as usize)
                .copied()
                .unwrap_or_default()
                .to_string(),
            emergency: m.emergency,
            scheduled: m.scheduled,
        })
        .collect();

    Ok(Json(admissions))
}
