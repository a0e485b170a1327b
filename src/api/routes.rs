//! API routes

use crate::api::handlers::{
    // Doctors
    create_doctor, get_doctor, get_doctor_profile, list_doctors, toggle_doctor_status,
    update_doctor,
    // Patients
    list_patients, search_patients, toggle_patient_status,
    // Appointments
    create_appointment, delete_appointment, get_appointment, list_appointments,
    list_public_appointments, update_appointment,
    // Medications
    create_medication, delete_medication, get_medication, list_medications, update_medication,
    // Feedback
    create_feedback, list_feedback, list_feedback_categories,
    // Reminders
    create_reminder, delete_reminder, list_reminders,
    // Statistics
    department_stats, doctor_stats, hospital_stats, patient_admissions, treatment_outcomes,
    health_check,
    AppState,
};
use crate::auth::handlers::{get_me, login, register_patient};
use crate::auth::middleware::authenticate;
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};

/// Build the API routes
pub fn build_api_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/token", post(login))
        .route("/auth/patient", post(register_patient))
        // Doctor directory
        .route("/doctor", get(list_doctors))
        .route("/doctor/profile", get(get_doctor_profile))
        .route("/doctor/:id", get(get_doctor))
        .route("/appointments/public", get(list_public_appointments))
        .route("/feedback/feedback_categories", get(list_feedback_categories))
        // Dashboard statistics
        .route("/statistics/departments", get(department_stats))
        .route("/statistics/hospital", get(hospital_stats))
        .route("/statistics/doctors", get(doctor_stats))
        .route("/statistics/treatment-outcomes", get(treatment_outcomes))
        .route("/statistics/patient-admissions", get(patient_admissions));

    // Protected routes (authentication required, roles checked in handlers)
    let protected_routes = Router::new()
        .route("/auth/me", get(get_me))
        // Doctor management (admin only)
        .route("/doctor", post(create_doctor))
        .route("/doctor/:id", put(update_doctor))
        .route("/doctor/:id/status", patch(toggle_doctor_status))
        // Patients
        .route("/patients", get(list_patients))
        .route("/patients/search", get(search_patients))
        .route("/patients/:id/status", patch(toggle_patient_status))
        // Appointments
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route(
            "/appointments/:id",
            get(get_appointment).put(update_appointment).delete(delete_appointment),
        )
        // Medications
        .route("/medications", get(list_medications).post(create_medication))
        .route(
            "/medications/:id",
            get(get_medication).put(update_medication).delete(delete_medication),
        )
        // Feedback
        .route("/feedback", get(list_feedback).post(create_feedback))
        // Reminders
        .route("/reminders", get(list_reminders).post(create_reminder))
        .route("/reminders/:id", axum::routing::delete(delete_reminder))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Combine public and protected routes
    public_routes
        .merge(protected_routes)
        .with_state(state)
}
