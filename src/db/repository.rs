//! Repository pattern implementation for data access layer
//!
//! Every repository wraps an `Arc<DatabaseManager>` and runs its SQL through
//! `execute`/`transaction`, so callers never touch a raw connection.

use crate::core::error::{CareError, Result};
use crate::core::utils::{round_one_decimal, timestamp};
use crate::db::manager::DatabaseManager;
use crate::db::models::{
    Admin, Appointment, AppointmentDetails, AppointmentFilter, DepartmentStat, Doctor,
    DoctorSummary, Feedback, FeedbackCategory, FeedbackDetails, FeedbackFilter, HospitalTotals,
    Identity, Medication, MedicationDetails, MedicationFilter, MedicationReminder,
    MonthlyAdmissions, Patient, RatedDoctor, Role,
};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::Arc;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Find an entity by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<T>>;

    /// Create a new entity, returning the generated ID
    async fn create(&self, entity: &T) -> Result<i64>;

    /// Update an existing entity; false when no row matched
    async fn update(&self, entity: &T) -> Result<bool>;

    /// Delete an entity by its ID; false when no row matched
    async fn delete(&self, id: i64) -> Result<bool>;
}

const ADMIN_COLUMNS: &str = "id, email, password_hash, name";
const DOCTOR_COLUMNS: &str =
    "id, email, password_hash, name, specialty, is_active, created_at, updated_at";
const PATIENT_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone_number, is_active, created_at";

const DOCTOR_SUMMARY_SELECT: &str = "SELECT d.id, d.email, d.password_hash, d.name, d.specialty, \
     d.is_active, d.created_at, d.updated_at, \
     (SELECT COUNT(DISTINCT a.patient_id) FROM appointments a WHERE a.doctor_id = d.id), \
     (SELECT AVG(f.rating) FROM feedback f WHERE f.doctor_id = d.id) \
     FROM doctors d";

const APPOINTMENT_DETAILS_SELECT: &str = "SELECT a.id, a.patient_id, a.doctor_id, a.date, a.time, \
     a.category, a.description, a.status, a.created_at, \
     d.name, p.first_name || ' ' || p.last_name \
     FROM appointments a \
     LEFT JOIN doctors d ON d.id = a.doctor_id \
     LEFT JOIN patients p ON p.id = a.patient_id";

const MEDICATION_DETAILS_SELECT: &str = "SELECT m.id, m.patient_id, m.doctor_id, m.medication, \
     m.dosage, m.frequency, m.instructions, m.start_date, m.end_date, m.created_at, \
     d.name, p.first_name || ' ' || p.last_name \
     FROM medications m \
     LEFT JOIN doctors d ON d.id = m.doctor_id \
     LEFT JOIN patients p ON p.id = m.patient_id";

fn map_admin(row: &Row) -> rusqlite::Result<Admin> {
    Ok(Admin {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
    })
}

fn map_doctor(row: &Row) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        specialty: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_doctor_summary(row: &Row) -> rusqlite::Result<DoctorSummary> {
    let average: Option<f64> = row.get(9)?;
    Ok(DoctorSummary {
        doctor: map_doctor(row)?,
        patient_count: row.get(8)?,
        average_rating: round_one_decimal(average.unwrap_or(0.0)),
    })
}

fn map_patient(row: &Row) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        phone_number: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_appointment(row: &Row) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        category: row.get(5)?,
        description: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_appointment_details(row: &Row) -> rusqlite::Result<AppointmentDetails> {
    Ok(AppointmentDetails {
        appointment: map_appointment(row)?,
        doctor_name: row.get(9)?,
        patient_name: row.get(10)?,
    })
}

fn map_medication(row: &Row) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        medication: row.get(3)?,
        dosage: row.get(4)?,
        frequency: row.get(5)?,
        instructions: row.get(6)?,
        start_date: row.get(7)?,
        end_date: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn map_medication_details(row: &Row) -> rusqlite::Result<MedicationDetails> {
    Ok(MedicationDetails {
        medication: map_medication(row)?,
        doctor_name: row.get(10)?,
        patient_name: row.get(11)?,
    })
}

fn map_feedback(row: &Row) -> rusqlite::Result<Feedback> {
    Ok(Feedback {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        category_id: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_reminder(row: &Row) -> rusqlite::Result<MedicationReminder> {
    Ok(MedicationReminder {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        medication: row.get(2)?,
        time: row.get(3)?,
        frequency: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Load one identity record from the table owned by `role`
fn load_identity(
    conn: &Connection,
    role: Role,
    column: &str,
    value: &dyn rusqlite::ToSql,
) -> rusqlite::Result<Option<Identity>> {
    match role {
        Role::Admin => conn
            .query_row(
                &format!("SELECT {} FROM admins WHERE {} = ?", ADMIN_COLUMNS, column),
                [value],
                map_admin,
            )
            .optional()
            .map(|r| r.map(Identity::Admin)),
        Role::Doctor => conn
            .query_row(
                &format!("SELECT {} FROM doctors WHERE {} = ?", DOCTOR_COLUMNS, column),
                [value],
                map_doctor,
            )
            .optional()
            .map(|r| r.map(Identity::Doctor)),
        Role::Patient => conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE {} = ?", PATIENT_COLUMNS, column),
                [value],
                map_patient,
            )
            .optional()
            .map(|r| r.map(Identity::Patient)),
    }
}

fn email_exists(conn: &Connection, role: Role, email: &str, exclude_id: Option<i64>) -> Result<bool> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} WHERE email = ? AND id != ?",
            role.table()
        ),
        params![email, exclude_id.unwrap_or(-1)],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn load_doctor_summary(conn: &Connection, id: i64) -> rusqlite::Result<Option<DoctorSummary>> {
    conn.query_row(
        &format!("{} WHERE d.id = ?", DOCTOR_SUMMARY_SELECT),
        [id],
        map_doctor_summary,
    )
    .optional()
}

fn load_patient(conn: &Connection, id: i64) -> rusqlite::Result<Option<Patient>> {
    conn.query_row(
        &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
        [id],
        map_patient,
    )
    .optional()
}

/// Make `%`, `_` and `\` match literally in a LIKE pattern using `ESCAPE '\'`
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Role-keyed access to the three credential tables
pub struct CredentialRepository {
    db: Arc<DatabaseManager>,
}

impl CredentialRepository {
    /// Create a new CredentialRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Find the identity with this email in the table owned by `role`
    pub async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Identity>> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                load_identity(conn, role, "email", &email).map_err(CareError::DatabaseError)
            })
            .await
    }

    /// Find the identity with this id in the table owned by `role`
    pub async fn find_by_id(&self, role: Role, id: i64) -> Result<Option<Identity>> {
        self.db
            .execute(move |conn| {
                load_identity(conn, role, "id", &id).map_err(CareError::DatabaseError)
            })
            .await
    }

    /// Probe the credential tables in login order; the first match wins
    pub async fn find_login_candidate(&self, email: &str) -> Result<Option<Identity>> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                for role in Role::LOGIN_ORDER {
                    if let Some(identity) = load_identity(conn, role, "email", &email)? {
                        return Ok(Some(identity));
                    }
                }
                Ok(None)
            })
            .await
    }

    /// Count administrators
    pub async fn admin_count(&self) -> Result<i64> {
        self.db
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))
                    .map_err(CareError::DatabaseError)
            })
            .await
    }

    /// Insert an administrator
    pub async fn create_admin(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<String>,
    ) -> Result<i64> {
        let email = email.to_string();
        let password_hash = password_hash.to_string();
        self.db
            .transaction(move |tx| {
                if email_exists(tx, Role::Admin, &email, None)? {
                    return Err(CareError::Conflict("Email already registered".to_string()));
                }
                tx.execute(
                    "INSERT INTO admins (email, password_hash, name) VALUES (?, ?, ?)",
                    params![&email, &password_hash, &name],
                )?;
                Ok(tx.last_insert_rowid())
            })
            .await
    }
}

/// Fields written when creating or replacing a doctor
#[derive(Debug, Clone)]
pub struct DoctorDraft {
    pub name: String,
    pub specialty: String,
    pub email: String,
    /// New digest; `None` keeps the stored one on update
    pub password_hash: Option<String>,
}

/// Repository for doctors
pub struct DoctorRepository {
    db: Arc<DatabaseManager>,
}

impl DoctorRepository {
    /// Create a new DoctorRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// List doctors, optionally restricted to one specialty (case-insensitive)
    pub async fn list(&self, specialty: Option<String>) -> Result<Vec<DoctorSummary>> {
        self.db
            .execute(move |conn| {
                let doctors = match specialty {
                    Some(specialty) => {
                        let mut stmt = conn.prepare(&format!(
                            "{} WHERE d.specialty = ? COLLATE NOCASE ORDER BY d.name",
                            DOCTOR_SUMMARY_SELECT
                        ))?;
                        let rows = stmt
                            .query_map([&specialty], map_doctor_summary)?
                            .collect::<std::result::Result<Vec<_>, _>>()?;
                        rows
                    }
                    None => {
                        let mut stmt = conn
                            .prepare(&format!("{} ORDER BY d.name", DOCTOR_SUMMARY_SELECT))?;
                        let rows = stmt
                            .query_map([], map_doctor_summary)?
                            .collect::<std::result::Result<Vec<_>, _>>()?;
                        rows
                    }
                };
                Ok(doctors)
            })
            .await
    }

    /// Find a doctor by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<DoctorSummary>> {
        self.db
            .execute(move |conn| load_doctor_summary(conn, id).map_err(CareError::DatabaseError))
            .await
    }

    /// Find a doctor by (already normalized) email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<DoctorSummary>> {
        let email = email.to_string();
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("{} WHERE d.email = ?", DOCTOR_SUMMARY_SELECT),
                    [&email],
                    map_doctor_summary,
                )
                .optional()
                .map_err(CareError::DatabaseError)
            })
            .await
    }

    /// Insert a doctor; `Conflict` when the email is already registered
    pub async fn create(&self, draft: DoctorDraft) -> Result<i64> {
        self.db
            .transaction(move |tx| {
                if email_exists(tx, Role::Doctor, &draft.email, None)? {
                    return Err(CareError::Conflict("Email already registered".to_string()));
                }
                let password_hash = draft.password_hash.ok_or_else(|| {
                    CareError::ValidationError("password cannot be empty".to_string())
                })?;
                let now = timestamp();
                tx.execute(
                    "INSERT INTO doctors (email, password_hash, name, specialty, is_active, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, 1, ?, ?)",
                    params![&draft.email, &password_hash, &draft.name, &draft.specialty, &now, &now],
                )?;
                Ok(tx.last_insert_rowid())
            })
            .await
    }

    /// Replace a doctor's profile and reactivate it; false when absent
    pub async fn update(&self, id: i64, draft: DoctorDraft) -> Result<bool> {
        self.db
            .transaction(move |tx| {
                let exists: i64 =
                    tx.query_row("SELECT COUNT(*) FROM doctors WHERE id = ?", [id], |row| row.get(0))?;
                if exists == 0 {
                    return Ok(false);
                }
                if email_exists(tx, Role::Doctor, &draft.email, Some(id))? {
                    return Err(CareError::Conflict("Email already registered".to_string()));
                }

                let now = timestamp();
                tx.execute(
                    "UPDATE doctors SET name = ?, specialty = ?, email = ?, is_active = 1, updated_at = ? \
                     WHERE id = ?",
                    params![&draft.name, &draft.specialty, &draft.email, &now, id],
                )?;
                if let Some(password_hash) = &draft.password_hash {
                    tx.execute(
                        "UPDATE doctors SET password_hash = ? WHERE id = ?",
                        params![password_hash, id],
                    )?;
                }
                Ok(true)
            })
            .await
    }

    /// Flip the activation flag; `None` when absent
    pub async fn toggle_status(&self, id: i64) -> Result<Option<DoctorSummary>> {
        self.db
            .transaction(move |tx| {
                let changed = tx.execute(
                    "UPDATE doctors SET is_active = NOT is_active, updated_at = ? WHERE id = ?",
                    params![timestamp(), id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                Ok(load_doctor_summary(tx, id)?)
            })
            .await
    }
}

/// Fields written when registering a patient
#[derive(Debug, Clone)]
pub struct PatientDraft {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Repository for patients
pub struct PatientRepository {
    db: Arc<DatabaseManager>,
}

impl PatientRepository {
    /// Create a new PatientRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Insert a patient inside a transaction; `Conflict` when the email exists
    pub async fn register(&self, draft: PatientDraft) -> Result<i64> {
        self.db
            .transaction(move |tx| {
                if email_exists(tx, Role::Patient, &draft.email, None)? {
                    return Err(CareError::Conflict("Email already registered".to_string()));
                }
                tx.execute(
                    "INSERT INTO patients (email, password_hash, first_name, last_name, phone_number, is_active, created_at) \
                     VALUES (?, ?, ?, ?, ?, 1, ?)",
                    params![
                        &draft.email,
                        &draft.password_hash,
                        &draft.first_name,
                        &draft.last_name,
                        &draft.phone_number,
                        timestamp(),
                    ],
                )?;
                Ok(tx.last_insert_rowid())
            })
            .await
    }

    /// Find a patient by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Patient>> {
        self.db
            .execute(move |conn| load_patient(conn, id).map_err(CareError::DatabaseError))
            .await
    }

    /// List every patient
    pub async fn list(&self) -> Result<Vec<Patient>> {
        self.search(None).await
    }

    /// Case-insensitive substring match on first or last name
    pub async fn search(&self, name: Option<String>) -> Result<Vec<Patient>> {
        self.db
            .execute(move |conn| {
                let pattern = format!("%{}%", escape_like(name.unwrap_or_default().trim()));
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM patients \
                     WHERE first_name LIKE ?1 ESCAPE '\\' OR last_name LIKE ?1 ESCAPE '\\' \
                     ORDER BY last_name, first_name",
                    PATIENT_COLUMNS
                ))?;
                let patients = stmt
                    .query_map([&pattern], map_patient)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(patients)
            })
            .await
    }

    /// Flip the activation flag; `None` when absent
    pub async fn toggle_status(&self, id: i64) -> Result<Option<Patient>> {
        self.db
            .transaction(move |tx| {
                let changed = tx.execute(
                    "UPDATE patients SET is_active = NOT is_active WHERE id = ?",
                    [id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                Ok(load_patient(tx, id)?)
            })
            .await
    }
}

/// Repository for appointments
pub struct AppointmentRepository {
    db: Arc<DatabaseManager>,
}

impl AppointmentRepository {
    /// Create a new AppointmentRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Filtered listing with both parties' names attached
    pub async fn list(&self, filter: AppointmentFilter) -> Result<Vec<AppointmentDetails>> {
        self.db
            .execute(move |conn| {
                let mut clauses = Vec::new();
                let mut values: Vec<Value> = Vec::new();
                if let Some(patient_id) = filter.patient_id {
                    clauses.push("a.patient_id = ?");
                    values.push(Value::Integer(patient_id));
                }
                if let Some(doctor_id) = filter.doctor_id {
                    clauses.push("a.doctor_id = ?");
                    values.push(Value::Integer(doctor_id));
                }
                if let Some(date) = filter.date {
                    clauses.push("a.date = ?");
                    values.push(Value::Text(date));
                }
                if let Some(status) = filter.status {
                    clauses.push("a.status = ? COLLATE NOCASE");
                    values.push(Value::Text(status));
                }

                let mut sql = APPOINTMENT_DETAILS_SELECT.to_string();
                if !clauses.is_empty() {
                    sql.push_str(" WHERE ");
                    sql.push_str(&clauses.join(" AND "));
                }
                sql.push_str(" ORDER BY a.date, a.time, a.id");

                let mut stmt = conn.prepare(&sql)?;
                let appointments = stmt
                    .query_map(params_from_iter(values.iter()), map_appointment_details)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(appointments)
            })
            .await
    }

    /// One appointment with both parties' names attached
    pub async fn find_details(&self, id: i64) -> Result<Option<AppointmentDetails>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("{} WHERE a.id = ?", APPOINTMENT_DETAILS_SELECT),
                    [id],
                    map_appointment_details,
                )
                .optional()
                .map_err(CareError::DatabaseError)
            })
            .await
    }
}

#[async_trait]
impl Repository<Appointment> for AppointmentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT id, patient_id, doctor_id, date, time, category, description, status, created_at \
                     FROM appointments WHERE id = ?",
                    [id],
                    map_appointment,
                )
                .optional()
                .map_err(CareError::DatabaseError)
            })
            .await
    }

    async fn create(&self, appointment: &Appointment) -> Result<i64> {
        let appointment = appointment.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO appointments (patient_id, doctor_id, date, time, category, description, status, created_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        appointment.patient_id,
                        appointment.doctor_id,
                        &appointment.date,
                        &appointment.time,
                        &appointment.category,
                        &appointment.description,
                        &appointment.status,
                        timestamp(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    async fn update(&self, appointment: &Appointment) -> Result<bool> {
        let appointment = appointment.clone();
        self.db
            .execute(move |conn| {
                let changed = conn.execute(
                    "UPDATE appointments SET patient_id = ?, doctor_id = ?, date = ?, time = ?, \
                     category = ?, description = ?, status = ? WHERE id = ?",
                    params![
                        appointment.patient_id,
                        appointment.doctor_id,
                        &appointment.date,
                        &appointment.time,
                        &appointment.category,
                        &appointment.description,
                        &appointment.status,
                        appointment.id,
                    ],
                )?;
                Ok(changed > 0)
            })
            .await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let changed = conn.execute("DELETE FROM appointments WHERE id = ?", [id])?;
                Ok(changed > 0)
            })
            .await
    }
}

/// Repository for prescribed medications
pub struct MedicationRepository {
    db: Arc<DatabaseManager>,
}

impl MedicationRepository {
    /// Create a new MedicationRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Filtered listing with both parties' names attached
    pub async fn list(&self, filter: MedicationFilter) -> Result<Vec<MedicationDetails>> {
        self.db
            .execute(move |conn| {
                let mut clauses = Vec::new();
                let mut values: Vec<Value> = Vec::new();
                if let Some(patient_id) = filter.patient_id {
                    clauses.push("m.patient_id = ?");
                    values.push(Value::Integer(patient_id));
                }
                if let Some(doctor_id) = filter.doctor_id {
                    clauses.push("m.doctor_id = ?");
                    values.push(Value::Integer(doctor_id));
                }

                let mut sql = MEDICATION_DETAILS_SELECT.to_string();
                if !clauses.is_empty() {
                    sql.push_str(" WHERE ");
                    sql.push_str(&clauses.join(" AND "));
                }
                sql.push_str(" ORDER BY m.created_at DESC, m.id DESC");

                let mut stmt = conn.prepare(&sql)?;
                let medications = stmt
                    .query_map(params_from_iter(values.iter()), map_medication_details)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(medications)
            })
            .await
    }

    /// One medication with both parties' names attached
    pub async fn find_details(&self, id: i64) -> Result<Option<MedicationDetails>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("{} WHERE m.id = ?", MEDICATION_DETAILS_SELECT),
                    [id],
                    map_medication_details,
                )
                .optional()
                .map_err(CareError::DatabaseError)
            })
            .await
    }
}

#[async_trait]
impl Repository<Medication> for MedicationRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Medication>> {
        self.db
            .execute(move |conn| {
                conn.query_row(
                    "SELECT id, patient_id, doctor_id, medication, dosage, frequency, instructions, \
                     start_date, end_date, created_at FROM medications WHERE id = ?",
                    [id],
                    map_medication,
                )
                .optional()
                .map_err(CareError::DatabaseError)
            })
            .await
    }

    async fn create(&self, medication: &Medication) -> Result<i64> {
        let medication = medication.clone();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO medications (patient_id, doctor_id, medication, dosage, frequency, \
                     instructions, start_date, end_date, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        medication.patient_id,
                        medication.doctor_id,
                        &medication.medication,
                        &medication.dosage,
                        &medication.frequency,
                        &medication.instructions,
                        &medication.start_date,
                        &medication.end_date,
                        timestamp(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    async fn update(&self, medication: &Medication) -> Result<bool> {
        let medication = medication.clone();
        self.db
            .execute(move |conn| {
                let changed = conn.execute(
                    "UPDATE medications SET patient_id = ?, doctor_id = ?, medication = ?, dosage = ?, \
                     frequency = ?, instructions = ?, start_date = ?, end_date = ? WHERE id = ?",
                    params![
                        medication.patient_id,
                        medication.doctor_id,
                        &medication.medication,
                        &medication.dosage,
                        &medication.frequency,
                        &medication.instructions,
                        &medication.start_date,
                        &medication.end_date,
                        medication.id,
                    ],
                )?;
                Ok(changed > 0)
            })
            .await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let changed = conn.execute("DELETE FROM medications WHERE id = ?", [id])?;
                Ok(changed > 0)
            })
            .await
    }
}

/// Repository for feedback and its categories
pub struct FeedbackRepository {
    db: Arc<DatabaseManager>,
}

impl FeedbackRepository {
    /// Create a new FeedbackRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// All categories ordered by id
    pub async fn categories(&self) -> Result<Vec<FeedbackCategory>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare("SELECT id, name FROM feedback_categories ORDER BY id")?;
                let categories = stmt
                    .query_map([], |row| {
                        Ok(FeedbackCategory {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(categories)
            })
            .await
    }

    /// Find a category by id
    pub async fn find_category(&self, id: i64) -> Result<Option<FeedbackCategory>> {
        self.db
            .execute(move |conn| {
                load_category(conn, id).map_err(CareError::DatabaseError)
            })
            .await
    }

    /// Insert the given categories when the table is empty; returns how many were added
    pub async fn seed_categories(&self, names: &[&str]) -> Result<usize> {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        self.db
            .transaction(move |tx| {
                let existing: i64 =
                    tx.query_row("SELECT COUNT(*) FROM feedback_categories", [], |row| row.get(0))?;
                if existing > 0 {
                    return Ok(0);
                }
                for name in &names {
                    tx.execute("INSERT INTO feedback_categories (name) VALUES (?)", [name])?;
                }
                Ok(names.len())
            })
            .await
    }

    /// Insert a feedback entry
    pub async fn create(
        &self,
        patient_id: i64,
        doctor_id: i64,
        category_id: i64,
        rating: i64,
        comment: String,
    ) -> Result<Feedback> {
        self.db
            .execute(move |conn| {
                let created_at = timestamp();
                conn.execute(
                    "INSERT INTO feedback (patient_id, doctor_id, category_id, rating, comment, created_at) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                    params![patient_id, doctor_id, category_id, rating, &comment, &created_at],
                )?;
                Ok(Feedback {
                    id: conn.last_insert_rowid(),
                    patient_id,
                    doctor_id,
                    category_id,
                    rating,
                    comment,
                    created_at,
                })
            })
            .await
    }

    /// Filtered listing with category, doctor and patient resolved
    pub async fn list(&self, filter: FeedbackFilter) -> Result<Vec<FeedbackDetails>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, patient_id, doctor_id, category_id, rating, comment, created_at \
                     FROM feedback \
                     WHERE (?1 IS NULL OR doctor_id = ?1) AND (?2 IS NULL OR patient_id = ?2) \
                     ORDER BY created_at DESC, id DESC",
                )?;
                let rows = stmt
                    .query_map(params![filter.doctor_id, filter.patient_id], map_feedback)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                let mut details = Vec::with_capacity(rows.len());
                for feedback in rows {
                    details.push(FeedbackDetails {
                        category: load_category(conn, feedback.category_id)?,
                        doctor: load_doctor_summary(conn, feedback.doctor_id)?,
                        patient: load_patient(conn, feedback.patient_id)?,
                        feedback,
                    });
                }
                Ok(details)
            })
            .await
    }
}

fn load_category(conn: &Connection, id: i64) -> rusqlite::Result<Option<FeedbackCategory>> {
    conn.query_row(
        "SELECT id, name FROM feedback_categories WHERE id = ?",
        [id],
        |row| {
            Ok(FeedbackCategory {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Repository for medication reminders
pub struct ReminderRepository {
    db: Arc<DatabaseManager>,
}

impl ReminderRepository {
    /// Create a new ReminderRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Insert an active reminder
    pub async fn create(
        &self,
        patient_id: i64,
        medication: String,
        time: String,
        frequency: String,
    ) -> Result<MedicationReminder> {
        self.db
            .execute(move |conn| {
                let created_at = timestamp();
                conn.execute(
                    "INSERT INTO medication_reminders (patient_id, medication, time, frequency, is_active, created_at) \
                     VALUES (?, ?, ?, ?, 1, ?)",
                    params![patient_id, &medication, &time, &frequency, &created_at],
                )?;
                Ok(MedicationReminder {
                    id: conn.last_insert_rowid(),
                    patient_id,
                    medication,
                    time,
                    frequency,
                    is_active: true,
                    created_at,
                })
            })
            .await
    }

    /// Active reminders of one patient
    pub async fn active_for_patient(&self, patient_id: i64) -> Result<Vec<MedicationReminder>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, patient_id, medication, time, frequency, is_active, created_at \
                     FROM medication_reminders WHERE patient_id = ? AND is_active = 1 \
                     ORDER BY time, id",
                )?;
                let reminders = stmt
                    .query_map([patient_id], map_reminder)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(reminders)
            })
            .await
    }

    /// Soft delete; false when no reminder has this id
    pub async fn deactivate(&self, id: i64) -> Result<bool> {
        self.db
            .execute(move |conn| {
                let changed = conn.execute(
                    "UPDATE medication_reminders SET is_active = 0 WHERE id = ?",
                    [id],
                )?;
                Ok(changed > 0)
            })
            .await
    }
}

/// Read-only aggregates for the dashboard
pub struct StatisticsRepository {
    db: Arc<DatabaseManager>,
}

impl StatisticsRepository {
    /// Create a new StatisticsRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Per-specialty doctor count, distinct patients seen and mean rating
    pub async fn departments(&self) -> Result<Vec<DepartmentStat>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT d.specialty, COUNT(d.id), \
                     (SELECT AVG(f.rating) FROM feedback f JOIN doctors fd ON fd.id = f.doctor_id \
                      WHERE fd.specialty = d.specialty), \
                     (SELECT COUNT(DISTINCT a.patient_id) FROM appointments a JOIN doctors ad ON ad.id = a.doctor_id \
                      WHERE ad.specialty = d.specialty) \
                     FROM doctors d GROUP BY d.specialty ORDER BY d.specialty",
                )?;
                let stats = stmt
                    .query_map([], |row| {
                        let avg: Option<f64> = row.get(2)?;
                        Ok(DepartmentStat {
                            name: row.get(0)?,
                            doctors: row.get(1)?,
                            avg_rating: round_one_decimal(avg.unwrap_or(0.0)),
                            patients: row.get(3)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(stats)
            })
            .await
    }

    /// Hospital-wide counters and the mean feedback rating
    pub async fn totals(&self) -> Result<HospitalTotals> {
        self.db
            .execute(|conn| {
                conn.query_row(
                    "SELECT (SELECT COUNT(*) FROM patients), (SELECT COUNT(*) FROM appointments), \
                     (SELECT COUNT(*) FROM doctors), (SELECT AVG(rating) FROM feedback)",
                    [],
                    |row| {
                        let avg: Option<f64> = row.get(3)?;
                        Ok(HospitalTotals {
                            patients: row.get(0)?,
                            appointments: row.get(1)?,
                            doctors: row.get(2)?,
                            average_rating: avg.unwrap_or(0.0),
                        })
                    },
                )
                .map_err(CareError::DatabaseError)
            })
            .await
    }

    /// Doctors with feedback, best mean rating first
    pub async fn top_doctors(&self, limit: i64) -> Result<Vec<RatedDoctor>> {
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT d.name, d.specialty, AVG(f.rating) AS avg_rating \
                     FROM doctors d JOIN feedback f ON f.doctor_id = d.id \
                     GROUP BY d.id ORDER BY avg_rating DESC, d.name LIMIT ?",
                )?;
                let doctors = stmt
                    .query_map([limit], |row| {
                        let avg: f64 = row.get(2)?;
                        Ok(RatedDoctor {
                            name: row.get(0)?,
                            specialty: row.get(1)?,
                            rating: round_one_decimal(avg),
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(doctors)
            })
            .await
    }

    /// Number of doctors per specialty
    pub async fn specialty_counts(&self) -> Result<Vec<(String, i64)>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT specialty, COUNT(*) FROM doctors GROUP BY specialty ORDER BY specialty",
                )?;
                let counts = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(counts)
            })
            .await
    }

    /// Number of appointments per stored status value
    pub async fn status_counts(&self) -> Result<Vec<(String, i64)>> {
        self.db
            .execute(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT lower(status), COUNT(*) FROM appointments GROUP BY lower(status)",
                )?;
                let counts = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(counts)
            })
            .await
    }

    /// Emergency and scheduled appointment counts for months 1..=`through_month` of `year`
    pub async fn monthly_admissions(
        &self,
        year: i32,
        through_month: u32,
    ) -> Result<Vec<MonthlyAdmissions>> {
        self.db
            .execute(move |conn| {
                let mut months: Vec<MonthlyAdmissions> = (1..=through_month)
                    .map(|month| MonthlyAdmissions {
                        month,
                        ..Default::default()
                    })
                    .collect();

                let mut stmt = conn.prepare(
                    "SELECT CAST(substr(date, 6, 2) AS INTEGER) AS month, \
                     SUM(CASE WHEN lower(category) = 'emergency' THEN 1 ELSE 0 END), \
                     SUM(CASE WHEN category IS NULL OR lower(category) != 'emergency' THEN 1 ELSE 0 END) \
                     FROM appointments WHERE substr(date, 1, 4) = ? GROUP BY month",
                )?;
                let rows = stmt
                    .query_map([format!("{:04}", year)], |row| {
                        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                for (month, emergency, scheduled) in rows {
                    if let Some(slot) = months.iter_mut().find(|m| i64::from(m.month) == month) {
                        slot.emergency = emergency;
                        slot.scheduled = scheduled;
                    }
                }
                Ok(months)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Arc<DatabaseManager> {
        Arc::new(DatabaseManager::new_in_memory().unwrap())
    }

    fn doctor_draft(email: &str, specialty: &str) -> DoctorDraft {
        DoctorDraft {
            name: format!("Dr {}", email),
            specialty: specialty.to_string(),
            email: email.to_string(),
            password_hash: Some("hash".to_string()),
        }
    }

    fn patient_draft(email: &str, first: &str, last: &str) -> PatientDraft {
        PatientDraft {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone_number: None,
        }
    }

    fn appointment(patient_id: i64, doctor_id: i64, date: &str, category: Option<&str>) -> Appointment {
        Appointment {
            id: 0,
            patient_id,
            doctor_id,
            date: date.to_string(),
            time: "09:00".to_string(),
            category: category.map(str::to_string),
            description: None,
            status: "scheduled".to_string(),
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_login_lookup_order() {
        let db = setup();
        let credentials = CredentialRepository::new(db.clone());
        let doctors = DoctorRepository::new(db.clone());
        let patients = PatientRepository::new(db.clone());

        doctors.create(doctor_draft("shared@dgh.cm", "Cardiology")).await.unwrap();
        patients
            .register(patient_draft("shared@dgh.cm", "Ama", "Nkongho"))
            .await
            .unwrap();

        let found = credentials.find_login_candidate("shared@dgh.cm").await.unwrap().unwrap();
        assert_eq!(found.role(), Role::Doctor);

        credentials.create_admin("shared@dgh.cm", "hash", None).await.unwrap();
        let found = credentials.find_login_candidate("shared@dgh.cm").await.unwrap().unwrap();
        assert_eq!(found.role(), Role::Admin);

        assert!(credentials.find_login_candidate("nobody@dgh.cm").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_is_role_scoped() {
        let db = setup();
        let credentials = CredentialRepository::new(db.clone());
        let patients = PatientRepository::new(db.clone());

        let id = patients
            .register(patient_draft("p@dgh.cm", "Ama", "Nkongho"))
            .await
            .unwrap();

        assert!(credentials.find_by_id(Role::Patient, id).await.unwrap().is_some());
        assert!(credentials.find_by_id(Role::Doctor, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_patient_registration_conflicts() {
        let db = setup();
        let patients = PatientRepository::new(db.clone());

        patients.register(patient_draft("p@dgh.cm", "A", "B")).await.unwrap();
        let second = patients.register(patient_draft("P@dgh.cm", "C", "D")).await;
        assert!(matches!(second, Err(CareError::Conflict(_))));
        assert_eq!(patients.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_doctor_update_rules() {
        let db = setup();
        let doctors = DoctorRepository::new(db.clone());

        let first = doctors.create(doctor_draft("a@dgh.cm", "Cardiology")).await.unwrap();
        doctors.create(doctor_draft("b@dgh.cm", "Cardiology")).await.unwrap();

        let toggled = doctors.toggle_status(first).await.unwrap().unwrap();
        assert!(!toggled.doctor.is_active);

        let clash = doctors.update(first, doctor_draft("b@dgh.cm", "Neurology")).await;
        assert!(matches!(clash, Err(CareError::Conflict(_))));

        let mut draft = doctor_draft("a@dgh.cm", "Neurology");
        draft.password_hash = None;
        assert!(doctors.update(first, draft).await.unwrap());

        let updated = doctors.find_by_id(first).await.unwrap().unwrap();
        assert!(updated.doctor.is_active);
        assert_eq!(updated.doctor.specialty, "Neurology");
        assert_eq!(updated.doctor.password_hash, "hash");

        assert!(!doctors.update(999, doctor_draft("z@dgh.cm", "X")).await.unwrap());
    }

    #[tokio::test]
    async fn test_doctor_specialty_filter_is_case_insensitive() {
        let db = setup();
        let doctors = DoctorRepository::new(db.clone());
        doctors.create(doctor_draft("a@dgh.cm", "Cardiology")).await.unwrap();
        doctors.create(doctor_draft("b@dgh.cm", "Pediatrics")).await.unwrap();

        let found = doctors.list(Some("cardiology".to_string())).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].doctor.email, "a@dgh.cm");
        assert_eq!(doctors.list(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_patient_search() {
        let db = setup();
        let patients = PatientRepository::new(db.clone());
        patients.register(patient_draft("a@dgh.cm", "Ama", "Nkongho")).await.unwrap();
        patients.register(patient_draft("b@dgh.cm", "Paul", "Etame")).await.unwrap();

        assert_eq!(patients.search(Some("nko".to_string())).await.unwrap().len(), 1);
        assert_eq!(patients.search(Some("PAUL".to_string())).await.unwrap().len(), 1);
        assert_eq!(patients.search(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_patient_search_wildcards_are_literal() {
        let db = setup();
        let patients = PatientRepository::new(db.clone());
        patients.register(patient_draft("a@dgh.cm", "Ama", "Nkongho")).await.unwrap();
        patients.register(patient_draft("b@dgh.cm", "Paul", "Etame")).await.unwrap();

        assert!(patients.search(Some("%".to_string())).await.unwrap().is_empty());
        assert!(patients.search(Some("_".to_string())).await.unwrap().is_empty());
        assert!(patients.search(Some("\\".to_string())).await.unwrap().is_empty());

        patients.register(patient_draft("c@dgh.cm", "Ngo_100%", "Bi")).await.unwrap();
        let found = patients.search(Some("o_100%".to_string())).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "c@dgh.cm");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ama"), "ama");
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[tokio::test]
    async fn test_appointment_names_and_filters() {
        let db = setup();
        let doctors = DoctorRepository::new(db.clone());
        let patients = PatientRepository::new(db.clone());
        let appointments = AppointmentRepository::new(db.clone());

        let doctor = doctors.create(doctor_draft("a@dgh.cm", "Cardiology")).await.unwrap();
        let patient = patients.register(patient_draft("p@dgh.cm", "Ama", "Nkongho")).await.unwrap();

        let id = appointments
            .create(&appointment(patient, doctor, "2030-01-10", None))
            .await
            .unwrap();
        appointments
            .create(&appointment(patient, doctor, "2030-01-11", None))
            .await
            .unwrap();

        let details = appointments.find_details(id).await.unwrap().unwrap();
        assert_eq!(details.patient_name.as_deref(), Some("Ama Nkongho"));
        assert_eq!(details.doctor_name.as_deref(), Some("Dr a@dgh.cm"));

        let filtered = appointments
            .list(AppointmentFilter {
                date: Some("2030-01-11".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        assert!(appointments.delete(id).await.unwrap());
        assert!(!appointments.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_reminder_soft_delete() {
        let db = setup();
        let patients = PatientRepository::new(db.clone());
        let reminders = ReminderRepository::new(db.clone());

        let patient = patients.register(patient_draft("p@dgh.cm", "A", "B")).await.unwrap();
        let reminder = reminders
            .create(patient, "Amoxicillin".into(), "08:00".into(), "daily".into())
            .await
            .unwrap();

        assert_eq!(reminders.active_for_patient(patient).await.unwrap().len(), 1);
        assert!(reminders.deactivate(reminder.id).await.unwrap());
        assert!(reminders.active_for_patient(patient).await.unwrap().is_empty());
        assert!(!reminders.deactivate(9999).await.unwrap());
    }

    #[tokio::test]
    async fn test_seed_categories_only_once() {
        let db = setup();
        let feedback = FeedbackRepository::new(db.clone());

        assert_eq!(feedback.seed_categories(&["Wait Time", "Facilities"]).await.unwrap(), 2);
        assert_eq!(feedback.seed_categories(&["Wait Time", "Facilities"]).await.unwrap(), 0);
        assert_eq!(feedback.categories().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_statistics_aggregates() {
        let db = setup();
        let doctors = DoctorRepository::new(db.clone());
        let patients = PatientRepository::new(db.clone());
        let appointments = AppointmentRepository::new(db.clone());
        let feedback = FeedbackRepository::new(db.clone());
        let stats = StatisticsRepository::new(db.clone());

        let cardio = doctors.create(doctor_draft("a@dgh.cm", "Cardiology")).await.unwrap();
        let peds = doctors.create(doctor_draft("b@dgh.cm", "Pediatrics")).await.unwrap();
        let patient = patients.register(patient_draft("p@dgh.cm", "A", "B")).await.unwrap();
        feedback.seed_categories(&["Wait Time"]).await.unwrap();

        appointments
            .create(&appointment(patient, cardio, "2030-02-01", Some("Emergency")))
            .await
            .unwrap();
        appointments
            .create(&appointment(patient, cardio, "2030-02-03", None))
            .await
            .unwrap();
        feedback.create(patient, cardio, 1, 5, "great".into()).await.unwrap();
        feedback.create(patient, cardio, 1, 4, "good".into()).await.unwrap();
        feedback.create(patient, peds, 1, 3, "ok".into()).await.unwrap();

        let totals = stats.totals().await.unwrap();
        assert_eq!(totals.patients, 1);
        assert_eq!(totals.appointments, 2);
        assert_eq!(totals.doctors, 2);
        assert_eq!(round_one_decimal(totals.average_rating), 4.0);

        let departments = stats.departments().await.unwrap();
        let cardiology = departments.iter().find(|d| d.name == "Cardiology").unwrap();
        assert_eq!(cardiology.avg_rating, 4.5);
        assert_eq!(cardiology.patients, 1);
        assert_eq!(cardiology.doctors, 1);

        let top = stats.top_doctors(3).await.unwrap();
        assert_eq!(top[0].rating, 4.5);
        assert_eq!(top.len(), 2);

        let months = stats.monthly_admissions(2030, 3).await.unwrap();
        assert_eq!(months.len(), 3);
        assert_eq!(months[1].emergency, 1);
        assert_eq!(months[1].scheduled, 1);
        assert_eq!(months[0].emergency + months[0].scheduled, 0);

        let summary = doctors.find_by_id(cardio).await.unwrap().unwrap();
        assert_eq!(summary.patient_count, 1);
        assert_eq!(summary.average_rating, 4.5);
    }
}
