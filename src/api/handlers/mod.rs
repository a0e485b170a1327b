pub mod appointments;
pub mod doctors;
pub mod feedback;
pub mod medications;
pub mod patients;
pub mod reminders;
pub mod statistics;
pub mod system;

pub use appointments::*;
pub use doctors::*;
pub use feedback::*;
pub use medications::*;
pub use patients::*;
pub use reminders::*;
pub use statistics::*;
pub use system::*;

use crate::auth::identity::IdentityResolver;
use crate::auth::jwt::TokenService;
use crate::auth::password::hash_password_blocking;
use crate::core::config::Config;
use crate::core::error::{CareError, Result};
use crate::core::notifier::Notifier;
use crate::db::manager::DatabaseManager;
use crate::db::repository::{
    AppointmentRepository, CredentialRepository, DoctorRepository, FeedbackRepository,
    MedicationRepository, PatientRepository, ReminderRepository, StatisticsRepository,
};
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: TokenService,
    pub resolver: IdentityResolver,
    /// Verified against when a login email matches no account
    pub dummy_hash: Arc<String>,
    pub credentials: Arc<CredentialRepository>,
    pub doctors: Arc<DoctorRepository>,
    pub patients: Arc<PatientRepository>,
    pub appointments: Arc<AppointmentRepository>,
    pub medications: Arc<MedicationRepository>,
    pub feedback: Arc<FeedbackRepository>,
    pub reminders: Arc<ReminderRepository>,
    pub statistics: Arc<StatisticsRepository>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Wire repositories and the token services over one database
    pub async fn new(
        config: Config,
        db: Arc<DatabaseManager>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let ttl = chrono::Duration::try_minutes(config.security.token_ttl_minutes).ok_or_else(|| {
            CareError::ConfigError(format!(
                "token_ttl_minutes out of range: {}",
                config.security.token_ttl_minutes
            ))
        })?;
        let tokens = TokenService::new(&config.security.jwt_secret, ttl);
        let credentials = Arc::new(CredentialRepository::new(db.clone()));
        let resolver = IdentityResolver::new(tokens.clone(), credentials.clone());

        let dummy_hash = hash_password_blocking(
            uuid::Uuid::new_v4().to_string(),
            config.security.bcrypt_cost,
        )
        .await?;

        Ok(Self {
            config: Arc::new(config),
            tokens,
            resolver,
            dummy_hash: Arc::new(dummy_hash),
            credentials,
            doctors: Arc::new(DoctorRepository::new(db.clone())),
            patients: Arc::new(PatientRepository::new(db.clone())),
            appointments: Arc::new(AppointmentRepository::new(db.clone())),
            medications: Arc::new(MedicationRepository::new(db.clone())),
            feedback: Arc::new(FeedbackRepository::new(db.clone())),
            reminders: Arc::new(ReminderRepository::new(db.clone())),
            statistics: Arc::new(StatisticsRepository::new(db)),
            notifier,
        })
    }
}
