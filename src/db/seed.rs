//! Startup data: feedback categories and the first administrator

use crate::auth::password::hash_password_blocking;
use crate::core::config::BootstrapConfig;
use crate::core::error::Result;
use crate::core::utils::normalize_email;
use crate::db::repository::{CredentialRepository, FeedbackRepository};

pub const DEFAULT_FEEDBACK_CATEGORIES: [&str; 6] = [
    "Service Quality",
    "Doctor Consultation",
    "Wait Time",
    "Staff Behavior",
    "Facilities",
    "Overall Experience",
];

/// Insert the default feedback categories into an empty table
pub async fn seed_feedback_categories(feedback: &FeedbackRepository) -> Result<usize> {
    let inserted = feedback.seed_categories(&DEFAULT_FEEDBACK_CATEGORIES).await?;
    if inserted > 0 {
        tracing::info!(count = inserted, "Seeded feedback categories");
    }
    Ok(inserted)
}

/// Create the configured administrator when no administrator exists yet.
/// Returns the new admin's id, or `None` when nothing was created.
pub async fn ensure_admin(
    credentials: &CredentialRepository,
    bootstrap: &BootstrapConfig,
    bcrypt_cost: u32,
) -> Result<Option<i64>> {
    let (email, password) = match (&bootstrap.admin_email, &bootstrap.admin_password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            if credentials.admin_count().await? == 0 {
                tracing::warn!("No administrator exists and none is configured for bootstrap");
            }
            return Ok(None);
        }
    };

    if credentials.admin_count().await? > 0 {
        return Ok(None);
    }

    let email = normalize_email(email)?;
    let password_hash = hash_password_blocking(password.clone(), bcrypt_cost).await?;
    let id = credentials
        .create_admin(&email, &password_hash, bootstrap.admin_name.clone())
        .await?;

    tracing::info!(admin_id = id, email = %email, "Bootstrap administrator created");
    Ok(Some(id))
}
