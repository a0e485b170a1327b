//! Database module
//!
//! This module provides database management functionality including:
//! - Database connection pool management
//! - Repository pattern implementations
//! - Database migrations
//! - Data models and schemas
//! - Startup seeding

pub mod manager;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod seed;

pub use manager::DatabaseManager;
pub use models::{Identity, Role};
pub use repository::{
    AppointmentRepository, CredentialRepository, DoctorRepository, FeedbackRepository,
    MedicationRepository, PatientRepository, ReminderRepository, Repository, StatisticsRepository,
};
