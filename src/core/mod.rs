//! Core application module
//!
//! This module provides the cross-cutting pieces of the backend:
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system
//! - Outbound SMS notifications
//! - Input parsing helpers

pub mod config;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod utils;

pub use config::Config;
pub use error::{CareError, ErrorContext, ErrorResponse, Result};
pub use logging::Logger;
pub use notifier::{Delivery, Notifier, TwilioNotifier};
