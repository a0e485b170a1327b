//! Authentication module
//!
//! This module provides authentication functionality including:
//! - Login for administrators, doctors and patients
//! - Patient self-registration
//! - JWT token generation and validation
//! - Resolution of a token to its stored identity
//! - Password hashing and verification
//! - Authentication middleware

pub mod handlers;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use handlers::{get_me, login, register_patient};
pub use identity::{Identity, IdentityResolver, Role};
pub use jwt::{Claims, IssuedToken, TokenService};
pub use middleware::{authenticate, AuthUser};
pub use password::{hash_password, verify_password};
