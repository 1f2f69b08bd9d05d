//! Domain entities mirrored from the backend, plus constrained value objects.

pub mod kyc;
pub mod location;
pub mod question;
pub mod session;
pub mod types;
pub mod user;
