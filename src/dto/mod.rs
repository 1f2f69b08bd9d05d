//! View models that bridge services with whatever renders the console.

pub mod kyc;
pub mod locations;
pub mod questions;
pub mod tags;
pub mod users;
