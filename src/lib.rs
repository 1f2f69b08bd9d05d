//! Headless core of the StayMate admin console.
//!
//! The `data` feature holds what needs no backend: domain types, form
//! validation, view models and the page strip. The `client` feature adds the
//! REST client, the session gate and the per-screen controllers.

#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod pagination;

#[cfg(feature = "client")]
pub mod api;
#[cfg(feature = "client")]
mod error_conversions;
#[cfg(feature = "client")]
pub mod models;
#[cfg(feature = "client")]
pub mod services;
#[cfg(feature = "client")]
pub mod session;

/// Config file read by [`models::config::AdminConfig::load`] when no other
/// path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config/staymate-admin";
