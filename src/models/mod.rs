//! Settings models loaded from files and the environment.

pub mod config;
