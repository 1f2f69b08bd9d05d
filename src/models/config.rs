//! Configuration model loaded from external sources.

use std::path::PathBuf;

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variable prefix, e.g. `STAYMATE_ADMIN__API_URL`.
pub const ENV_PREFIX: &str = "STAYMATE_ADMIN";

fn default_api_url() -> String {
    "http://localhost:3000/".to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from("staymate-admin-session.json")
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_users_page_size() -> usize {
    20
}

fn default_page_size() -> usize {
    10
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
/// Settings of the console core.
pub struct AdminConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_users_page_size")]
    pub users_page_size: usize,
    #[serde(default = "default_page_size")]
    pub kyc_page_size: usize,
    #[serde(default = "default_page_size")]
    pub locations_page_size: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session_file: default_session_file(),
            request_timeout_secs: default_request_timeout_secs(),
            users_page_size: default_users_page_size(),
            kyc_page_size: default_page_size(),
            locations_page_size: default_page_size(),
        }
    }
}

impl AdminConfig {
    /// Layers an optional YAML file under `STAYMATE_ADMIN__*` variables.
    pub fn load(file: &str) -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(file).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("__")
                        .separator("__"),
                ),
        )
    }

    fn from_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = AdminConfig::load("does/not/exist").unwrap();

        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.users_page_size, 20);
        assert_eq!(config.kyc_page_size, 10);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "api_url: https://api.staymate.test/\nkyc_page_size: 25").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = AdminConfig::load(&path).unwrap();

        assert_eq!(config.api_url, "https://api.staymate.test/");
        assert_eq!(config.kyc_page_size, 25);
        assert_eq!(config.locations_page_size, 10);
    }

    #[test]
    fn explicit_sources_are_deserialised() {
        let config = AdminConfig::from_builder(
            Config::builder()
                .set_default("session_file", "/tmp/admin.json")
                .unwrap(),
        )
        .unwrap();

        assert_eq!(config.session_file, PathBuf::from("/tmp/admin.json"));
        assert_eq!(config.api_url, AdminConfig::default().api_url);
    }
}
