/// Service configuration loader - parses service.toml
///
/// Separates the HTTP listen address from code so a deployment can move
/// the service to another port without recompiling. Unlike the database
/// connection (which is mandatory), local config is optional: a missing
/// service.toml falls back to built-in defaults.

use serde::Deserialize;
use std::fs;

/// HTTP server settings loaded from service.toml
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Loads service configuration from service.toml in the current working
/// directory, falling back to defaults when the file is absent.
///
/// # Panics
/// Panics if the file exists but is malformed — a present-but-broken
/// config is a deployment mistake that should not be papered over.
pub fn load_config() -> ServiceConfig {
    let config_path = "service.toml";

    match fs::read_to_string(config_path) {
        Ok(contents) => toml::from_str(&contents)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", config_path, e)),
        Err(_) => ServiceConfig::default(),
    }
}
