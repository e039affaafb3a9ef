use anyhow::{Context, Result};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::RwLock;

use crate::flow::{ACCEPTED_DEMO_CODES, MAX_VERIFY_ATTEMPTS, MIN_PASSWORD_LENGTH, RESEND_COOLDOWN_SECS};

/// Persistence configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// Path to the JSON file holding cross-session flow state
    pub path: String,
}

/// Verification flow configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlowConfig {
    /// Seconds before a verification code can be resent
    pub resend_cooldown_secs: u64,
    /// Failed verifications allowed before a new code must be requested
    pub max_verify_attempts: u32,
    /// Minimum password length
    pub min_password_length: usize,
    /// Codes the demo verifier accepts (the prototype has no real issuance)
    pub accepted_codes: Vec<String>,
}

/// Global application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Application version
    pub version: String,
    /// Persistence configuration
    pub store: StoreConfig,
    /// Verification flow configuration
    pub flow: FlowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Servolle Password Reset".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: StoreConfig {
                path: "data/reset_state.json".to_string(),
            },
            flow: FlowConfig {
                resend_cooldown_secs: RESEND_COOLDOWN_SECS,
                max_verify_attempts: MAX_VERIFY_ATTEMPTS,
                min_password_length: MIN_PASSWORD_LENGTH,
                accepted_codes: ACCEPTED_DEMO_CODES.iter().map(|c| c.to_string()).collect(),
            },
        }
    }
}

// Global configuration instance
lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::default());
}

/// Load configuration from file
pub fn load_config(path: &str) -> Result<()> {
    // Check if file exists
    if !Path::new(path).exists() {
        // If not, create default config and save it
        let default_config = Config::default();
        save_config(path, &default_config)?;
        *CONFIG.write().unwrap() = default_config;
        return Ok(());
    }

    // Read the config file
    let mut file = File::open(path).context(format!("Failed to open config file: {}", path))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).context("Failed to read config file")?;

    // Parse the config file
    let config: Config = match path.ends_with(".toml") {
        true => toml::from_str(&contents).context("Failed to parse TOML config")?,
        false => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
    };

    // Update the global config
    *CONFIG.write().unwrap() = config;

    Ok(())
}

/// Save configuration to file
pub fn save_config(path: &str, config: &Config) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
    }

    // Serialize the config
    let serialized = match path.ends_with(".toml") {
        true => toml::to_string_pretty(config).context("Failed to serialize config to TOML")?,
        false => serde_json::to_string_pretty(config).context("Failed to serialize config to JSON")?,
    };

    // Write to file
    std::fs::write(path, serialized).context(format!("Failed to write config to file: {}", path))?;

    Ok(())
}

/// Get a reference to the current config
pub fn get_config() -> Config {
    CONFIG.read().unwrap().clone()
}

/// Update the current config
pub fn update_config(config: Config) -> Result<()> {
    *CONFIG.write().unwrap() = config;
    Ok(())
}
