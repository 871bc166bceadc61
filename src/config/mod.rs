use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::{CommissionError, Result};
use directories::ProjectDirs;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub zoho: ZohoConfig,
    #[serde(default)]
    pub commission: CommissionConfig,
}

/// Credentials and endpoints for the Zoho Books/Inventory APIs.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ZohoConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub organization_id: String,
    /// API base, e.g. https://www.zohoapis.com (use .eu/.in if applicable)
    #[serde(default = "default_api_domain")]
    pub api_domain: String,
    #[serde(default = "default_accounts_domain")]
    pub accounts_domain: String,
}

fn default_api_domain() -> String {
    "https://www.zohoapis.com".to_string()
}

fn default_accounts_domain() -> String {
    "https://accounts.zoho.com".to_string()
}

/// Commission settings. Rates are human percentages (8 means 8%).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CommissionConfig {
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    #[serde(default = "default_rate_vida")]
    pub rate_vida: f64,
    #[serde(default = "default_rate_otros")]
    pub rate_otros: f64,
    /// Tax percentage assumed when a line carries none.
    #[serde(default = "default_iva")]
    pub iva_default: f64,
}

fn default_manufacturer() -> String {
    "VIDA".to_string()
}

fn default_rate_vida() -> f64 {
    8.0
}

fn default_rate_otros() -> f64 {
    5.0
}

fn default_iva() -> f64 {
    15.0
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            manufacturer: default_manufacturer(),
            rate_vida: default_rate_vida(),
            rate_otros: default_rate_otros(),
            iva_default: default_iva(),
        }
    }
}

/// Get the config directory path (~/.comisiones/ or XDG config)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "comisiones") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        CommissionError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".comisiones"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Load the main config.toml
pub fn load_config(config_dir: &PathBuf) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(CommissionError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| CommissionError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[zoho]
# Self Client credentials from https://api-console.zoho.com/
client_id = "1000.XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX"
client_secret = "your-client-secret"
refresh_token = "1000.your-refresh-token"
organization_id = "123456789"
# api_domain = "https://www.zohoapis.com"        # .eu/.in if applicable
# accounts_domain = "https://accounts.zoho.com"

[commission]
manufacturer = "VIDA"   # distinguished manufacturer (earns rate_vida)
rate_vida = 8.0         # percent
rate_otros = 5.0        # percent, every other manufacturer
iva_default = 15.0      # tax percent assumed when a line carries none
"#;
