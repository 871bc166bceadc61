use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommissionError {
    #[error("Config directory not found at {0}. Run 'comisiones init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Missing Zoho credential '{0}' in config.toml")]
    MissingCredential(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Failed to refresh Zoho access token: {0}")]
    TokenRefresh(String),

    #[error("Unexpected response from Zoho {endpoint}: {detail}")]
    Api { endpoint: String, detail: String },

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid rate '{0}'. Expected a percentage between 0 and 100.")]
    InvalidRate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CommissionError>;
