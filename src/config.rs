/// Configuration management for the Clinia service
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub email: Option<EmailConfig>,
    pub model: ModelConfig,
    pub quota: QuotaConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public base URL embedded in confirmation links
    pub public_url: Option<String>,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON collection documents
    pub data_directory: PathBuf,
}

/// Email (SMTP) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender_address: String,
    pub sender_password: String,
}

/// Prediction model and reference data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the pre-trained model artifact
    pub artifact: PathBuf,
    /// Path to the disease reference catalog
    pub disease_info: PathBuf,
}

/// Usage quota configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Predictions allowed per non-admin account before an admin reset
    pub prediction_limit: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("CLINIA_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("CLINIA_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| AppError::Validation("Invalid port number".to_string()))?;
        let public_url = env::var("CLINIA_PUBLIC_URL").ok();
        let version = env::var("CLINIA_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("CLINIA_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let email = if let Ok(smtp_host) = env::var("CLINIA_SMTP_HOST") {
            Some(EmailConfig {
                smtp_host,
                smtp_port: env::var("CLINIA_SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .unwrap_or(587),
                sender_address: env::var("CLINIA_SENDER_EMAIL")
                    .map_err(|_| AppError::Validation("Sender email required".to_string()))?,
                sender_password: env::var("CLINIA_SENDER_PASSWORD")
                    .map_err(|_| AppError::Validation("Sender password required".to_string()))?,
            })
        } else {
            None
        };

        let artifact = env::var("CLINIA_MODEL_ARTIFACT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./reference/model.json"));
        let disease_info = env::var("CLINIA_DISEASE_INFO")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./reference/disease_info.json"));

        let prediction_limit = env::var("CLINIA_PREDICTION_LIMIT")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                version,
            },
            storage: StorageConfig { data_directory },
            email,
            model: ModelConfig {
                artifact,
                disease_info,
            },
            quota: QuotaConfig { prediction_limit },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.service.hostname.is_empty() {
            return Err(AppError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.quota.prediction_limit == 0 {
            return Err(AppError::Validation(
                "Prediction limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
