//! Configuration module

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use gridguard_core::constants;

/// Which endpoints this process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    /// Predictor and ingestion routes together
    #[default]
    All,
    /// `/api/analyse`, `/api/latest`, `/detect-theft/`
    Predictor,
    /// `/collect-data/`, `/api/store-data`
    Ingestion,
}

impl ServiceRole {
    pub fn includes_predictor(&self) -> bool {
        matches!(self, ServiceRole::All | ServiceRole::Predictor)
    }

    pub fn includes_ingestion(&self) -> bool {
        matches!(self, ServiceRole::All | ServiceRole::Ingestion)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRole::All => "all",
            ServiceRole::Predictor => "predictor",
            ServiceRole::Ingestion => "ingestion",
        }
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ServiceRole::All),
            "predictor" => Ok(ServiceRole::Predictor),
            "ingestion" => Ok(ServiceRole::Ingestion),
            other => Err(format!("unknown service role: {}", other)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Training data CSV appended by the ingestion routes
    pub data_file: String,

    /// Model artifact loaded once at startup by the predictor routes
    pub model_path: String,

    /// Mounted route groups
    pub role: ServiceRole,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            data_file: constants::DEFAULT_DATA_FILE.to_string(),
            model_path: constants::DEFAULT_MODEL_PATH.to_string(),
            role: ServiceRole::All,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            data_file: constants::get_data_file(),

            model_path: constants::get_model_path(),

            role: env::var("SERVICE_ROLE")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or_default(),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("predictor".parse::<ServiceRole>(), Ok(ServiceRole::Predictor));
        assert_eq!(" Ingestion ".parse::<ServiceRole>(), Ok(ServiceRole::Ingestion));
        assert!("worker".parse::<ServiceRole>().is_err());
    }

    #[test]
    fn test_role_routes() {
        assert!(ServiceRole::All.includes_predictor() && ServiceRole::All.includes_ingestion());
        assert!(!ServiceRole::Predictor.includes_ingestion());
        assert!(!ServiceRole::Ingestion.includes_predictor());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.model_path, "model.json");
        assert!(!config.is_production());
    }
}
