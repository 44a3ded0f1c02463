//! Central Configuration Constants
//!
//! Single source of truth for training and storage defaults.

/// Default training data file
pub const DEFAULT_DATA_FILE: &str = "data.csv";

/// Default model artifact path
pub const DEFAULT_MODEL_PATH: &str = "model.json";

/// Readings at or below this power are labeled normal
pub const DEFAULT_POWER_THRESHOLD: f64 = 6.0;

/// Trees in the forest
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Held-out fraction for evaluation
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Seed for split, bootstrap and feature sampling
pub const DEFAULT_SEED: u64 = 42;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "GridGuard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get data file path from environment or use default
pub fn get_data_file() -> String {
    std::env::var("DATA_FILE")
        .unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string())
}

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get power threshold from environment or use default
pub fn get_power_threshold() -> f64 {
    std::env::var("POWER_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_POWER_THRESHOLD)
}
