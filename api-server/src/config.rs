//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Maximum artifacts accepted per batch request
    pub max_batch_size: usize,

    /// Optional JSON file with baseline overrides, applied at startup
    pub baseline_overrides_path: Option<String>,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8090),

            max_batch_size: env::var("MAX_BATCH_SIZE")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(100),

            baseline_overrides_path: env::var("BASELINE_OVERRIDES").ok(),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
