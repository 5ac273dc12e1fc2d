use std::env;
use std::time::Duration;

use crate::prediction::poller::PollConfig;

// Model pinned by the filter pipeline on Replicate.
const DEFAULT_MODEL_VERSION: &str =
    "ad59ca21177f9e217b9075e7300cf6e14f7e5b4505b87b9689dbd866e9768969";

#[derive(Debug, Clone)]
pub struct ReplicateSettings {
    pub base_url: String,
    pub api_token: String,
    pub model_version: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_address: String,
    pub database_url: String,
    pub frontend_dir: String,
    pub integrations_url: String,
    pub replicate: ReplicateSettings,
    pub poll: PollConfig,
}

impl Settings {
    /// Gather configuration from the environment. Required variables
    /// (DATABASE_URL, REPLICATE_API_KEY, INTEGRATIONS_URL) panic when
    /// absent; the rest fall back to production defaults.
    pub fn from_env() -> Self {
        let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());

        let frontend_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
            format!("{}/../frontend/dist", manifest_dir)
        } else {
            "/usr/src/app/frontend/dist".to_string()
        };

        let interval_ms = env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(1000);
        let max_attempts = env::var("POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(30);

        Self {
            bind_address: format!("0.0.0.0:{}", port),
            database_url: env::var("DATABASE_URL").unwrap(),
            frontend_dir,
            integrations_url: env::var("INTEGRATIONS_URL").unwrap(),
            replicate: ReplicateSettings {
                base_url: env::var("REPLICATE_API_URL")
                    .unwrap_or_else(|_| "https://api.replicate.com".to_string()),
                api_token: env::var("REPLICATE_API_KEY").unwrap(),
                model_version: env::var("REPLICATE_MODEL_VERSION")
                    .unwrap_or_else(|_| DEFAULT_MODEL_VERSION.to_string()),
            },
            poll: PollConfig {
                interval: Duration::from_millis(interval_ms),
                max_attempts,
            },
        }
    }
}
