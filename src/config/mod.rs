//! Gateway configuration
//!
//! Everything comes from the environment (a `.env` file is honoured via
//! `dotenvy` in the binary). The state files themselves are produced by the
//! external infrastructure scan tool; only their location is configured here.

use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Redis connection URL
    pub redis_url: String,
    /// Path to the infrastructure state document
    pub state_file: PathBuf,
    /// Path to the state document checksum file
    pub checksum_file: PathBuf,
    /// API key for the Google-native dialect and the judge models
    pub google_api_key: Option<String>,
    /// Model id advertised on `/v1/models` and used as the request default
    pub virtual_model: String,
}

impl Config {
    /// Load configuration from the environment
    pub fn from_env() -> Self {
        let host = std::env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("GATEWAY_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| {
            let redis_host =
                std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
            let redis_port = std::env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
            format!("redis://{}:{}", redis_host, redis_port)
        });

        let state_dir =
            PathBuf::from(std::env::var("STATE_DIR").unwrap_or_else(|_| "infrastructure".into()));

        Self {
            server: ServerConfig { host, port },
            redis_url,
            state_file: state_dir.join("state.json"),
            checksum_file: state_dir.join("state.json.checksum"),
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            virtual_model: "qwen-max".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            redis_url: "redis://localhost:6379".to_string(),
            state_file: PathBuf::from("infrastructure/state.json"),
            checksum_file: PathBuf::from("infrastructure/state.json.checksum"),
            google_api_key: None,
            virtual_model: "qwen-max".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_follow_state_dir_layout() {
        let config = Config::default();
        assert_eq!(config.state_file, PathBuf::from("infrastructure/state.json"));
        assert_eq!(
            config.checksum_file,
            PathBuf::from("infrastructure/state.json.checksum")
        );
        assert_eq!(config.virtual_model, "qwen-max");
    }
}
