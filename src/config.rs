/// Configuration management for the GroupUser Service
///
/// Loads configuration from environment variables.
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// gRPC server settings
    pub server: ServerConfig,
    /// User-service resolver settings
    pub resolver: ResolverConfig,
    /// Postgres connection string. When unset the service falls back to
    /// the in-memory store (development only).
    pub database_url: Option<String>,
}

/// gRPC server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the GroupUser service listens on
    pub grpc_port: u16,
}

/// Settings for the User-service client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// User service endpoint, e.g. http://user-service:50055
    pub user_service_url: String,
    /// TTL for cached positive username/uid lookups
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            grpc_port: std::env::var("SERVER_GRPC_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50058),
        };

        let resolver = ResolverConfig {
            user_service_url: std::env::var("USER_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:50055".to_string()),
            cache_ttl_secs: std::env::var("RESOLVER_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        };

        Ok(Config {
            server,
            resolver,
            database_url: std::env::var("DATABASE_URL").ok(),
        })
    }
}
