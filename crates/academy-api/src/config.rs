//! # Application Configuration
//!
//! Everything comes from environment variables (a `.env` file is loaded if
//! present). Missing database, gateway or mail settings are not errors: the
//! server starts in demo mode for whatever is absent.

use rand::RngCore;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Which store backend to wire up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, production)
    pub environment: String,
    /// Public site URL, used for password reset links
    pub frontend_url: String,
    /// Session token secret
    pub jwt_secret: String,
    /// True when `JWT_SECRET` was unset and a random secret was generated
    pub jwt_secret_generated: bool,
    pub store_backend: StoreBackend,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Explicit catalog override (`COURSE_CATALOG_PATH`)
    pub catalog_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (jwt_secret, jwt_secret_generated) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (random_secret(), true),
        };

        let store_backend = match get("STORE_BACKEND").as_deref() {
            Some(b) if b.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            _ => StoreBackend::Mongo,
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(5000),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            frontend_url: get("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            jwt_secret,
            jwt_secret_generated,
            store_backend,
            mongodb_uri: get("MONGODB_URI"),
            mongodb_database: get("MONGODB_DATABASE").unwrap_or_else(|| "academy".to_string()),
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
            catalog_path: get("COURSE_CATALOG_PATH").map(PathBuf::from),
            log_format,
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("frontend_url", &self.frontend_url)
            .field("store_backend", &self.store_backend)
            .field("mongodb_database", &self.mongodb_database)
            .field("catalog_path", &self.catalog_path)
            .finish_non_exhaustive()
    }
}

fn random_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.frontend_url, "http://localhost:8080");
        assert_eq!(config.store_backend, StoreBackend::Mongo);
        assert_eq!(config.mongodb_database, "academy");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.mongodb_uri.is_none());
        assert!(config.jwt_secret_generated);
        assert_eq!(config.jwt_secret.len(), 64);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "3000"),
            ("HOST", "0.0.0.0"),
            ("JWT_SECRET", "s3cret"),
            ("STORE_BACKEND", "memory"),
            ("LOG_FORMAT", "json"),
        ]);

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(config.jwt_secret, "s3cret");
        assert!(!config.jwt_secret_generated);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_bad_port_falls_back() {
        assert_eq!(config(&[("PORT", "eighty")]).port, 5000);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = config(&[("JWT_SECRET", "hunter2"), ("ADMIN_PASSWORD", "pw123")]);
        let debug = format!("{config:?}");

        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("pw123"));
    }
}
