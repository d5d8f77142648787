use std::env;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dotenvy::dotenv;
use rand::Rng;
use tracing::warn;

use crate::constants::{DEFAULT_SESSION_TTL_SECS, DEFAULT_UPSTREAM_TIMEOUT_SECS};

/// CORS configuration mode
#[derive(Debug, Clone)]
pub enum CorsMode {
    /// Only allow localhost origins (default, for local development)
    LocalhostOnly,
    /// Allow all origins
    AllowAll,
    /// Allow specific origins (comma-separated list)
    AllowList(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Origin of the upstream management API, without a trailing slash
    pub upstream_url: String,
    pub session_secret: String,
    pub session_ttl_secs: u64,
    /// Development mode: forwarding failures are logged with context
    pub dev_mode: bool,
    pub upstream_timeout: Duration,
    pub cors_mode: CorsMode,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let host = env::var("BFF_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("BFF_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);

        let upstream_url = env::var("BFF_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let session_secret = match env::var("BFF_SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("BFF_SESSION_SECRET not set, sessions will not survive a restart");
                generate_secret()
            }
        };

        let session_ttl_secs = env::var("BFF_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        let dev_mode = env::var("BFF_DEV_MODE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let upstream_timeout = Duration::from_secs(
            env::var("BFF_UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        );

        // CORS configuration: "localhost" (default), "*" (allow all), or comma-separated origins
        let cors_mode = match env::var("BFF_CORS_ORIGINS").as_deref() {
            Ok("*") => CorsMode::AllowAll,
            Ok(origins) if !origins.is_empty() && origins != "localhost" => {
                CorsMode::AllowList(origins.split(',').map(|s| s.trim().to_string()).collect())
            }
            _ => CorsMode::LocalhostOnly,
        };

        Self {
            host,
            port,
            upstream_url,
            session_secret,
            session_ttl_secs,
            dev_mode,
            upstream_timeout,
            cors_mode,
        }
    }

    /// Cookies carry the Secure flag unless we are bound to loopback
    pub fn secure_cookies(&self) -> bool {
        !is_loopback(&self.host)
    }
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "127.0.0.1" | "localhost" | "::1")
}

fn generate_secret() -> String {
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
impl Config {
    /// Configuration pointing at a local test upstream
    pub fn for_upstream(upstream_url: &str) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            upstream_url: upstream_url.trim_end_matches('/').to_string(),
            session_secret: "test-secret".to_string(),
            session_ttl_secs: 3600,
            dev_mode: true,
            upstream_timeout: Duration::from_secs(5),
            cors_mode: CorsMode::LocalhostOnly,
        }
    }
}
