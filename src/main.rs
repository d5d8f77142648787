mod config;
mod constants;
mod error;
mod forward;
mod routes;
mod session;
#[cfg(test)]
mod test_support;

use axum::ServiceExt;
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use config::{Config, CorsMode};
use constants::MAX_UPSTREAM_REDIRECTS;
use error::BffError;
use reqwest::{Client, redirect};
use session::SessionCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");
pub const BUILD_TIME: &str = env!("BUILD_TIME");

pub struct AppState {
    pub config: Config,
    /// Shared upstream client; follows redirects, never retries
    pub http_client: Client,
    pub sessions: SessionCodec,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, BffError> {
        let http_client = Client::builder()
            .timeout(config.upstream_timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(redirect::Policy::limited(MAX_UPSTREAM_REDIRECTS))
            .build()?;
        let sessions = SessionCodec::new(&config.session_secret, config.session_ttl_secs);

        Ok(Self {
            config,
            http_client,
            sessions,
        })
    }
}

#[derive(Parser)]
#[command(name = "gateway-admin-bff")]
#[command(about = "Backend-for-frontend for the AI gateway admin dashboard")]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, env = "BFF_HOST")]
    host: Option<String>,

    /// Port to bind to
    #[arg(short, long, env = "BFF_PORT")]
    port: Option<u16>,
}

fn cors_layer(mode: &CorsMode) -> CorsLayer {
    let mode = mode.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let Ok(origin_str) = origin.to_str() else {
                return false;
            };

            match &mode {
                CorsMode::AllowAll => true,
                CorsMode::LocalhostOnly => {
                    let Ok(url) = url::Url::parse(origin_str) else {
                        return false;
                    };
                    matches!(
                        url.host_str(),
                        Some("localhost") | Some("127.0.0.1") | Some("[::1]")
                    )
                }
                CorsMode::AllowList(allowed) => allowed.iter().any(|a| a == origin_str),
            }
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if config.dev_mode {
        tracing::warn!("Development mode: forwarding failures are logged with request context");
    }
    match &config.cors_mode {
        CorsMode::AllowAll => info!("CORS: Allowing all origins"),
        CorsMode::LocalhostOnly => info!("CORS: Localhost only"),
        CorsMode::AllowList(list) => info!("CORS: Allowing origins: {:?}", list),
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");
    let cors = cors_layer(&config.cors_mode);
    let upstream_url = config.upstream_url.clone();

    let state = Arc::new(AppState::new(config).expect("Failed to create HTTP client"));
    let app = NormalizePath::trim_trailing_slash(routes::router(state).layer(cors));

    info!(
        "Starting {} v{}-{} (built {})",
        NAME, VERSION, GIT_HASH, BUILD_TIME
    );
    info!("Forwarding to {}", upstream_url);
    info!("Listening on http://{}", addr);
    info!("API docs: http://{}/swagger", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        ServiceExt::<axum::extract::Request>::into_make_service(app),
    )
    .await
    .expect("Server error");
}
