//! Agency site server.
//!
//! Serves the site's form endpoints behind the request-admission layer:
//! - bot user-agent filtering and per-IP rate limiting
//! - honeypot and fill-time checks on submissions
//! - sanitized transactional email via the configured provider
//! - booking handoff to the external scheduling page

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use api::{middleware::rate_limit::RateLimitConfig, router, AppState};
use integrations::{
    mailer_from_config, EmailConfig, SchedulingClient, SchedulingConfig, SchedulingSource,
};
use telemetry::{health, init_tracing_from_env};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Pre-built site to serve for non-API paths
    #[serde(default)]
    static_dir: Option<String>,

    /// `NODE_ENV` value, "development" or "production"
    #[serde(default = "default_environment")]
    environment: String,

    /// Set when deployed on a serverless host (`VERCEL`)
    #[serde(default)]
    serverless: bool,

    #[serde(default)]
    rate_limits: RateLimits,

    #[serde(default)]
    email: EmailConfig,

    #[serde(default)]
    scheduling: SchedulingConfig,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct RateLimits {
    #[serde(default = "RateLimitConfig::edge")]
    edge: RateLimitConfig,
    #[serde(default = "RateLimitConfig::form")]
    form: RateLimitConfig,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            edge: RateLimitConfig::edge(),
            form: RateLimitConfig::form(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            environment: default_environment(),
            serverless: false,
            rate_limits: RateLimits::default(),
            email: EmailConfig::default(),
            scheduling: SchedulingConfig::default(),
        }
    }
}

impl Config {
    fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting agency site v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        environment = %config.environment,
        serverless = config.serverless,
        edge_limit = config.rate_limits.edge.max_requests,
        form_limit = config.rate_limits.form.max_requests,
        "Loaded configuration"
    );

    // One mail client for the whole process
    let mailer = mailer_from_config(&config.email).context("Failed to create mailer")?;
    if mailer.delivers() {
        health().mailer.set_healthy();
    } else {
        health().mailer.set_unhealthy("No email provider configured");
        if config.is_production() {
            warn!("Running in production without an email provider");
        }
    }

    let scheduling = SchedulingClient::resolve(&config.scheduling)
        .await
        .context("Failed to configure scheduling")?;
    match scheduling.source() {
        SchedulingSource::Fallback { reason } => health()
            .scheduling
            .set_unhealthy(format!("Scheduling URL lookup failed: {}", reason)),
        _ => health().scheduling.set_healthy(),
    }

    let state = AppState::new(mailer, scheduling, config.email.clone())
        .with_rate_limits(config.rate_limits.edge.clone(), config.rate_limits.form.clone())
        .with_serverless(config.serverless)
        .with_static_dir(config.static_dir.as_ref().map(PathBuf::from));

    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();
    info!("Started rate limiter cleanup task");

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    health().mark_ready();
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables, e.g. SITE__EMAIL__FROM
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("SITE")
                .prefix_separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Conventional deployment variables, set by the hosting platform
    if let Ok(key) = std::env::var("RESEND_API_KEY") {
        config.email.api_key = Some(key);
    }
    if let Ok(key) = std::env::var("CALENDLY_API_KEY") {
        config.scheduling.api_key = Some(key);
    }
    if let Ok(vercel) = std::env::var("VERCEL") {
        config.serverless = !vercel.is_empty() && vercel != "0";
    }
    if let Ok(env) = std::env::var("NODE_ENV") {
        config.environment = env;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.port = port.parse().context("PORT must be a number")?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
