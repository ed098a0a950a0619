//! Server configuration

use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// PostgreSQL connection URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HS256 secret shared with the admin session provider
    pub admin_jwt_secret: String,
    /// Root directory of the local blob store
    pub storage_dir: PathBuf,
    /// Public base URL under which blobs are served
    pub public_assets_url: String,
    /// Timezone used for "today" and date-only filters
    pub business_timezone: Tz,
    /// Deadline for each storage call
    pub request_timeout: Duration,
    /// Retries for idempotent reads
    pub retry_max_attempts: u32,
    pub retry_initial_delay: Duration,
    pub retry_max_delay: Duration,
    /// Enforce the order status transition table
    pub strict_status_transitions: bool,
    /// Vendor session lifetime; `None` keeps sessions until logout
    pub vendor_session_ttl: Option<Duration>,
    /// Unit price seeded into the settings row
    pub default_pastel_price_cents: i64,
    /// Log level / filter when RUST_LOG is unset
    pub log_level: String,
    /// JSON log output
    pub log_json: bool,
    /// Optional directory for daily rolling log files
    pub log_dir: Option<String>,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        match env_opt(name) {
            Some(v) => Ok(v),
            None if environment == "development" => Ok(format!("dev-{name}-not-for-production")),
            None => Err(format!("{name} must be set in {environment} environment").into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = env_opt("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let database_url = env_opt("DATABASE_URL");
        if database_url.is_none() && environment != "development" {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        let business_timezone = match env_opt("BUSINESS_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| format!("BUSINESS_TIMEZONE: {e}"))?,
            None => chrono_tz::America::Sao_Paulo,
        };

        let http_port = env_or("HTTP_PORT", 3000u16);

        Ok(Self {
            admin_jwt_secret: Self::require_secret("ADMIN_JWT_SECRET", &environment)?,
            environment,
            http_port,
            database_url,
            storage_dir: env_opt("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/public-assets")),
            public_assets_url: env_opt("PUBLIC_ASSETS_URL")
                .unwrap_or_else(|| format!("http://localhost:{http_port}/assets")),
            business_timezone,
            request_timeout: Duration::from_millis(env_or("REQUEST_TIMEOUT_MS", 30_000)),
            retry_max_attempts: env_or("RETRY_MAX_ATTEMPTS", 3),
            retry_initial_delay: Duration::from_millis(env_or("RETRY_INITIAL_DELAY_MS", 1_000)),
            retry_max_delay: Duration::from_millis(env_or("RETRY_MAX_DELAY_MS", 10_000)),
            strict_status_transitions: env_or("STRICT_STATUS_TRANSITIONS", false),
            vendor_session_ttl: env_opt("VENDOR_SESSION_TTL_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs),
            default_pastel_price_cents: env_or(
                "DEFAULT_PASTEL_PRICE_CENTS",
                shared::models::DEFAULT_PASTEL_PRICE_CENTS,
            ),
            log_level: env_opt("LOG_LEVEL")
                .unwrap_or_else(|| "pastel_server=info,tower_http=info".into()),
            log_json: env_opt("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            log_dir: env_opt("LOG_DIR"),
        })
    }

    /// Defaults for tests and local tooling: in-memory store, no retries.
    pub fn for_tests(storage_dir: PathBuf) -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            database_url: None,
            admin_jwt_secret: "test-admin-secret".into(),
            storage_dir,
            public_assets_url: "http://localhost/assets".into(),
            business_timezone: chrono_tz::America::Sao_Paulo,
            request_timeout: Duration::from_secs(5),
            retry_max_attempts: 0,
            retry_initial_delay: Duration::from_millis(1),
            retry_max_delay: Duration::from_millis(5),
            strict_status_transitions: false,
            vendor_session_ttl: None,
            default_pastel_price_cents: shared::models::DEFAULT_PASTEL_PRICE_CENTS,
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
