use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use gerbil_application::ReportExecutionMode;
use gerbil_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Storage adapter selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local maps, lost on restart.
    Memory,
    /// PostgreSQL through a pooled connection.
    Postgres,
}

impl StorageBackend {
    /// Returns the stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(AppError::Validation(format!(
                "STORAGE_BACKEND must be either 'memory' or 'postgres', got '{value}'"
            ))),
        }
    }
}

/// Runtime configuration of the API process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Apply migrations and exit.
    pub migrate_only: bool,
    /// Bind host.
    pub api_host: String,
    /// Bind port.
    pub api_port: u16,
    /// Origin allowed by CORS.
    pub frontend_url: String,
    /// Selected storage adapter.
    pub storage_backend: StorageBackend,
    /// Postgres connection string.
    pub database_url: Option<String>,
    /// Where report jobs are rendered.
    pub report_execution_mode: ReportExecutionMode,
    /// Bearer secret of the internal worker routes. Unset disables them.
    pub worker_shared_secret: Option<String>,
    /// Automation hook base URL. Unset logs events instead.
    pub webhook_url: Option<String>,
    /// Prefix of report download links. Empty yields relative links.
    pub public_base_url: String,
}

impl ApiConfig {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = optional("API_PORT")
            .map(|value| {
                value.parse::<u16>().map_err(|error| {
                    AppError::Validation(format!("invalid API_PORT '{value}': {error}"))
                })
            })
            .transpose()?
            .unwrap_or(3001);
        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());

        let database_url = optional("DATABASE_URL");
        let storage_backend = match optional("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None if database_url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        };
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required when STORAGE_BACKEND is 'postgres'".to_owned(),
            ));
        }
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to apply migrations".to_owned(),
            ));
        }

        let report_execution_mode = optional("REPORT_EXECUTION_MODE")
            .map(|value| value.parse::<ReportExecutionMode>())
            .transpose()?
            .unwrap_or_default();

        let webhook_url = optional("N8N_WEBHOOK_URL")
            .map(|value| {
                Url::parse(&value)
                    .map(|_| value.clone())
                    .map_err(|error| AppError::Validation(format!("invalid N8N_WEBHOOK_URL: {error}")))
            })
            .transpose()?;

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            frontend_url,
            storage_backend,
            database_url,
            report_execution_mode,
            worker_shared_secret: optional("WORKER_SHARED_SECRET"),
            webhook_url,
            public_base_url: optional("API_PUBLIC_URL").unwrap_or_default(),
        })
    }

    /// Configuration for an in-process API over in-memory storage.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            migrate_only: false,
            api_host: "127.0.0.1".to_owned(),
            api_port: 0,
            frontend_url: "http://localhost:3000".to_owned(),
            storage_backend: StorageBackend::Memory,
            database_url: None,
            report_execution_mode: ReportExecutionMode::Inline,
            worker_shared_secret: None,
            webhook_url: None,
            public_base_url: String::new(),
        }
    }

    /// Returns the bind address.
    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
