use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const HTTP_ADDR_VAR: &str = "QUEUE_DESK_HTTP_ADDR";
pub const EXPORT_DIR_VAR: &str = "QUEUE_DESK_EXPORT_DIR";
pub const STORE_VAR: &str = "QUEUE_DESK_STORE";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

/// Runtime settings shared by the `cli` and `http` binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub http_addr: SocketAddr,
    /// Directory receiving CSV downloads.
    pub export_dir: PathBuf,
    /// SQLite file holding the exclusion scopes, if persistence is wanted.
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    var: &'static str,
    value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value '{}' for {}", self.value, self.var)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup(HTTP_ADDR_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = raw_addr.trim().parse().map_err(|_| ConfigError {
            var: HTTP_ADDR_VAR,
            value: raw_addr.clone(),
        })?;

        let export_dir = lookup(EXPORT_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let store_path = lookup(STORE_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            http_addr,
            export_dir,
            store_path,
        })
    }
}

/// Installs the `env_logger` backend, filtered by `RUST_LOG` and defaulting to `info`.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
