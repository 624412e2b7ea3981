//! Configuration management.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the per-directory config file.
pub const CONFIG_FILE_NAME: &str = ".vita.toml";

/// Configuration structure that matches the TOML file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    worker: WorkerConfig,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_port")]
    port: u16,
    /// Path of the MCP endpoint
    #[serde(default = "default_path")]
    path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkerConfig {
    #[serde(default = "default_worker_url")]
    url: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            url: default_worker_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionConfig {
    /// Idle seconds before a session is closed, 0 disables
    #[serde(default = "default_session_timeout")]
    timeout: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: default_session_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    /// If not set, uses RUST_LOG environment variable or defaults to "info"
    level: Option<String>,
}

fn default_port() -> u16 {
    vita_types::DEFAULT_PORT
}

fn default_path() -> String {
    vita_types::DEFAULT_MCP_PATH.to_string()
}

fn default_worker_url() -> String {
    vita_types::DEFAULT_WORKER_URL.to_string()
}

fn default_session_timeout() -> u64 {
    30 * 60
}

/// Application configuration. Resolved once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Port to listen on
    pub port: u16,
    /// Path of the MCP Streamable HTTP endpoint
    pub mcp_path: String,
    /// Base URL of the VITA worker API
    pub worker_url: String,
    /// Idle time after which a session is closed; `None` keeps sessions forever
    pub session_timeout: Option<Duration>,
    /// Log level (if set, used when RUST_LOG is absent)
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with full priority chain:
    /// CLI args > legacy env vars > `VITA_*` env vars > `.vita.toml` > defaults.
    pub fn from_figment(
        port: Option<u16>,
        worker_url: Option<String>,
        mcp_path: Option<String>,
        session_timeout: Option<u64>,
        log_level: Option<String>,
    ) -> anyhow::Result<Self> {
        let local_config = std::env::current_dir()
            .ok()
            .map(|d| d.join(CONFIG_FILE_NAME));

        // 1. Start with defaults
        let mut figment = Figment::new().merge(Serialized::defaults(ConfigFile {
            server: ServerConfig::default(),
            worker: WorkerConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }));

        // 2. Merge local config file if it exists
        if let Some(ref path) = local_config {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // 3. Merge environment variables (VITA_* prefix)
        figment = figment.merge(
            Env::prefixed("VITA_")
                .map(|key| key.as_str().replace("__", ".").into())
                .split("_"),
        );

        // 4. Merge the unprefixed variables the service has always honored
        figment = figment
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .merge(
                Env::raw()
                    .only(&["VITA_CLOUD_URL"])
                    .map(|_| "worker.url".into()),
            );

        // 5. Merge CLI arguments (highest priority)
        if let Some(p) = port {
            figment = figment.merge(Serialized::default("server.port", p));
        }
        if let Some(ref url) = worker_url {
            figment = figment.merge(Serialized::default("worker.url", url));
        }
        if let Some(ref path) = mcp_path {
            figment = figment.merge(Serialized::default("server.path", path));
        }
        if let Some(secs) = session_timeout {
            figment = figment.merge(Serialized::default("session.timeout", secs));
        }
        if let Some(ref level) = log_level {
            figment = figment.merge(Serialized::default("logging.level", level));
        }

        let config_file: ConfigFile = figment.extract()?;
        Self::from_file(config_file)
    }

    fn from_file(file: ConfigFile) -> anyhow::Result<Self> {
        let path = &file.server.path;
        if !path.starts_with('/') {
            anyhow::bail!("server.path must start with '/', got {:?}", path);
        }
        if path == "/health" {
            anyhow::bail!("server.path {:?} is reserved for the health check", path);
        }
        let capture = path.contains(['{', '}'])
            || path.split('/').any(|seg| seg.starts_with([':', '*']));
        if capture {
            anyhow::bail!("server.path must be a literal path, got {:?}", path);
        }
        Ok(Self {
            port: file.server.port,
            mcp_path: file.server.path,
            worker_url: file.worker.url,
            session_timeout: match file.session.timeout {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            log_level: file.logging.level,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            mcp_path: default_path(),
            worker_url: default_worker_url(),
            session_timeout: Some(Duration::from_secs(default_session_timeout())),
            log_level: None,
        }
    }
}
