use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::domain::ConnectDefaults;

pub const DEFAULT_HEARTBEAT_SECS: u64 = 15;
pub const DEFAULT_IDLE_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub heartbeat_interval: Duration,
    pub idle_threshold: Duration,
    /// JSON-RPC tool calls are refused until `initialize` has been seen.
    pub require_initialize: bool,
    /// Open a connection at start-up from `connection` defaults.
    pub autoconnect: bool,
    pub connection: ConnectDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            idle_threshold: Duration::from_secs(DEFAULT_IDLE_SECS),
            require_initialize: true,
            autoconnect: false,
            connection: ConnectDefaults::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    server: ServerSection,
    database: DatabaseSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSection {
    heartbeat_interval_secs: Option<u64>,
    idle_threshold_secs: Option<u64>,
    require_initialize: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatabaseSection {
    #[serde(flatten)]
    connection: ConnectDefaults,
    autoconnect: Option<bool>,
}

impl Config {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    /// Optional TOML file named by `MYSQL_MCP_CONFIG`, then the environment.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("MYSQL_MCP_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(Path::new(&path))?,
            _ => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: FileConfig = toml::from_str(content)?;
        let mut cfg = Self::default();
        if let Some(secs) = file.server.heartbeat_interval_secs {
            cfg.heartbeat_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.server.idle_threshold_secs {
            cfg.idle_threshold = Duration::from_secs(secs);
        }
        if let Some(v) = file.server.require_initialize {
            cfg.require_initialize = v;
        }
        if let Some(v) = file.database.autoconnect {
            cfg.autoconnect = v;
        }
        cfg.connection = file.database.connection;
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        if let Some(secs) = env_parse::<u64>("MYSQL_MCP_HEARTBEAT_SECS") {
            self.heartbeat_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("MYSQL_MCP_IDLE_SECS") {
            self.idle_threshold = Duration::from_secs(secs);
        }
        if let Some(v) = env_flag("MYSQL_MCP_REQUIRE_INIT") {
            self.require_initialize = v;
        }
        if let Some(v) = env_flag("MYSQL_AUTOCONNECT") {
            self.autoconnect = v;
        }

        let conn = &mut self.connection;
        if let Some(v) = env_string("MYSQL_HOST") {
            conn.host = Some(v);
        }
        if let Some(v) = env_parse::<u16>("MYSQL_PORT") {
            conn.port = Some(v);
        }
        if let Some(v) = env_string("MYSQL_USER") {
            conn.user = Some(v);
        }
        if let Some(v) = env_string("MYSQL_PASSWORD") {
            conn.password = Some(v);
        }
        if let Some(v) = env_string("MYSQL_DATABASE") {
            conn.database = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.heartbeat_interval.is_zero() {
            return Err("heartbeat interval cannot be 0".into());
        }
        if self.idle_threshold.is_zero() {
            return Err("idle threshold cannot be 0".into());
        }
        if self.autoconnect && !self.connection.is_complete() {
            return Err("autoconnect requires MYSQL_HOST and MYSQL_USER".into());
        }
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key = key, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env_string(key)
        .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
}
