use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`ServerConfig::bind_address`].
pub const ENV_BIND: &str = "PNG_COMMENT_BIND";
/// Environment variable overriding [`ServerConfig::port`].
pub const ENV_PORT: &str = "PNG_COMMENT_PORT";

/// Top-level configuration for the png-comment server.
///
/// # Loading
///
/// ```rust,no_run
/// use png_comment::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.server.port = 9000;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener and routing settings.
    pub server: ServerConfig,
}

/// HTTP listener and routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_address: String,
    pub port: u16,
    /// Path prefix the routes are mounted under, e.g. `/api/images`. Empty mounts at `/`.
    pub route_prefix: String,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Reject settings the listener or router cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.bind_address.trim().is_empty() {
            anyhow::bail!("server.bind_address must not be empty");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("server.max_body_bytes must be greater than zero");
        }
        if self.route_prefix.contains(char::is_whitespace) {
            anyhow::bail!(
                "server.route_prefix must not contain whitespace: {:?}",
                self.route_prefix
            );
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            route_prefix: "/api/images".to_string(),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Default config location: `config.json` beside the server binary.
    pub fn config_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Cannot locate the server executable")?;
        exe.parent()
            .map(|dir| dir.join("config.json"))
            .context("Server executable has no parent directory")
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        path.map_or_else(Self::config_path, |p| Ok(p.to_path_buf()))
    }

    /// Read and validate the server config. A missing file means "run with defaults".
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve(path)?;
        if !path.is_file() {
            log::warn!("No server config at {}, starting with defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read server config {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON in server config {}", path.display()))?;
        config.server.validate()?;

        log::debug!("Loaded server config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON, creating the parent directory if needed.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = Self::resolve(path)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create config directory {}", dir.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Cannot write server config {}", path.display()))?;
        log::info!("Server config written to {}", path.display());
        Ok(())
    }

    /// Apply `PNG_COMMENT_BIND` / `PNG_COMMENT_PORT` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind_address = bind;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_PORT} value: {port:?}"))?;
        }
        Ok(())
    }

    /// `host:port` string for the listener.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}
