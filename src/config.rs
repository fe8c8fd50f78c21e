use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: default_url(), name: default_db_name(), collection: default_collection() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 50051 }
fn default_url() -> String { "mongodb://localhost:27017".into() }
fn default_db_name() -> String { "mydb".into() }
fn default_collection() -> String { "posts".into() }

/// Load from `CONFIG_PATH` (or `config.toml`), falling back to defaults when
/// the file does not exist.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !std::path::Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Overlay `MONGODB_URI`, `POST_SERVER_HOST` and `POST_SERVER_PORT`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("MONGODB_URI") {
            self.database.url = url;
        }
        if let Some(host) = lookup("POST_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("POST_SERVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| anyhow!("POST_SERVER_PORT is not a port number: {port}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.database.validate()
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(anyhow!("server.host must not be empty"));
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        Ok(())
    }

    /// Listen address as handed to the resolver, so host names work too.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl DatabaseConfig {
    fn validate(&self) -> Result<()> {
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
            return Err(anyhow!("database.url must start with mongodb:// or mongodb+srv://"));
        }
        if self.name.trim().is_empty() || self.collection.trim().is_empty() {
            return Err(anyhow!("database.name and database.collection must not be empty"));
        }
        Ok(())
    }
}
