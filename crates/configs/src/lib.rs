use anyhow::{anyhow, Context};
use anyhow::Result;
use serde::Deserialize;

use common::env::var_parsed;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Which key-value backend the repositories talk to.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("unknown store backend `{other}`; expected redis or memory")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_host")]
    pub host: String,
    #[serde(default = "default_store_port")]
    pub port: u16,
    #[serde(default)]
    pub db: u32,
}

fn default_store_host() -> String { "127.0.0.1".to_string() }
fn default_store_port() -> u16 { 6379 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Redis, host: default_store_host(), port: default_store_port(), db: 0 }
    }
}

impl StoreConfig {
    /// Connection URL understood by the redis client.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content).with_context(|| format!("invalid config file {path}"))
}

/// True only when the config file itself is absent.
fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Build a config purely from environment variables, starting from defaults.
pub fn from_env() -> Result<AppConfig> {
    let mut cfg = AppConfig::default();
    if let Ok(host) = std::env::var("SERVER_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = var_parsed::<u16>("SERVER_PORT") {
        cfg.server.port = port;
    }
    if let Some(w) = var_parsed::<usize>("TOKIO_WORKER_THREADS") {
        cfg.server.worker_threads = Some(w);
    }
    if let Ok(backend) = std::env::var("STORE_BACKEND") {
        cfg.store.backend = backend.parse()?;
    }
    if let Ok(host) = std::env::var("REDIS_HOST") {
        cfg.store.host = host;
    }
    if let Some(port) = var_parsed::<u16>("REDIS_PORT") {
        cfg.store.port = port;
    }
    if let Some(db) = var_parsed::<u32>("REDIS_DB") {
        cfg.store.db = db;
    }
    Ok(cfg)
}

impl AppConfig {
    /// Config file first; environment only when the file does not exist.
    /// A file that exists but fails to parse is an error.
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => from_env()?,
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StoreConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_store_host();
        }
        if self.port == 0 {
            return Err(anyhow!("store.port must be within 1..=65535"));
        }
        Ok(())
    }
}
