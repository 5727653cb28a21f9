use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Unset fields (empty host, port 0) are filled from env, then from defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

/// Where the prize collection lives. Empty strings mean "not configured".
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kv_rest_api_url: String,
    #[serde(default)]
    pub kv_rest_api_token: String,
    #[serde(default)]
    pub redis_url: String,
    #[serde(default)]
    pub data_file: String,
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default)]
    pub serverless: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kv_rest_api_url: String::new(),
            kv_rest_api_token: String::new(),
            redis_url: String::new(),
            data_file: default_data_file(),
            key: default_key(),
            serverless: false,
        }
    }
}

fn default_data_file() -> String { "data/prizes.json".into() }
fn default_key() -> String { "prizes".into() }

/// Backend chosen for a given storage configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    KvRest,
    Redis,
    File,
    ReadOnly,
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` if present (environment-only otherwise), fill gaps from env and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize();
        self.storage.normalize_from_env();
        self.storage.normalize();
        self.storage.validate()?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    pub fn normalize_from_env(&mut self) {
        if self.host.trim().is_empty() {
            if let Some(h) = env_nonempty("SERVER_HOST") { self.host = h; }
        }
        if self.port == 0 {
            if let Some(p) = env_nonempty("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
                self.port = p;
            }
        }
        if self.worker_threads.is_none() {
            self.worker_threads = env_nonempty("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok());
        }
    }

    fn normalize(&mut self) {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            self.port = 3000;
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
    }
}

impl StorageConfig {
    /// Fill unset fields from `KV_REST_API_URL`, `KV_REST_API_TOKEN`, `REDIS_URL`
    /// and `PRIZES_DATA_FILE`; platform markers switch on `serverless`.
    pub fn normalize_from_env(&mut self) {
        if self.kv_rest_api_url.trim().is_empty() {
            if let Some(v) = env_nonempty("KV_REST_API_URL") { self.kv_rest_api_url = v; }
        }
        if self.kv_rest_api_token.trim().is_empty() {
            if let Some(v) = env_nonempty("KV_REST_API_TOKEN") { self.kv_rest_api_token = v; }
        }
        if self.redis_url.trim().is_empty() {
            if let Some(v) = env_nonempty("REDIS_URL") { self.redis_url = v; }
        }
        if self.data_file.trim().is_empty() {
            if let Some(v) = env_nonempty("PRIZES_DATA_FILE") { self.data_file = v; }
        }
        if common::env::is_serverless() {
            self.serverless = true;
        }
    }

    fn normalize(&mut self) {
        if self.data_file.trim().is_empty() {
            self.data_file = default_data_file();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.kv_rest_api_url.trim();
        let token = self.kv_rest_api_token.trim();
        if url.is_empty() != token.is_empty() {
            return Err(anyhow!("storage.kv_rest_api_url and storage.kv_rest_api_token must be set together"));
        }
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!("storage.kv_rest_api_url must start with http:// or https://"));
        }
        let redis = self.redis_url.trim().to_lowercase();
        if !redis.is_empty() && !(redis.starts_with("redis://") || redis.starts_with("rediss://")) {
            return Err(anyhow!("storage.redis_url must start with redis:// or rediss://"));
        }
        if self.key.trim().is_empty() {
            return Err(anyhow!("storage.key must not be empty"));
        }
        if self.data_file.trim().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        Ok(())
    }

    /// KV credentials win over Redis; the local file is used only outside serverless platforms.
    pub fn backend_kind(&self) -> BackendKind {
        if !self.kv_rest_api_url.trim().is_empty() && !self.kv_rest_api_token.trim().is_empty() {
            BackendKind::KvRest
        } else if !self.redis_url.trim().is_empty() {
            BackendKind::Redis
        } else if self.serverless {
            BackendKind::ReadOnly
        } else {
            BackendKind::File
        }
    }
}
