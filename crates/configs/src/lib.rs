use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
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
        Self { host: "127.0.0.1".into(), port: 5000, worker_threads: Some(4) }
    }
}

/// Where the catalogue JSON file and the uploaded images live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_catalogue_file")]
    pub catalogue_file: String,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { catalogue_file: default_catalogue_file(), uploads_dir: default_uploads_dir() }
    }
}

/// Outward-facing HTTP concerns: the browser origin allowed by CORS and the
/// base address prefixed to `/images/{filename}` when building image URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { frontend_origin: default_frontend_origin(), public_base_url: default_public_base_url() }
    }
}

fn default_catalogue_file() -> String { "data/products.json".into() }
fn default_uploads_dir() -> String { "uploads".into() }
fn default_frontend_origin() -> String { "http://localhost:3000".into() }
fn default_public_base_url() -> String { "http://localhost:5000".into() }

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
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.http.normalize()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.catalogue_file.trim().is_empty() {
            return Err(anyhow!("storage.catalogue_file must not be empty"));
        }
        if self.uploads_dir.trim().is_empty() {
            return Err(anyhow!("storage.uploads_dir must not be empty"));
        }
        Ok(())
    }
}

impl HttpConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.frontend_origin.trim().is_empty() {
            self.frontend_origin = default_frontend_origin();
        }
        // image_url concatenation assumes no trailing slash on the base
        while self.public_base_url.ends_with('/') {
            self.public_base_url.pop();
        }
        if self.public_base_url.trim().is_empty() {
            self.public_base_url = default_public_base_url();
        }
        if !(self.public_base_url.starts_with("http://") || self.public_base_url.starts_with("https://")) {
            return Err(anyhow!("http.public_base_url must start with http(s)"));
        }
        Ok(())
    }
}
