use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the per-user JSON snapshots.
    pub data_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct AiConfig {
    /// Gemini API key. Empty means unset; operations fail with a user
    /// message instead of reaching the network.
    #[serde(default)]
    pub api_key: String,
    pub base_url: String,
    pub transcribe_model: String,
    pub analysis_model: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            // PSIKOSCRIBE__AI__API_KEY overrides the file, so the key
            // never has to live on disk.
            .add_source(config::Environment::with_prefix("PSIKOSCRIBE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
