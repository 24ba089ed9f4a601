use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Memory => "memory",
        }
    }
}

fn default_storage_kind() -> StorageKind {
    StorageKind::Local
}

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_storage_kind")]
    pub storage: StorageKind,
    #[serde(default)]
    pub azure_openai_endpoint: Option<String>,
    #[serde(default)]
    pub azure_openai_api_key: Option<String>,
    #[serde(default)]
    pub azure_openai_chat_deployment: Option<String>,
    #[serde(default = "default_api_version")]
    pub azure_openai_api_version: String,
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,
    #[serde(default = "default_completion_temperature")]
    pub completion_temperature: f32,
    #[serde(default = "default_completion_max_tokens")]
    pub completion_max_tokens: u32,
    #[serde(default = "default_context_max_chars")]
    pub context_max_chars: usize,
    #[serde(default = "default_upload_max_bytes")]
    pub upload_max_bytes: usize,
    #[serde(default = "default_cors_allow_origin")]
    pub cors_allow_origin: String,
}

fn default_http_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_api_version() -> String {
    "2024-08-01-preview".to_string()
}

fn default_completion_timeout_secs() -> u64 {
    30
}

fn default_completion_temperature() -> f32 {
    0.2
}

fn default_completion_max_tokens() -> u32 {
    600
}

fn default_context_max_chars() -> usize {
    6000
}

fn default_upload_max_bytes() -> usize {
    200_000
}

fn default_cors_allow_origin() -> String {
    "*".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            storage: default_storage_kind(),
            azure_openai_endpoint: None,
            azure_openai_api_key: None,
            azure_openai_chat_deployment: None,
            azure_openai_api_version: default_api_version(),
            completion_timeout_secs: default_completion_timeout_secs(),
            completion_temperature: default_completion_temperature(),
            completion_max_tokens: default_completion_max_tokens(),
            context_max_chars: default_context_max_chars(),
            upload_max_bytes: default_upload_max_bytes(),
            cors_allow_origin: default_cors_allow_origin(),
        }
    }
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
