use std::fs;
use std::path::Path;
use std::time::Duration;

use nexus_api::{NexusApiConfig, DEFAULT_NEXUS_BASE_URL};
use serde::Deserialize;

pub const PROVIDER_ENV_VAR: &str = "NEXUS_PROVIDER";
pub const BASE_URL_ENV_VAR: &str = "NEXUS_BASE_URL";
pub const CONFIG_PATH_ENV_VAR: &str = "NEXUS_CONFIG_PATH";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Http,
    Mock,
}

impl ProviderKind {
    pub const DEFAULT: Self = Self::Http;

    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            unknown => Err(format!(
                "Unsupported provider '{unknown}'. Available providers: http, mock"
            )),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Mock => "mock",
        }
    }
}

/// Optional on-disk overrides for the HTTP provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_sec: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub provider: ProviderKind,
    pub api: NexusApiConfig,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("Failed to read config file {}: {error}", path.display()))?;
    let config = serde_json::from_str::<FileConfig>(&raw)
        .map_err(|error| format!("Invalid config file {}: {error}", path.display()))?;

    if config.timeout_sec == Some(0) {
        return Err(format!(
            "Invalid config file {}: timeout_sec must be > 0",
            path.display()
        ));
    }

    Ok(config)
}

pub fn client_config_from_env() -> Result<ClientConfig, String> {
    let provider = env_string_opt(PROVIDER_ENV_VAR);
    let base_url = env_string_opt(BASE_URL_ENV_VAR);
    let file = match env_string_opt(CONFIG_PATH_ENV_VAR) {
        Some(path) => Some(load_file_config(Path::new(&path))?),
        None => None,
    };

    resolve_client_config(provider.as_deref(), base_url.as_deref(), file)
}

/// Environment beats file, file beats defaults.
pub fn resolve_client_config(
    provider: Option<&str>,
    base_url: Option<&str>,
    file: Option<FileConfig>,
) -> Result<ClientConfig, String> {
    let provider = match provider {
        Some(value) => ProviderKind::parse(value)?,
        None => ProviderKind::DEFAULT,
    };
    let file = file.unwrap_or_default();

    let base_url = base_url
        .map(str::to_string)
        .or(file.base_url)
        .unwrap_or_else(|| DEFAULT_NEXUS_BASE_URL.to_string());

    let mut api = NexusApiConfig::new(base_url).with_connect_timeout(CONNECT_TIMEOUT);
    if let Some(timeout_sec) = file.timeout_sec {
        api = api.with_timeout(Duration::from_secs(timeout_sec));
    }
    if let Some(user_agent) = file.user_agent {
        api = api.with_user_agent(user_agent);
    }

    Ok(ClientConfig { provider, api })
}

fn env_string_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
