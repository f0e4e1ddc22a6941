use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_REDIRECT_URI: &str = "marine-term-translations://redirect";
pub const DEFAULT_KEYRING_SERVICE: &str = "transbranch";

const ENV_API_BASE_URL: &str = "TRANSBRANCH_API_BASE_URL";
const ENV_REPO: &str = "TRANSBRANCH_REPO";
const ENV_GITHUB_CLIENT_ID: &str = "TRANSBRANCH_GITHUB_CLIENT_ID";
const ENV_REDIRECT_URI: &str = "TRANSBRANCH_REDIRECT_URI";

/// On-disk shape; every field optional so env vars can fill the gaps.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_base_url: Option<String>,
    repo: Option<String>,
    github_client_id: Option<String>,
    redirect_uri: Option<String>,
    keyring_service: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend that proxies GitHub.
    pub api_base_url: Url,
    /// `owner/name` of the repository holding the translations.
    pub repo: String,
    pub github_client_id: Option<String>,
    pub redirect_uri: String,
    /// Service name the keychain entries are stored under.
    pub keyring_service: String,
}

/// `<config dir>/transbranch/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("transbranch").join("config.toml"))
}

impl AppConfig {
    /// Load from `path`, or from the default location if it exists, then apply
    /// `TRANSBRANCH_*` environment overrides.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => read_config_file(&path)?,
                None => {
                    debug!("No config file found, using environment only");
                    ConfigFile::default()
                }
            },
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let pick = |key: &str, value: Option<String>| env(key).filter(|v| !v.is_empty()).or(value);

        let base = pick(ENV_API_BASE_URL, file.api_base_url)
            .ok_or(ConfigError::MissingField("api_base_url"))?;
        let api_base_url = Url::parse(&base).map_err(|source| ConfigError::InvalidUrl {
            value: base.clone(),
            source,
        })?;

        let repo = pick(ENV_REPO, file.repo).ok_or(ConfigError::MissingField("repo"))?;

        Ok(Self {
            api_base_url,
            repo,
            github_client_id: pick(ENV_GITHUB_CLIENT_ID, file.github_client_id),
            redirect_uri: pick(ENV_REDIRECT_URI, file.redirect_uri)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            keyring_service: file
                .keyring_service
                .unwrap_or_else(|| DEFAULT_KEYRING_SERVICE.to_string()),
        })
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    info!("Reading config from {:?}", path);
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
