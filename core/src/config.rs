//! Process configuration, loaded once and read-only afterwards.

use url::Url;

use crate::error::ConfigError;

pub const API_URL_VAR: &str = "API_URL";
pub const APP_NAME_VAR: &str = "APP_NAME";
pub const APP_DESCRIPTION_VAR: &str = "APP_DESCRIPTION";

const DEFAULT_APP_NAME: &str = "My App";
const DEFAULT_APP_DESCRIPTION: &str = "A modern SaaS application";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: Url,
    pub app_name: String,
    pub app_description: String,
}

impl Config {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            app_name: DEFAULT_APP_NAME.to_string(),
            app_description: DEFAULT_APP_DESCRIPTION.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw = get(API_URL_VAR).ok_or(ConfigError::Missing(API_URL_VAR))?;
        let mut config = Self::new(&raw)?;
        if let Some(name) = get(APP_NAME_VAR) {
            config.app_name = name;
        }
        if let Some(description) = get(APP_DESCRIPTION_VAR) {
            config.app_description = description;
        }
        Ok(config)
    }

    /// Base URL without a trailing slash, ready for `{base}{path}`.
    pub fn base_url(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        name: API_URL_VAR,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            name: API_URL_VAR,
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}
