//! Client configuration read from the environment.

use crate::error::ConfigError;
use crate::types::OwnerTag;

pub const STORE_URL_VAR: &str = "TODO_STORE_URL";
pub const OWNER_TAG_VAR: &str = "TODO_OWNER_TAG";
pub const DEFAULT_STORE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub store_url: String,
    pub owner_tag: OwnerTag,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_url: DEFAULT_STORE_URL.to_string(),
            owner_tag: OwnerTag::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(STORE_URL_VAR) {
            config.store_url = url;
        }
        if let Some(raw) = lookup(OWNER_TAG_VAR) {
            config.owner_tag = parse_owner_tag(&raw)?;
        }
        Ok(config)
    }
}

pub fn parse_owner_tag(raw: &str) -> Result<OwnerTag, ConfigError> {
    raw.trim()
        .parse()
        .map(OwnerTag)
        .map_err(|_| ConfigError::InvalidValue {
            key: OWNER_TAG_VAR,
            value: raw.to_string(),
        })
}
