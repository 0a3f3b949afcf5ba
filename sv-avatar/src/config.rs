use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const SV_AVATAR_CONFIG_ENV: &str = "SV_AVATAR_CONFIG";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarSettings {
    /// Sent with every HTTP texture request.
    pub user_agent: String,
    /// Threads of the fetch/decode runtime.
    pub worker_threads: usize,
    /// Skin URL to fall back to when a requested skin fails to load.
    pub fallback_skin: Option<String>,
    /// Cape URLs warmed into the cache at startup.
    pub preload_capes: Vec<String>,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("sv-avatar/", env!("CARGO_PKG_VERSION")).to_string(),
            worker_threads: 2,
            fallback_skin: None,
            preload_capes: Vec::new(),
        }
    }
}

impl AvatarSettings {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// `explicit`, then the file named by `SV_AVATAR_CONFIG`, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match std::env::var(SV_AVATAR_CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::from_path(&PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }
}
