//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;
use crate::application::launch::LaunchLink;
use crate::application::services::RegistrationDefaults;
use crate::domain::entities::{Avatar, Profile};

/// Platform configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformConfig {
    pub launch: LaunchConfig,
    pub registration: RegistrationConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LaunchConfig {
    pub scheme: String,
    pub default_server: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistrationConfig {
    pub starting_balance: u64,
    pub default_bio: String,
    pub default_avatar: Avatar,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            scheme: "creatoplay".to_string(),
            default_server: "127.0.0.1".to_string(),
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            starting_balance: 0,
            default_bio: "Hello! I'm new to Creatoplay!".to_string(),
            default_avatar: Avatar::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: None,
        }
    }
}

impl LaunchConfig {
    /// Assemble the launch link for a game, pointed at the default server.
    pub fn link_for(&self, game_id: impl Into<String>, profile: &Profile) -> LaunchLink {
        LaunchLink::new(&self.scheme, &self.default_server, game_id, profile)
    }
}

impl RegistrationConfig {
    pub fn defaults(&self) -> RegistrationDefaults {
        RegistrationDefaults {
            starting_balance: self.starting_balance,
            bio: self.default_bio.clone(),
            avatar: self.default_avatar.clone(),
        }
    }
}

impl PlatformConfig {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = PlatformConfig::default();

        if let Ok(scheme) = std::env::var("CREATOPLAY_SCHEME") {
            config.launch.scheme = scheme;
        }
        if let Ok(server) = std::env::var("CREATOPLAY_SERVER") {
            config.launch.default_server = server;
        }
        if let Ok(backend) = std::env::var("CREATOPLAY_STORAGE") {
            match backend.as_str() {
                "memory" => config.storage.backend = StorageBackend::Memory,
                "sqlite" => config.storage.backend = StorageBackend::Sqlite,
                other => tracing::warn!("Ignoring unknown storage backend: {}", other),
            }
        }
        if let Ok(path) = std::env::var("CREATOPLAY_STORAGE_PATH") {
            config.storage.path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.launch.scheme.is_empty() {
            return Err(ConfigError::MissingField("launch.scheme".to_string()));
        }
        if self.launch.default_server.is_empty() {
            return Err(ConfigError::MissingField(
                "launch.default-server".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::Sqlite && self.storage.path.is_none() {
            return Err(ConfigError::MissingField("storage.path".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_platform_constants() {
        let config = PlatformConfig::default();
        assert_eq!(config.launch.scheme, "creatoplay");
        assert_eq!(config.launch.default_server, "127.0.0.1");
        assert_eq!(config.registration.starting_balance, 0);
        assert_eq!(config.registration.default_bio, "Hello! I'm new to Creatoplay!");
        assert_eq!(config.registration.default_avatar.head_color, "#f5c469");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = r##"
launch:
  scheme: creatoplay
  default-server: 10.0.0.1
registration:
  starting-balance: 100
  default-bio: Welcome aboard
  default-avatar:
    head-color: "#ffffff"
    torso-color: "#000000"
    arms-color: "#ffffff"
    legs-color: "#000000"
storage:
  backend: sqlite
  path: creatoplay.db
"##;
        let config: PlatformConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.launch.default_server, "10.0.0.1");
        assert_eq!(config.registration.starting_balance, 100);
        assert_eq!(config.registration.default_avatar.torso_color, "#000000");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sqlite_backend_requires_a_path() {
        let config = PlatformConfig {
            storage: StorageConfig {
                backend: StorageBackend::Sqlite,
                path: None,
            },
            ..PlatformConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(field)) if field == "storage.path"
        ));
    }

    #[test]
    fn registration_defaults_feed_the_account_service() {
        let defaults = PlatformConfig::default().registration.defaults();
        assert_eq!(defaults.starting_balance, 0);
        assert_eq!(defaults.bio, "Hello! I'm new to Creatoplay!");
        assert_eq!(defaults.avatar, Avatar::default());
    }
}
