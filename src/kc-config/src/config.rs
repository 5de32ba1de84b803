use std::env;
use std::fs::create_dir_all;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use dirs::home_dir;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::ConfigError;

/// overrides location of config file
pub const CONFIG_PATH_ENV: &str = "KC_CONFIG";

/// overrides token of current profile
pub const TOKEN_ENV: &str = "KC_TOKEN";

const CONFIG_DIR: &str = ".kube-console";
const CONFIG_FILE: &str = "config";

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub profile: ProfileDetail,
}

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileDetail {
    /// console address, ex: https://console.example.com:9443
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// endpoint used when none is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<u32>,
}

impl ProfileDetail {
    /// url without trailing slash
    pub fn api_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// token from environment wins over token in file
    pub fn token(&self) -> Option<String> {
        match env::var(TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Some(token),
            _ => self.token.clone(),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    #[serde(skip)]
    pub path: PathBuf,
    pub current_profile: String,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl ConsoleConfig {
    /// location from environment or home directory
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home_dir = home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home_dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// empty config at default path when there is no file yet
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            debug!("no console config at: {}", path.display());
            return Ok(Self {
                path,
                ..Default::default()
            });
        }
        Self::from_file(path)
    }

    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        debug!("reading console config: {}", path.as_ref().display());
        let file = File::open(path.as_ref())?;
        let mut config: Self = serde_yaml::from_reader(file)?;
        config.path = path.as_ref().to_path_buf();
        Ok(config)
    }

    pub fn to_file<T: AsRef<Path>>(&self, path: T) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(serde_yaml::to_writer(file, self)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.to_file(&self.path)
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn current_profile(&self) -> Option<&Profile> {
        self.profile(&self.current_profile)
    }

    /// current profile or error if there is none
    pub fn active_profile(&self) -> Result<&ProfileDetail, ConfigError> {
        self.current_profile()
            .map(|p| &p.profile)
            .ok_or(ConfigError::NoCurrentProfile)
    }

    pub fn set_current_profile<N: Into<String>>(&mut self, name: N) -> Result<(), ConfigError> {
        let name = name.into();
        if self.profile(&name).is_none() {
            return Err(ConfigError::UnknownProfile(name));
        }
        self.current_profile = name;
        Ok(())
    }

    pub fn put_profile(&mut self, profile: Profile) -> Option<Profile> {
        let prev = self.profiles.iter_mut().find(|p| p.name.eq(&profile.name));
        match prev {
            Some(prev) => Some(std::mem::replace(prev, profile)),
            None => {
                self.profiles.push(profile);
                None
            }
        }
    }
}
