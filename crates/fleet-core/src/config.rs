use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::FleetError;

/// Environment variable Termux sets to its install prefix.
const TERMUX_PREFIX_VAR: &str = "PREFIX";
const TERMUX_MARKER: &str = "com.termux";

/// Where Fleet is running, detected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Desktop,
    /// Android via Termux.
    Termux,
}

impl Environment {
    /// Detect the environment from a variable lookup.
    pub fn detect<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(TERMUX_PREFIX_VAR) {
            Some(prefix) if prefix.contains(TERMUX_MARKER) => Environment::Termux,
            _ => Environment::Desktop,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Environment::Termux)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Desktop => write!(f, "desktop"),
            Environment::Termux => write!(f, "termux"),
        }
    }
}

/// Device name and root directory for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub device_name: String,
    pub root_dir: PathBuf,
}

/// Top-level Fleet configuration, stored at `~/.fleet/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Used on ordinary desktop/laptop machines.
    #[serde(default = "default_desktop")]
    pub desktop: Profile,

    /// Used when running under Termux on Android.
    #[serde(default = "default_mobile")]
    pub mobile: Profile,
}

fn default_desktop() -> Profile {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    Profile {
        device_name: "Laptop (Base)".to_string(),
        root_dir: home.join("unexusi"),
    }
}

fn default_mobile() -> Profile {
    Profile {
        device_name: "Pixel 8a (Mobile)".to_string(),
        root_dir: PathBuf::from("/storage/emulated/0/pixel8a/unexusi"),
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            desktop: default_desktop(),
            mobile: default_mobile(),
        }
    }
}

/// Settings resolved once at startup and passed down to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub environment: Environment,
    pub device_name: String,
    pub root_dir: PathBuf,
}

impl Settings {
    /// Replace the root directory, e.g. from a command-line override.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_dir = root.into();
        self
    }
}

impl FleetConfig {
    /// Returns the Fleet home directory (`~/.fleet/`).
    pub fn home_dir() -> Result<PathBuf, FleetError> {
        let base = dirs::home_dir().ok_or_else(|| FleetError::Config {
            message: "could not determine home directory".into(),
        })?;
        Ok(base.join(".fleet"))
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Result<PathBuf, FleetError> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load config from the default location, or return defaults if not found.
    pub fn load() -> Result<Self, FleetError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, FleetError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FleetError::Serialization(e.to_string()))
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), FleetError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FleetError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Pick the profile for the detected environment.
    pub fn resolve(&self, environment: Environment) -> Settings {
        let profile = if environment.is_mobile() {
            &self.mobile
        } else {
            &self.desktop
        };
        tracing::debug!(
            "resolved {environment} profile: {} at {}",
            profile.device_name,
            profile.root_dir.display()
        );
        Settings {
            environment,
            device_name: profile.device_name.clone(),
            root_dir: profile.root_dir.clone(),
        }
    }

    /// Detect the environment from the process environment and resolve.
    pub fn resolve_from_env(&self) -> Settings {
        self.resolve(Environment::detect(|key| std::env::var(key).ok()))
    }
}
