//! Portal configuration at ~/.config/attendance/config.toml
//!
//! Every value can be overridden from the environment with an
//! `ATTENDANCE__<SECTION>__<KEY>` variable, e.g. `ATTENDANCE__SERVER__ADDRESS`.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{PortalError, PortalResult};
use crate::role::DomainConfig;

static DEFAULT_ADDRESS: &str = "127.0.0.1:4096";
static DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4096";
static DEFAULT_TIMEZONE: &str = "Asia/Manila";

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    /// TOML file with users, profiles and events loaded into memory at startup.
    pub seed_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: default_address(),
            seed_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Timezone event start times are shown in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub sender: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        NotifyConfig {
            timezone: default_timezone(),
            sender: None,
        }
    }
}

impl NotifyConfig {
    pub fn tz(&self) -> PortalResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| PortalError::Config(format!("Invalid timezone '{}': {e}", self.timezone)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Who the CLI acts as when `--user` is not given.
    pub user_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: default_server_url(),
            user_id: None,
        }
    }
}

impl PortalConfig {
    pub fn config_path() -> PortalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PortalError::Config("Could not determine config directory".into()))?
            .join("attendance");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first if missing.
    pub fn load() -> PortalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> PortalResult<Self> {
        let config: PortalConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("ATTENDANCE").separator("__"))
            .build()
            .map_err(|e| PortalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PortalError::Config(e.to_string()))?;

        // Fail at startup rather than on the first notification.
        config.notify.tz()?;

        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PortalResult<()> {
        let contents = format!(
            "\
# attendance portal configuration

[server]
# address = \"{DEFAULT_ADDRESS}\"
# seed_file = \"~/attendance/seed.toml\"

[domain]
# student_suffix = \"@student.dmmmsu.edu.ph\"
# employee_suffix = \"@dmmmsu.edu.ph\"

[notify]
# timezone = \"{DEFAULT_TIMEZONE}\"
# sender = \"events@dmmmsu.edu.ph\"

[client]
# server_url = \"{DEFAULT_SERVER_URL}\"
# user_id = \"\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PortalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PortalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_loads_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance").join("config.toml");
        PortalConfig::create_default_config(&path).unwrap();

        let config = PortalConfig::load_from(&path).unwrap();
        assert_eq!(config.server.address, DEFAULT_ADDRESS);
        assert_eq!(config.notify.timezone, DEFAULT_TIMEZONE);
        assert_eq!(config.domain, DomainConfig::default());
        assert_eq!(config.client.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[domain]\nstudent_suffix = \"@learners.example.edu\"\n\n[notify]\ntimezone = \"UTC\"\n",
        )
        .unwrap();

        let config = PortalConfig::load_from(&path).unwrap();
        assert_eq!(config.domain.student_suffix, "@learners.example.edu");
        assert_eq!(config.domain.employee_suffix, "@dmmmsu.edu.ph");
        assert_eq!(config.notify.tz().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notify]\ntimezone = \"Mars/Olympus\"\n").unwrap();

        assert!(matches!(PortalConfig::load_from(&path), Err(PortalError::Config(_))));
    }
}
