use config::{Config, ConfigError, Environment, File};
use rfp_sdk::types::UserId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorkflowConfig {
    pub services: ServicesConfig,
    pub user: UserConfig,
    pub taxonomy: Option<TaxonomyConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServicesConfig {
    /// Base URL of the portal (categories, documents, reviews)
    pub portal_url: String,
    /// Base URL of the model service (prediction, generation, uploads)
    pub model_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    pub auth_token: Option<String>,
}

/// Identity attached to uploads, reviews and assignments
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UserConfig {
    pub user_id: UserId,
    pub user_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TaxonomyConfig {
    /// JSON file replacing the built-in category descriptions
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            services: ServicesConfig {
                portal_url: "http://localhost:8085".to_string(),
                model_url: "http://localhost:8000".to_string(),
                request_timeout_secs: default_timeout_secs(),
                auth_token: None,
            },
            user: UserConfig {
                user_id: 1,
                user_name: "Unknown User".to_string(),
            },
            taxonomy: None,
            logging: Some(LoggingConfig {
                level: Some("info".to_string()),
            }),
        }
    }
}

const DEFAULT_CONFIG: &str = r#"
[services]
portal_url = "http://localhost:8085"
model_url = "http://localhost:8000"
request_timeout_secs = 300
# auth_token = "your-portal-token"

[user]
user_id = 1
user_name = "Unknown User"

[taxonomy]
# path = "~/.config/rfp-cruncher/categories.json"

[logging]
level = "info"
"#;

impl WorkflowConfig {
    /// Load from the default location, creating it on first use
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();
        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    /// Load from `config_path` layered with `RFP__`-prefixed environment variables
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.to_path_buf()))
            .add_source(
                Environment::with_prefix("RFP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: WorkflowConfig = builder.try_deserialize()?;

        // Expand tilde in taxonomy path
        if let Some(path) = config.taxonomy.as_mut().and_then(|t| t.path.as_mut()) {
            if path.starts_with("~") {
                if let Some(home) = home::home_dir() {
                    let path_str = path.to_string_lossy();
                    let expanded = path_str.replacen('~', &home.to_string_lossy(), 1);
                    *path = PathBuf::from(expanded);
                }
            }
        }

        Ok(config)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn taxonomy_path(&self) -> Option<&Path> {
        self.taxonomy.as_ref().and_then(|t| t.path.as_deref())
    }

    /// Effective configuration rendered as TOML, with the auth token masked
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let mut masked = self.clone();
        if masked.services.auth_token.is_some() {
            masked.services.auth_token = Some("********".to_string());
        }
        toml::to_string_pretty(&masked)
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("rfp-cruncher/config.toml")
    } else {
        PathBuf::from("rfp-cruncher.toml")
    }
}
