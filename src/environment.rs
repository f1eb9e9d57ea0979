// src/environment.rs
use crate::utils::{ensure_directory, resolve_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Collected postings and reference tables
    pub raw_data_path: PathBuf,
    /// Reports, exports and merged datasets
    pub processed_path: PathBuf,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: EnvironmentConfig,
    production: EnvironmentConfig,
}

fn default_port() -> u16 {
    8000
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            raw_data_path: PathBuf::from("data/raw"),
            processed_path: PathBuf::from("data/processed"),
            port: default_port(),
        }
    }
}

impl EnvironmentConfig {
    /// Load configuration based on environment
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);
        Self::load_from(Path::new(CONFIG_FILE), &environment)
    }

    fn get_environment() -> String {
        std::env::var("WORKSHIFT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from(config_path: &Path, environment: &str) -> Result<Self> {
        let env_config = if config_path.exists() {
            let config_content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml(&config_content, environment)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            info!(
                "{} not found, using default data directories",
                config_path.display()
            );
            Self::default()
        };

        env_config.resolved()
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(content)?;
        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    /// Make paths absolute
    fn resolved(self) -> Result<Self> {
        Ok(Self {
            raw_data_path: resolve_path(&self.raw_data_path)?,
            processed_path: resolve_path(&self.processed_path)?,
            port: self.port,
        })
    }

    /// Ensure all configured directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        ensure_directory(&self.raw_data_path).await?;
        ensure_directory(&self.processed_path).await?;
        info!("All configured directories ensured to exist");
        Ok(())
    }
}
