use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::OrchestratorConfig;

use super::Environment;

/// Application settings. Every field has a default, so an empty
/// configuration is valid apart from provider credentials.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub jobs: JobSettings,
    pub transcription: TranscriptionSettings,
    pub media: MediaSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.{environment}` (optional) under `APP__`-prefixed
    /// environment variables, e.g. `APP__SERVER__PORT=8080`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.jobs.orchestrator_config()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Without a url the service keeps jobs in memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    pub fetch_timeout_secs: u64,
    pub transcribe_timeout_secs: u64,
    pub stale_after_secs: u64,
    pub sweep_interval_secs: u64,
}

impl JobSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn transcribe_timeout(&self) -> Duration {
        Duration::from_secs(self.transcribe_timeout_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Fails when `stale_after_secs` does not exceed the fetch and transcribe timeouts combined.
    pub fn orchestrator_config(&self) -> Result<OrchestratorConfig, ConfigError> {
        OrchestratorConfig::new(
            self.fetch_timeout(),
            self.transcribe_timeout(),
            self.stale_after(),
        )
        .map_err(|e| ConfigError::Message(format!("jobs: {}", e)))
    }
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 120,
            transcribe_timeout_secs: 600,
            stale_after_secs: 900,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProviderSetting {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    Azure,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    pub provider: TranscriptionProviderSetting,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub azure_deployment: Option<String>,
    pub azure_api_version: Option<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProviderSetting::default(),
            model: "whisper-1".to_string(),
            api_key: None,
            base_url: None,
            azure_deployment: None,
            azure_api_version: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Directory served for `file://` video urls. Unset disables them.
    pub local_root: Option<String>,
    pub max_bytes: u64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            local_root: None,
            // Whisper's upload limit.
            max_bytes: 25 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
    pub sink_capacity: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
            sink_capacity: 1000,
        }
    }
}
