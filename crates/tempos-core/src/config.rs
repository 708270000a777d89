use crate::error::CoreError;
use crate::timezone::{validate_timezone, DEFAULT_TIMEZONE};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "tempos.toml";
pub const ENV_PREFIX: &str = "TEMPOS_";

/// Settings shared by the CLI and the HTTP service.
///
/// Sources, later ones winning: built-in defaults, `tempos.toml`, then
/// `TEMPOS_*` environment variables (`TEMPOS_LLM__MODEL=mistral`).
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Settings {
    pub database_path: String,
    /// IANA zone assumed for wall-clock times produced by the model.
    pub timezone: String,
    /// Window of the deterministic "upcoming" fallback query, in days.
    pub fallback_days: u32,
    pub llm: LlmSettings,
    pub server: ServerSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Upper bound on a single completion request.
    pub timeout_secs: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerSettings {
    pub addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: "schedules.db".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            fallback_days: 30,
            llm: LlmSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3:8b".to_string(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { addr: "0.0.0.0:8000".to_string() }
    }
}

impl Settings {
    pub fn new() -> Result<Self, CoreError> {
        Self::from_figment(Self::figment(CONFIG_FILE))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Self::from_figment(Self::figment(path))
    }

    fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn from_figment(figment: Figment) -> Result<Self, CoreError> {
        let settings: Settings = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_timezone(&self.timezone)?;
        if self.fallback_days == 0 {
            return Err(CoreError::InvalidInput(
                "fallback_days must be at least 1".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(CoreError::InvalidInput(
                "llm.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
