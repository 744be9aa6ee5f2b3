use crate::config::settings::ChoraleConfig;
use crate::error::{ChoraleError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Get XDG-compliant config directory
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "chorale")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ChoraleError::Config("Could not determine config directory".to_string()))
}

/// Get XDG-compliant data directory
pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "chorale")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ChoraleError::Config("Could not determine data directory".to_string()))
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get models directory
pub fn models_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("models"))
}

/// Load config from file, creating default if not exists
pub fn load_config() -> Result<ChoraleConfig> {
    let path = config_path()?;

    if !path.exists() {
        let config = ChoraleConfig::default();
        save_config(&config)?;
        return Ok(config);
    }

    let content = fs::read_to_string(&path)?;
    let config: ChoraleConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save config to file
pub fn save_config(config: &ChoraleConfig) -> Result<()> {
    let path = config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(&path, content)?;
    Ok(())
}

/// Load config with environment variable overrides
pub fn load_config_with_env() -> Result<ChoraleConfig> {
    let mut config = load_config()?;

    if let Ok(engine) = std::env::var("CHORALE_ENGINE") {
        config.transcription.engine = engine;
    }
    if let Ok(model) = std::env::var("CHORALE_WHISPER_MODEL") {
        config.transcription.whisper_model = model;
    }
    if let Ok(url) = std::env::var("CHORALE_HOSTED_URL") {
        config.transcription.hosted_url = Some(url);
    }
    if let Ok(key) = std::env::var("CHORALE_HOSTED_API_KEY") {
        config.transcription.hosted_api_key = Some(key);
    }

    Ok(config)
}
