use crate::error::{ChoraleError, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
    LargeV3,
    LargeV3Turbo,
}

impl WhisperModel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "tiny" => Some(Self::Tiny),
            "base" => Some(Self::Base),
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "largev3" | "large" => Some(Self::LargeV3),
            "largev3turbo" => Some(Self::LargeV3Turbo),
            _ => None,
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            Self::Tiny => "ggml-tiny.bin",
            Self::Base => "ggml-base.bin",
            Self::Small => "ggml-small.bin",
            Self::Medium => "ggml-medium.bin",
            Self::LargeV3 => "ggml-large-v3.bin",
            Self::LargeV3Turbo => "ggml-large-v3-turbo.bin",
        }
    }

    pub fn download_url(&self) -> String {
        format!(
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
            self.filename()
        )
    }

    pub fn size_mb(&self) -> u64 {
        match self {
            Self::Tiny => 75,
            Self::Base => 142,
            Self::Small => 466,
            Self::Medium => 1500,
            Self::LargeV3 => 2900,
            Self::LargeV3Turbo => 1620,
        }
    }

    pub fn all() -> &'static [WhisperModel] {
        &[
            Self::Tiny,
            Self::Base,
            Self::Small,
            Self::Medium,
            Self::LargeV3,
            Self::LargeV3Turbo,
        ]
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tiny => write!(f, "tiny"),
            Self::Base => write!(f, "base"),
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::LargeV3 => write!(f, "large-v3"),
            Self::LargeV3Turbo => write!(f, "large-v3-turbo"),
        }
    }
}

pub struct ModelManager {
    models_dir: PathBuf,
}

impl ModelManager {
    pub fn new(models_dir: PathBuf) -> Self {
        Self { models_dir }
    }

    pub fn model_path(&self, model: WhisperModel) -> PathBuf {
        self.models_dir.join(model.filename())
    }

    pub fn model_exists(&self, model: WhisperModel) -> bool {
        self.model_path(model).exists()
    }

    pub fn list_all(&self) -> Vec<(WhisperModel, bool, u64)> {
        WhisperModel::all()
            .iter()
            .map(|m| (*m, self.model_exists(*m), m.size_mb()))
            .collect()
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.models_dir)?;
        Ok(())
    }

    pub fn download_model<F>(&self, model: WhisperModel, progress: F) -> Result<PathBuf>
    where
        F: Fn(u64, u64),
    {
        self.ensure_dir()?;

        let path = self.model_path(model);

        if path.exists() {
            let size = fs::metadata(&path)?.len();
            progress(size, size);
            return Ok(path);
        }

        let temp_path = path.with_extension("bin.tmp");

        let response = reqwest::blocking::Client::new()
            .get(model.download_url())
            .send()
            .map_err(|e| ChoraleError::Api(format!("Download failed: {}", e)))?;

        let total_size = response
            .content_length()
            .unwrap_or(model.size_mb() * 1024 * 1024);

        let mut file = fs::File::create(&temp_path)?;
        let mut downloaded: u64 = 0;

        let mut reader = response;
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(ChoraleError::Io)?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])?;
            downloaded += bytes_read as u64;
            progress(downloaded, total_size);
        }

        fs::rename(&temp_path, &path)?;

        Ok(path)
    }

    pub fn delete_model(&self, model: WhisperModel) -> Result<()> {
        let path = self.model_path(model);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_model_from_str() {
        assert_eq!(WhisperModel::from_str("base"), Some(WhisperModel::Base));
        assert_eq!(WhisperModel::from_str("BASE"), Some(WhisperModel::Base));
        assert_eq!(
            WhisperModel::from_str("large-v3-turbo"),
            Some(WhisperModel::LargeV3Turbo)
        );
        assert_eq!(WhisperModel::from_str("invalid"), None);
    }

    #[test]
    fn test_model_display_roundtrip() {
        for model in WhisperModel::all() {
            assert_eq!(WhisperModel::from_str(&model.to_string()), Some(*model));
        }
    }

    #[test]
    fn test_model_path() {
        let dir = tempdir().unwrap();
        let manager = ModelManager::new(dir.path().to_path_buf());
        let path = manager.model_path(WhisperModel::Base);
        assert!(path.ends_with("ggml-base.bin"));
        assert!(!manager.model_exists(WhisperModel::Base));
    }

    #[test]
    fn test_list_all_reports_missing() {
        let dir = tempdir().unwrap();
        let manager = ModelManager::new(dir.path().to_path_buf());
        let all = manager.list_all();
        assert_eq!(all.len(), WhisperModel::all().len());
        assert!(all.iter().all(|(_, present, _)| !present));
    }
}
