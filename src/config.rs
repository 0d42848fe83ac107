use crate::error::{BirdConcernError, Result};
use bird_concern_common::schema::{DEFAULT_EXCLUDED_COLUMNS, DEFAULT_STATE_COLUMN_START};
use bird_concern_common::{DashboardSettings, StateColumns};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub encoder_path: Option<PathBuf>,
    pub top_n: usize,
    /// 州列の明示リスト（未設定なら位置指定）
    pub state_columns: Option<Vec<String>>,
    pub state_column_start: usize,
    pub exclude_columns: Vec<String>,
    pub low_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: None,
            model_path: None,
            encoder_path: None,
            top_n: 10,
            state_columns: None,
            state_column_start: DEFAULT_STATE_COLUMN_START,
            exclude_columns: DEFAULT_EXCLUDED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            low_label: "Low".into(),
        }
    }
}

/// 起動時に読み込む3ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dataset: PathBuf,
    pub model: PathBuf,
    pub encoder: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BirdConcernError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("bird-concern").join("config.json"))
    }

    pub fn state_columns_spec(&self) -> StateColumns {
        match &self.state_columns {
            Some(names) => StateColumns::Named(names.clone()),
            None => StateColumns::FromIndex(self.state_column_start),
        }
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            top_n: self.top_n,
            exclude_columns: self.exclude_columns.clone(),
            low_label: self.low_label.clone(),
        }
    }

    /// CLI引数を優先してファイルパスを確定
    pub fn resolve_paths(
        &self,
        dataset: Option<&Path>,
        model: Option<&Path>,
        encoder: Option<&Path>,
    ) -> Result<ArtifactPaths> {
        let pick = |arg: Option<&Path>, saved: &Option<PathBuf>, flag: &str| -> Result<PathBuf> {
            let path = arg
                .map(Path::to_path_buf)
                .or_else(|| saved.clone())
                .ok_or_else(|| {
                    BirdConcernError::Config(format!(
                        "{0} が指定されていません。`--{0}` か `bird-concern config --set-{0}` で設定してください",
                        flag
                    ))
                })?;
            if !path.exists() {
                return Err(BirdConcernError::FileNotFound(path.display().to_string()));
            }
            Ok(path)
        };

        Ok(ArtifactPaths {
            dataset: pick(dataset, &self.dataset_path, "dataset")?,
            model: pick(model, &self.model_path, "model")?,
            encoder: pick(encoder, &self.encoder_path, "encoder")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.top_n, 10);
        assert_eq!(config.state_column_start, 19);
        assert_eq!(config.low_label, "Low");
        assert_eq!(config.state_columns_spec(), StateColumns::FromIndex(19));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            state_columns: Some(vec!["Kerala".into()]),
            top_n: 5,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.top_n, 5);
        assert_eq!(
            loaded.state_columns_spec(),
            StateColumns::Named(vec!["Kerala".into()])
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(loaded.top_n, 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"top_n": 3}"#).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.top_n, 3);
        assert_eq!(loaded.exclude_columns.len(), 2);
    }

    #[test]
    fn test_resolve_paths_prefers_arguments() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("birds.csv");
        let model = dir.path().join("model.json");
        let encoder = dir.path().join("encoder.json");
        for p in [&data, &model, &encoder] {
            std::fs::write(p, "x").unwrap();
        }

        let config = Config {
            dataset_path: Some(dir.path().join("old.csv")),
            model_path: Some(model.clone()),
            encoder_path: Some(encoder.clone()),
            ..Default::default()
        };
        let paths = config.resolve_paths(Some(&data), None, None).unwrap();
        assert_eq!(paths.dataset, data);
        assert_eq!(paths.model, model);
    }

    #[test]
    fn test_resolve_paths_missing() {
        let err = Config::default().resolve_paths(None, None, None).unwrap_err();
        assert!(matches!(err, BirdConcernError::Config(ref m) if m.contains("dataset")));

        let err = Config::default()
            .resolve_paths(
                Some(Path::new("/nonexistent/a.csv")),
                Some(Path::new("/nonexistent/m.json")),
                Some(Path::new("/nonexistent/e.json")),
            )
            .unwrap_err();
        assert!(matches!(err, BirdConcernError::FileNotFound(_)));
    }
}
