use crate::error::{BaxathonError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOCAL_API_URL: &str = "http://localhost:3000";
const LOCAL_PREDICT_URL: &str = "http://localhost:8000";
const LOCAL_ASSET_URL: &str = "http://localhost:5173/backgrounds";

/// 接続先の環境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "dev" | "development" => Ok(Environment::Local),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}. Use local or production", s)),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "local"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub environment: Environment,
    /// チャットAPI（未指定時は環境のデフォルト）
    pub api_base_url: Option<String>,
    /// 画像判定API
    pub predict_base_url: Option<String>,
    /// 背景画像の配信元
    pub asset_base_url: Option<String>,
    pub api_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            api_base_url: None,
            predict_base_url: None,
            asset_base_url: None,
            api_version: "v1".into(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書きする
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BaxathonError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("baxathon").join("config.json"))
    }

    /// `BAXATHON_*` 環境変数で上書き
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("BAXATHON_ENV").and_then(|v| v.parse().ok()) {
            self.environment = env;
        }
        if let Some(url) = lookup("BAXATHON_API_URL") {
            self.api_base_url = Some(url);
        }
        if let Some(url) = lookup("BAXATHON_PREDICT_URL") {
            self.predict_base_url = Some(url);
        }
        if let Some(url) = lookup("BAXATHON_ASSET_URL") {
            self.asset_base_url = Some(url);
        }
    }

    pub fn set_environment(&mut self, environment: Environment) -> Result<()> {
        self.environment = environment;
        self.save()
    }

    pub fn api_base_url(&self) -> Result<String> {
        self.resolve(self.api_base_url.as_deref(), LOCAL_API_URL, "api_base_url")
    }

    pub fn predict_base_url(&self) -> Result<String> {
        self.resolve(self.predict_base_url.as_deref(), LOCAL_PREDICT_URL, "predict_base_url")
    }

    pub fn asset_base_url(&self) -> Result<String> {
        self.resolve(self.asset_base_url.as_deref(), LOCAL_ASSET_URL, "asset_base_url")
    }

    /// 本番環境ではURLの明示指定が必須
    fn resolve(&self, explicit: Option<&str>, local: &str, field: &str) -> Result<String> {
        match (explicit, self.environment) {
            (Some(url), _) => Ok(url.trim_end_matches('/').to_string()),
            (None, Environment::Local) => Ok(local.to_string()),
            (None, Environment::Production) => Err(BaxathonError::Config(format!(
                "本番環境の {} が設定されていません",
                field
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_local_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url().unwrap(), "http://localhost:3000");
        assert_eq!(config.predict_base_url().unwrap(), "http://localhost:8000");
        assert_eq!(config.api_version, "v1");
    }

    #[test]
    fn test_production_requires_explicit_url() {
        let config = Config {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(matches!(config.api_base_url(), Err(BaxathonError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BAXATHON_ENV", "prod"),
            ("BAXATHON_API_URL", "https://chat.example.com/"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.api_base_url().unwrap(), "https://chat.example.com");
        assert!(config.predict_base_url().is_err());
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Local);
        assert!("staging".parse::<Environment>().is_err());
    }
}
