use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MoneyError, Result};
use crate::models::UnsignedAmountPolicy;
use crate::resolver::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::tokenizer::{LineOptions, DEFAULT_FALLBACK_DESCRIPTION};

pub const DB_FILE: &str = "moneymind.db";
const DEFAULT_OWNER: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default = "default_entry_policy")]
    pub entry_unsigned_policy: UnsignedAmountPolicy,
    /// Unsigned amounts in a typed block after a date-only line.
    #[serde(default = "default_import_policy")]
    pub entry_dated_policy: UnsignedAmountPolicy,
    #[serde(default = "default_import_policy")]
    pub import_unsigned_policy: UnsignedAmountPolicy,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_fallback_description")]
    pub fallback_description: String,
}

fn default_entry_policy() -> UnsignedAmountPolicy {
    UnsignedAmountPolicy::EntryDefaultExpense
}

fn default_import_policy() -> UnsignedAmountPolicy {
    UnsignedAmountPolicy::ImportDefaultIncome
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_fallback_description() -> String {
    DEFAULT_FALLBACK_DESCRIPTION.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            user_name: String::new(),
            entry_unsigned_policy: default_entry_policy(),
            entry_dated_policy: default_import_policy(),
            import_unsigned_policy: default_import_policy(),
            confidence_threshold: default_confidence_threshold(),
            fallback_description: default_fallback_description(),
        }
    }
}

impl Settings {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_path().join(DB_FILE)
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_path().join("models").join("category_classifier.json")
    }

    /// `--user` wins, then the configured name.
    pub fn owner(&self, flag: Option<&str>) -> String {
        flag.map(str::trim)
            .filter(|u| !u.is_empty())
            .or_else(|| Some(self.user_name.trim()).filter(|u| !u.is_empty()))
            .unwrap_or(DEFAULT_OWNER)
            .to_string()
    }

    pub fn entry_options(&self) -> LineOptions {
        LineOptions::new(self.entry_unsigned_policy)
            .with_dated_policy(self.entry_dated_policy)
            .with_fallback(&self.fallback_description)
    }

    pub fn import_options(&self) -> LineOptions {
        LineOptions::new(self.import_unsigned_policy).with_fallback(&self.fallback_description)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(MoneyError::Settings(format!(
                "confidence_threshold must be between 0 and 1, got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("moneymind")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("moneymind")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    settings.validate()?;
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| MoneyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
