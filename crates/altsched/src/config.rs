//! Application configuration: group→URL mapping, subject abbreviations,
//! cache tuning.
//!
//! Ships with the reference deployment built in; a JSON file can override
//! any of it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_user_db_path() -> String {
    "users.db".to_string()
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Study group name to schedule page URL.
    pub groups: HashMap<String, String>,

    /// Full subject name to compact display name.
    #[serde(default = "default_abbreviations")]
    pub abbreviations: HashMap<String, String>,

    /// Seconds before a cached schedule is considered stale.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// SQLite file backing the user preference store.
    #[serde(default = "default_user_db_path")]
    pub user_db_path: String,
}

impl AppConfig {
    /// The reference deployment: three ИБ-4x groups on the AltSTU site.
    pub fn builtin() -> Self {
        let groups = [
            ("ИБ-41", "https://www.altstu.ru/m/s/7000020491/"),
            ("ИБ-42", "https://www.altstu.ru/m/s/7000020492/"),
            ("ИБ-43", "https://www.altstu.ru/m/s/7000020493/"),
        ]
        .into_iter()
        .map(|(g, u)| (g.to_string(), u.to_string()))
        .collect();

        Self {
            groups,
            abbreviations: default_abbreviations(),
            cache_ttl_secs: default_cache_ttl_secs(),
            user_db_path: default_user_db_path(),
        }
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Arguments
    /// * `path` - Path to the config file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Parsed and validated configuration
    /// * `Err` - If the file can't be read, parsed, or validated
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every group maps to a well-formed URL.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.groups.is_empty() {
            return Err("config contains no groups".into());
        }
        for (group, url) in &self.groups {
            Url::parse(url)
                .map_err(|e| format!("group {group} has invalid URL '{url}': {e}"))?;
        }
        Ok(())
    }

    /// URL of the schedule page for a group, if the group is known.
    pub fn group_url(&self, group: &str) -> Option<&str> {
        self.groups.get(group).map(String::as_str)
    }

    /// Known group names, sorted for stable display.
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Stock abbreviation table; tuned for readability on a phone screen.
pub fn default_abbreviations() -> HashMap<String, String> {
    [
        ("Дискретная математика и теория чисел", "Дискретка"),
        ("Аппаратные средства вычислительной техники", "Аппаратка"),
        ("Информационные процессы и системы", "ИПИС"),
        ("Иностранный язык", "Ин. яз"),
        ("Математический анализ", "Матан"),
        ("Физическая культура и спорт", "Физра"),
        ("История России", "История"),
        ("Документоведение", "Док-ведение"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_is_valid() {
        let config = AppConfig::builtin();
        assert!(config.validate().is_ok());
        assert_eq!(config.group_names(), vec!["ИБ-41", "ИБ-42", "ИБ-43"]);
        assert_eq!(config.cache_ttl_secs, 3600);
    }

    #[test]
    fn test_unknown_group_has_no_url() {
        assert!(AppConfig::builtin().group_url("ПИ-11").is_none());
    }

    #[test]
    fn test_json_overrides_with_defaults_filled_in() {
        let config: AppConfig = serde_json::from_str(
            r#"{"groups": {"ИБ-41": "https://example.org/schedule/"}}"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(
            config.abbreviations.get("Математический анализ").unwrap(),
            "Матан"
        );
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let config: AppConfig =
            serde_json::from_str(r#"{"groups": {"ИБ-41": "не ссылка"}}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
