//! User settings for fintrack
//!
//! Stored as `config.json` in the base directory. Every field has a serde
//! default so older files keep loading as settings are added.

use serde::{Deserialize, Serialize};

use super::paths::FintrackPaths;
use crate::error::FintrackError;
use crate::models::Money;

/// Longest bill window accepted from config, in days
pub const MAX_DAY_WINDOW: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Limit given to an expense category with no positive limit of its
    /// own when a budget is generated
    #[serde(default = "default_budget_limit")]
    pub default_budget_limit: Money,

    /// Unpaid bills due within this many days are "due soon"
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,

    /// Window used for the upcoming-bills list
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: i64,

    /// Budget line usage at which it is flagged as near its limit
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_percent: f64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_budget_limit() -> Money {
    Money::from_major(500)
}

fn default_due_soon_days() -> i64 {
    3
}

fn default_upcoming_days() -> i64 {
    30
}

fn default_warning_threshold() -> f64 {
    80.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            default_budget_limit: default_budget_limit(),
            due_soon_days: default_due_soon_days(),
            upcoming_days: default_upcoming_days(),
            warning_threshold_percent: default_warning_threshold(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist yet
    pub fn load_or_create(paths: &FintrackPaths) -> Result<Self, FintrackError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Not persisted until the caller saves
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| FintrackError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| FintrackError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, paths: &FintrackPaths) -> Result<(), FintrackError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| FintrackError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| FintrackError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), FintrackError> {
        if !self.default_budget_limit.is_positive() {
            return Err(FintrackError::Config(
                "default_budget_limit must be greater than 0".into(),
            ));
        }
        for (name, days) in [("due_soon_days", self.due_soon_days), ("upcoming_days", self.upcoming_days)] {
            if !(0..=MAX_DAY_WINDOW).contains(&days) {
                return Err(FintrackError::Config(format!(
                    "{} must be between 0 and {}",
                    name, MAX_DAY_WINDOW
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.warning_threshold_percent) {
            return Err(FintrackError::Config(
                "warning_threshold_percent must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_budget_limit, Money::from_major(500));
        assert_eq!(settings.due_soon_days, 3);
        assert_eq!(settings.upcoming_days, 30);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FintrackPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.default_budget_limit = Money::from_major(250);
        settings.due_soon_days = 7;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FintrackPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"currency_symbol": "€"}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.currency_symbol, "€");
        assert_eq!(loaded.upcoming_days, 30);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FintrackPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"default_budget_limit": 0}"#).unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, FintrackError::Config(_)));
    }

    #[test]
    fn test_day_windows_are_capped() {
        let mut settings = Settings::default();
        settings.upcoming_days = MAX_DAY_WINDOW;
        assert!(settings.validate().is_ok());

        settings.upcoming_days = 200_000_000;
        assert!(matches!(settings.validate(), Err(FintrackError::Config(_))));

        settings.upcoming_days = 30;
        settings.due_soon_days = -1;
        assert!(matches!(settings.validate(), Err(FintrackError::Config(_))));
    }
}
