//! User settings
//!
//! Defaults applied when a calculation request leaves them unspecified, plus
//! presentation preferences for reports.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::paths::CamPaths;
use crate::error::CamError;
use crate::models::{AllocationMethod, CreditPrecedence, Money};

/// User settings for the CAM engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Method used when a request does not name one
    #[serde(default)]
    pub default_allocation_method: AllocationMethod,

    /// Credit precedence applied to leases that do not set one
    #[serde(default)]
    pub default_credit_precedence: CreditPrecedence,

    /// Write lifecycle transitions to the audit log
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Allocation variance above this amount is flagged in reports
    #[serde(default = "default_variance_tolerance")]
    pub variance_tolerance: Money,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_true() -> bool {
    true
}

fn default_variance_tolerance() -> Money {
    Money::new(Decimal::new(1, 2))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_allocation_method: AllocationMethod::default(),
            default_credit_precedence: CreditPrecedence::default(),
            audit_enabled: default_true(),
            variance_tolerance: default_variance_tolerance(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &CamPaths) -> Result<Self, CamError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| CamError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| CamError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CamPaths) -> Result<(), CamError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CamError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CamError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Format an amount with the configured currency symbol
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }
}
