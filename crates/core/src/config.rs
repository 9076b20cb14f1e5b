use crate::error::{CampaignError, CampaignResult};
use crate::types::DateRange;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CAMPAIGN_EVAL__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    #[serde(default = "default_fixed_costs")]
    pub fixed_costs: f64,
    #[serde(default = "default_letter_cost")]
    pub letter_cost: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default)]
    pub control_period: ControlPeriodConfig,
    #[serde(default)]
    pub attribution: AttributionConfig,
    #[serde(default)]
    pub trend: TrendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControlPeriodConfig {
    #[serde(default = "default_control_start")]
    pub start: NaiveDate,
    #[serde(default = "default_control_end")]
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_window_months")]
    pub window_months: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
}

// Default functions
fn default_input_path() -> PathBuf {
    PathBuf::from("Data_kampan.xlsx")
}
fn default_fixed_costs() -> f64 {
    38_000.0
}
fn default_letter_cost() -> f64 {
    15.0
}
fn default_currency() -> String {
    "Kč".to_string()
}
fn default_preview_rows() -> usize {
    5
}
fn default_control_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).expect("2019-01-01 is a valid date")
}
fn default_control_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 6, 30).expect("2019-06-30 is a valid date")
}
fn default_window_months() -> u32 {
    3
}
fn default_seed() -> u64 {
    42
}
fn default_test_fraction() -> f64 {
    0.2
}

impl Default for ControlPeriodConfig {
    fn default() -> Self {
        Self {
            start: default_control_start(),
            end: default_control_end(),
        }
    }
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            window_months: default_window_months(),
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            test_fraction: default_test_fraction(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            fixed_costs: default_fixed_costs(),
            letter_cost: default_letter_cost(),
            currency: default_currency(),
            preview_rows: default_preview_rows(),
            control_period: ControlPeriodConfig::default(),
            attribution: AttributionConfig::default(),
            trend: TrendConfig::default(),
        }
    }
}

impl ControlPeriodConfig {
    pub fn range(&self) -> CampaignResult<DateRange> {
        DateRange::new(self.start, self.end)
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(file: Option<&Path>) -> CampaignResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_EVAL")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no analysis run could make sense of.
    pub fn validate(&self) -> CampaignResult<()> {
        if !self.fixed_costs.is_finite() || self.fixed_costs < 0.0 {
            return Err(CampaignError::Config(format!(
                "fixed_costs must be a non-negative number, got {}",
                self.fixed_costs
            )));
        }
        if !self.letter_cost.is_finite() || self.letter_cost < 0.0 {
            return Err(CampaignError::Config(format!(
                "letter_cost must be a non-negative number, got {}",
                self.letter_cost
            )));
        }
        if !(self.trend.test_fraction > 0.0 && self.trend.test_fraction < 1.0) {
            return Err(CampaignError::Config(format!(
                "trend.test_fraction must be in (0, 1), got {}",
                self.trend.test_fraction
            )));
        }
        self.control_period.range()?;
        Ok(())
    }
}
