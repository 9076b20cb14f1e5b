use crate::error::{CampaignError, CampaignResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque customer identifier. Only equality is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A customer selected to receive the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCustomer {
    pub customer_id: CustomerId,
    /// First day of the month the customer was targeted.
    pub target_month: NaiveDate,
}

/// A customer held out of the campaign as a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCustomer {
    pub customer_id: CustomerId,
}

/// A single purchase transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub customer_id: CustomerId,
    /// First day of the month the purchase happened in.
    pub purchase_month: NaiveDate,
    pub purchase_amount: f64,
}

/// The three input tables, loaded once and shared read-only by every
/// analysis stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignDataset {
    pub target: Vec<TargetCustomer>,
    pub control: Vec<ControlCustomer>,
    pub purchases: Vec<Purchase>,
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CampaignResult<Self> {
        if start > end {
            return Err(CampaignError::Config(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Normalise any date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).unwrap_or(date)
}

/// Parse a `YYYY-Mon` month label (e.g. `2019-Jan`) into the first day of
/// that month. The month abbreviation is matched case-insensitively.
pub fn parse_month(text: &str) -> CampaignResult<NaiveDate> {
    let trimmed = text.trim();
    let (year, month) = trimmed
        .split_once('-')
        .ok_or_else(|| CampaignError::date_parse(text, "missing '-' separator"))?;

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CampaignError::date_parse(text, "year must be four digits"));
    }
    if month.len() != 3 {
        return Err(CampaignError::date_parse(
            text,
            "month must be a three-letter abbreviation",
        ));
    }

    NaiveDate::parse_from_str(&format!("{year}-{month}-01"), "%Y-%b-%d")
        .map_err(|e| CampaignError::date_parse(text, e.to_string()))
}

/// Render a month as `YYYY-Mon`, the inverse of [`parse_month`].
pub fn format_month(date: NaiveDate) -> String {
    date.format("%Y-%b").to_string()
}
