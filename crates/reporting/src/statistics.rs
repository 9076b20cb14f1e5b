//! Descriptive statistics over purchase amounts.

use campaign_core::{CampaignError, CampaignResult, Purchase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (N - 1 denominator).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Statistics over every purchase, regardless of group membership.
pub fn purchase_statistics(purchases: &[Purchase]) -> CampaignResult<PurchaseStatistics> {
    let amounts: Vec<f64> = purchases.iter().map(|p| p.purchase_amount).collect();
    describe(&amounts)
}

pub fn describe(values: &[f64]) -> CampaignResult<PurchaseStatistics> {
    if values.is_empty() {
        return Err(CampaignError::EmptyInput(
            "no purchase amounts to describe".into(),
        ));
    }

    let mean = mean(values);
    Ok(PurchaseStatistics {
        count: values.len(),
        mean,
        median: median(values),
        std_dev: sample_std_dev(values, mean)?,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value; the two middle values are averaged for even counts.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_std_dev(values: &[f64], mean: f64) -> CampaignResult<f64> {
    if values.len() < 2 {
        return Err(CampaignError::InsufficientData(format!(
            "sample standard deviation needs at least 2 values, got {}",
            values.len()
        )));
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Ok((sum_sq / (values.len() - 1) as f64).sqrt())
}
