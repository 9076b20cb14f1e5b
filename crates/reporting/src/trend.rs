//! Purchase trend model: single-feature ordinary least squares of purchase
//! amount against the purchase date, scored on a seeded hold-out split.
//!
//! Dates are converted to proleptic Gregorian ordinals (`0001-01-01` is day
//! 1) into a local feature vector; the shared purchase records are only read.
//! The split shuffles row indices with Fisher-Yates driven by
//! `ChaCha8Rng::seed_from_u64(seed)`; the first `ceil(n * test_fraction)`
//! shuffled indices are held out for testing.

use campaign_core::{CampaignError, CampaignResult, Purchase};
use chrono::{Datelike, NaiveDate};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub seed: u64,
    pub test_fraction: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
        }
    }
}

/// `amount = slope * ordinal + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEvaluation {
    pub model: LinearTrend,
    pub mean_squared_error: f64,
    pub mean_absolute_error: f64,
    /// Absent when the held-out amounts are all equal.
    pub r_squared: Option<f64>,
    pub train_size: usize,
    pub test_size: usize,
    pub seed: u64,
}

/// Day number with `0001-01-01` as day 1.
pub fn date_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// Shuffle `0..n` and split into `(train, test)` index sets.
pub fn train_test_split(n: usize, config: &SplitConfig) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let test_size = ((n as f64) * config.test_fraction).ceil() as usize;
    let test_size = test_size.min(n);
    let train = indices.split_off(test_size);
    (train, indices)
}

/// Closed-form least squares with intercept. A constant feature yields a
/// flat line through the mean of `y`.
pub fn fit_ols(x: &Array1<f64>, y: &Array1<f64>) -> CampaignResult<LinearTrend> {
    let (x_mean, y_mean) = match (x.mean(), y.mean()) {
        (Some(xm), Some(ym)) => (xm, ym),
        _ => {
            return Err(CampaignError::InsufficientData(
                "cannot fit a trend on zero rows".into(),
            ))
        }
    };

    let dx = x - x_mean;
    let dy = y - y_mean;
    let sxx = dx.dot(&dx);
    let slope = if sxx > 0.0 { dx.dot(&dy) / sxx } else { 0.0 };

    Ok(LinearTrend {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Fit the trend on the training split and score it on the held-out rows.
pub fn evaluate_trend(purchases: &[Purchase], config: &SplitConfig) -> CampaignResult<TrendEvaluation> {
    let ordinals: Vec<f64> = purchases
        .iter()
        .map(|p| date_ordinal(p.purchase_month) as f64)
        .collect();
    let amounts: Vec<f64> = purchases.iter().map(|p| p.purchase_amount).collect();

    let (train, test) = train_test_split(purchases.len(), config);
    if test.is_empty() || train.len() < 2 {
        return Err(CampaignError::InsufficientData(format!(
            "trend model needs at least 2 training rows and 1 test row, got {} purchases",
            purchases.len()
        )));
    }

    let select = |values: &[f64], idx: &[usize]| -> Array1<f64> {
        idx.iter().map(|&i| values[i]).collect()
    };
    let x_train = select(&ordinals, &train);
    let y_train = select(&amounts, &train);
    let x_test = select(&ordinals, &test);
    let y_test = select(&amounts, &test);

    let model = fit_ols(&x_train, &y_train)?;
    let predicted = x_test.mapv(|x| model.predict(x));
    let residuals = &y_test - &predicted;

    let n_test = test.len() as f64;
    let mse = residuals.dot(&residuals) / n_test;
    let mae = residuals.mapv(f64::abs).sum() / n_test;

    let y_test_mean = y_test.sum() / n_test;
    let ss_tot = y_test.mapv(|y| (y - y_test_mean).powi(2)).sum();
    let r_squared = (ss_tot > 0.0).then(|| 1.0 - residuals.dot(&residuals) / ss_tot);

    debug!(
        train = train.len(),
        test = test.len(),
        slope = model.slope,
        mse,
        mae,
        "Trend model evaluated"
    );

    Ok(TrendEvaluation {
        model,
        mean_squared_error: mse,
        mean_absolute_error: mae,
        r_squared,
        train_size: train.len(),
        test_size: test.len(),
        seed: config.seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly_purchases(count: usize, amount: impl Fn(usize) -> f64) -> Vec<Purchase> {
        (0..count)
            .map(|i| Purchase {
                customer_id: format!("c{i}").as_str().into(),
                purchase_month: ymd(2018 + (i / 12) as i32, (i % 12) as u32 + 1, 1),
                purchase_amount: amount(i),
            })
            .collect()
    }

    #[test]
    fn test_date_ordinal_epoch() {
        assert_eq!(date_ordinal(ymd(1, 1, 1)), 1);
        // Same value Python's date.toordinal() gives for 2019-01-01.
        assert_eq!(date_ordinal(ymd(2019, 1, 1)), 737_060);
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let (train, test) = train_test_split(11, &SplitConfig::default());
        assert_eq!(test.len(), 3); // ceil(11 * 0.2)
        assert_eq!(train.len(), 8);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic_per_seed() {
        let config = SplitConfig::default();
        assert_eq!(train_test_split(50, &config), train_test_split(50, &config));

        let other = SplitConfig {
            seed: 7,
            ..config
        };
        assert_ne!(train_test_split(50, &config), train_test_split(50, &other));
    }

    #[test]
    fn test_fit_ols_exact_line() {
        let x = Array1::from(vec![1.0, 2.0, 3.0, 4.0]);
        let y = x.mapv(|v| 2.0 * v + 1.0);
        let model = fit_ols(&x, &y).unwrap();
        assert!((model.slope - 2.0).abs() < 1e-12);
        assert!((model.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_ols_constant_feature() {
        let x = Array1::from(vec![5.0, 5.0, 5.0]);
        let y = Array1::from(vec![1.0, 2.0, 6.0]);
        let model = fit_ols(&x, &y).unwrap();
        assert_eq!(model.slope, 0.0);
        assert!((model.intercept - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_recovers_linear_trend() {
        let purchases = monthly_purchases(30, |_| 0.0)
            .into_iter()
            .map(|mut p| {
                p.purchase_amount = 0.5 * date_ordinal(p.purchase_month) as f64 - 368_000.0;
                p
            })
            .collect::<Vec<_>>();

        let eval = evaluate_trend(&purchases, &SplitConfig::default()).unwrap();
        assert_eq!(eval.test_size, 6);
        assert_eq!(eval.train_size, 24);
        assert!((eval.model.slope - 0.5).abs() < 1e-6);
        assert!(eval.mean_squared_error < 1e-6);
        assert!(eval.mean_absolute_error < 1e-3);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let purchases = monthly_purchases(40, |i| ((i * 37) % 11) as f64 * 12.5);
        let config = SplitConfig::default();
        let first = evaluate_trend(&purchases, &config).unwrap();
        let second = evaluate_trend(&purchases, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_evaluate_too_few_rows() {
        let purchases = monthly_purchases(2, |i| i as f64);
        assert!(matches!(
            evaluate_trend(&purchases, &SplitConfig::default()),
            Err(CampaignError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_evaluate_leaves_purchases_untouched() {
        let purchases = monthly_purchases(20, |i| i as f64 * 3.0);
        let before = purchases.clone();
        evaluate_trend(&purchases, &SplitConfig::default()).unwrap();
        assert_eq!(purchases, before);
    }
}
