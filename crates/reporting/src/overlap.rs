//! Target/control overlap: how many targeted customers also sit in the
//! control group.

use std::collections::HashSet;

use campaign_core::{CampaignError, CampaignResult, ControlCustomer, CustomerId, TargetCustomer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapSummary {
    pub target_customers: usize,
    pub shared_customers: usize,
    /// Share of target customers also in control, 0 to 100.
    pub percentage: f64,
}

pub fn customer_overlap(
    target: &[TargetCustomer],
    control: &[ControlCustomer],
) -> CampaignResult<OverlapSummary> {
    if target.is_empty() {
        return Err(CampaignError::EmptyInput(
            "target group is empty; overlap percentage is undefined".into(),
        ));
    }

    let control_ids: HashSet<&CustomerId> = control.iter().map(|c| &c.customer_id).collect();
    let shared = target
        .iter()
        .filter(|t| control_ids.contains(&t.customer_id))
        .count();

    Ok(OverlapSummary {
        target_customers: target.len(),
        shared_customers: shared,
        percentage: shared as f64 / target.len() as f64 * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn targets(ids: &[&str]) -> Vec<TargetCustomer> {
        let month = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        ids.iter()
            .map(|id| TargetCustomer {
                customer_id: (*id).into(),
                target_month: month,
            })
            .collect()
    }

    fn controls(ids: &[&str]) -> Vec<ControlCustomer> {
        ids.iter()
            .map(|id| ControlCustomer {
                customer_id: (*id).into(),
            })
            .collect()
    }

    #[test]
    fn test_partial_overlap() {
        let summary =
            customer_overlap(&targets(&["1", "2", "3", "4"]), &controls(&["2", "4", "9"])).unwrap();
        assert_eq!(summary.shared_customers, 2);
        assert!((summary.percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_and_no_overlap() {
        let full = customer_overlap(&targets(&["1", "2"]), &controls(&["2", "1", "3"])).unwrap();
        assert_eq!(full.percentage, 100.0);

        let none = customer_overlap(&targets(&["1", "2"]), &controls(&[])).unwrap();
        assert_eq!(none.percentage, 0.0);
    }

    #[test]
    fn test_empty_target_is_error() {
        let err = customer_overlap(&[], &controls(&["1"])).unwrap_err();
        assert!(matches!(err, CampaignError::EmptyInput(_)));
    }
}
