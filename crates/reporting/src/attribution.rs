//! Campaign attribution: credits each target customer's purchases to the
//! campaign when they land inside the attribution window that opens at the
//! customer's target month.

use std::collections::HashMap;

use campaign_core::{CustomerId, Purchase, TargetCustomer};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Closed window `[target_month, target_month + months]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionWindow {
    pub months: u32,
}

impl AttributionWindow {
    pub fn new(months: u32) -> Self {
        Self { months }
    }

    /// Last date still credited to the campaign, `None` past the calendar's end.
    pub fn end_for(&self, target_month: NaiveDate) -> Option<NaiveDate> {
        target_month.checked_add_months(Months::new(self.months))
    }

    pub fn contains(&self, target_month: NaiveDate, purchase_month: NaiveDate) -> bool {
        is_within_campaign(target_month, purchase_month, self.months)
    }
}

impl Default for AttributionWindow {
    fn default() -> Self {
        Self::new(3)
    }
}

/// `target_month <= purchase_month <= target_month + window_months`, both
/// bounds inclusive.
pub fn is_within_campaign(
    target_month: NaiveDate,
    purchase_month: NaiveDate,
    window_months: u32,
) -> bool {
    if purchase_month < target_month {
        return false;
    }
    target_month
        .checked_add_months(Months::new(window_months))
        .map_or(true, |end| purchase_month <= end)
}

/// A purchase left-joined against the target table.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedPurchase<'a> {
    pub purchase: &'a Purchase,
    /// `None` when the purchasing customer was never targeted.
    pub target_month: Option<NaiveDate>,
    pub in_campaign: bool,
}

/// In/out-of-campaign totals for the target group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAttribution {
    pub window_months: u32,
    pub in_campaign_total: f64,
    pub out_of_campaign_total: f64,
    pub in_campaign_purchases: usize,
    pub out_of_campaign_purchases: usize,
    /// Purchases by customers absent from the target table.
    pub unattributed_purchases: usize,
}

impl CampaignAttribution {
    /// Everything the target group bought, inside or outside the window.
    pub fn target_total(&self) -> f64 {
        self.in_campaign_total + self.out_of_campaign_total
    }
}

pub struct CampaignAttributionEngine {
    window: AttributionWindow,
}

impl CampaignAttributionEngine {
    pub fn new(window: AttributionWindow) -> Self {
        Self { window }
    }

    /// Pair every purchase with its customer's target month (if any) and
    /// evaluate the window once per purchase row.
    pub fn join<'a>(
        &self,
        purchases: &'a [Purchase],
        target: &[TargetCustomer],
    ) -> Vec<AttributedPurchase<'a>> {
        let target_months: HashMap<&CustomerId, NaiveDate> = target
            .iter()
            .map(|t| (&t.customer_id, t.target_month))
            .collect();

        purchases
            .iter()
            .map(|purchase| {
                let target_month = target_months.get(&purchase.customer_id).copied();
                let in_campaign = target_month
                    .is_some_and(|month| self.window.contains(month, purchase.purchase_month));
                AttributedPurchase {
                    purchase,
                    target_month,
                    in_campaign,
                }
            })
            .collect()
    }

    /// Split target-group purchase amounts into in- and out-of-campaign sums.
    pub fn attribute(&self, purchases: &[Purchase], target: &[TargetCustomer]) -> CampaignAttribution {
        let mut result = CampaignAttribution {
            window_months: self.window.months,
            in_campaign_total: 0.0,
            out_of_campaign_total: 0.0,
            in_campaign_purchases: 0,
            out_of_campaign_purchases: 0,
            unattributed_purchases: 0,
        };

        for row in self.join(purchases, target) {
            match (row.target_month, row.in_campaign) {
                (None, _) => result.unattributed_purchases += 1,
                (Some(_), true) => {
                    result.in_campaign_total += row.purchase.purchase_amount;
                    result.in_campaign_purchases += 1;
                }
                (Some(_), false) => {
                    result.out_of_campaign_total += row.purchase.purchase_amount;
                    result.out_of_campaign_purchases += 1;
                }
            }
        }

        debug!(
            in_campaign = result.in_campaign_total,
            out_of_campaign = result.out_of_campaign_total,
            unattributed = result.unattributed_purchases,
            "Campaign attribution computed"
        );
        result
    }
}

impl Default for CampaignAttributionEngine {
    fn default() -> Self {
        Self::new(AttributionWindow::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn target(id: &str, month: NaiveDate) -> TargetCustomer {
        TargetCustomer {
            customer_id: id.into(),
            target_month: month,
        }
    }

    fn purchase(id: &str, month: NaiveDate, amount: f64) -> Purchase {
        Purchase {
            customer_id: id.into(),
            purchase_month: month,
            purchase_amount: amount,
        }
    }

    // 1. Window predicate -----------------------------------------------

    #[test]
    fn test_window_boundaries_inclusive() {
        let t = ymd(2019, 1, 1);
        assert!(is_within_campaign(t, ymd(2019, 1, 1), 3));
        assert!(is_within_campaign(t, ymd(2019, 2, 1), 3));
        assert!(is_within_campaign(t, ymd(2019, 4, 1), 3));
    }

    #[test]
    fn test_window_outside_bounds() {
        let t = ymd(2019, 1, 1);
        assert!(!is_within_campaign(t, ymd(2019, 4, 2), 3));
        assert!(!is_within_campaign(t, ymd(2019, 5, 1), 3));
        assert!(!is_within_campaign(t, ymd(2018, 12, 1), 3));
    }

    #[test]
    fn test_window_crosses_year_end() {
        let t = ymd(2019, 11, 1);
        assert!(is_within_campaign(t, ymd(2020, 2, 1), 3));
        assert!(!is_within_campaign(t, ymd(2020, 3, 1), 3));
        assert_eq!(AttributionWindow::new(3).end_for(t), Some(ymd(2020, 2, 1)));
    }

    #[test]
    fn test_zero_month_window() {
        let t = ymd(2019, 5, 1);
        assert!(is_within_campaign(t, t, 0));
        assert!(!is_within_campaign(t, ymd(2019, 6, 1), 0));
    }

    // 2. Join + aggregation ---------------------------------------------

    #[test]
    fn test_attribute_splits_target_purchases() {
        let targets = vec![target("a", ymd(2019, 1, 1)), target("b", ymd(2019, 3, 1))];
        let purchases = vec![
            purchase("a", ymd(2019, 1, 1), 100.0), // in: lower bound
            purchase("a", ymd(2019, 4, 1), 50.0),  // in: upper bound
            purchase("a", ymd(2019, 5, 1), 30.0),  // out: after window
            purchase("b", ymd(2019, 2, 1), 20.0),  // out: before target month
            purchase("b", ymd(2019, 3, 1), 10.0),  // in
            purchase("z", ymd(2019, 1, 1), 999.0), // not a target customer
        ];

        let result = CampaignAttributionEngine::default().attribute(&purchases, &targets);
        assert!((result.in_campaign_total - 160.0).abs() < 1e-9);
        assert!((result.out_of_campaign_total - 50.0).abs() < 1e-9);
        assert_eq!(result.in_campaign_purchases, 3);
        assert_eq!(result.out_of_campaign_purchases, 2);
        assert_eq!(result.unattributed_purchases, 1);
    }

    #[test]
    fn test_partitions_cover_target_purchases_exactly() {
        let targets = vec![target("a", ymd(2019, 2, 1)), target("b", ymd(2019, 6, 1))];
        let purchases: Vec<Purchase> = (1..=12)
            .flat_map(|m| {
                vec![
                    purchase("a", ymd(2019, m, 1), m as f64),
                    purchase("b", ymd(2019, m, 1), 10.0 * m as f64),
                    purchase("c", ymd(2019, m, 1), 1000.0),
                ]
            })
            .collect();

        let engine = CampaignAttributionEngine::default();
        let result = engine.attribute(&purchases, &targets);

        let target_sum: f64 = purchases
            .iter()
            .filter(|p| p.customer_id.as_str() != "c")
            .map(|p| p.purchase_amount)
            .sum();
        assert!((result.target_total() - target_sum).abs() < 1e-9);
        assert_eq!(
            result.in_campaign_purchases + result.out_of_campaign_purchases,
            24
        );
        assert_eq!(result.unattributed_purchases, 12);

        for row in engine.join(&purchases, &targets) {
            if row.target_month.is_none() {
                assert!(!row.in_campaign);
            }
        }
    }

    #[test]
    fn test_join_keeps_every_purchase() {
        let targets = vec![target("a", ymd(2019, 1, 1))];
        let purchases = vec![
            purchase("a", ymd(2019, 2, 1), 1.0),
            purchase("x", ymd(2019, 2, 1), 2.0),
        ];
        let joined = CampaignAttributionEngine::default().join(&purchases, &targets);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].target_month, Some(ymd(2019, 1, 1)));
        assert!(joined[0].in_campaign);
        assert_eq!(joined[1].target_month, None);
    }

    #[test]
    fn test_empty_inputs_yield_zero_totals() {
        let result = CampaignAttributionEngine::default().attribute(&[], &[]);
        assert_eq!(result.in_campaign_total, 0.0);
        assert_eq!(result.out_of_campaign_total, 0.0);
        assert_eq!(result.unattributed_purchases, 0);
    }
}
