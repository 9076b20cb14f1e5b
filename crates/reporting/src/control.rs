//! Control group baseline: what the untargeted customers spent during a
//! fixed comparison period.

use std::collections::HashSet;

use campaign_core::{ControlCustomer, CustomerId, DateRange, Purchase};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlGroupSummary {
    pub period: DateRange,
    pub total_amount: f64,
    pub purchases: usize,
    /// Distinct control customers with at least one purchase in the period.
    pub purchasing_customers: usize,
}

/// Sum purchases by control customers dated inside `period` (inclusive).
/// Control purchases outside the period are dropped, not reassigned.
pub fn control_group_purchases(
    purchases: &[Purchase],
    control: &[ControlCustomer],
    period: DateRange,
) -> ControlGroupSummary {
    let control_ids: HashSet<&CustomerId> = control.iter().map(|c| &c.customer_id).collect();
    let mut buyers: HashSet<&CustomerId> = HashSet::new();
    let mut total_amount = 0.0;
    let mut count = 0;

    for purchase in purchases
        .iter()
        .filter(|p| control_ids.contains(&p.customer_id))
        .filter(|p| period.contains(p.purchase_month))
    {
        total_amount += purchase.purchase_amount;
        count += 1;
        buyers.insert(&purchase.customer_id);
    }

    debug!(%period, total = total_amount, purchases = count, "Control group aggregated");

    ControlGroupSummary {
        period,
        total_amount,
        purchases: count,
        purchasing_customers: buyers.len(),
    }
}
