//! Campaign cost and ROI calculation.

use campaign_core::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-campaign cost model: a fixed outlay plus one letter per targeted
/// customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub fixed_costs: f64,
    pub letter_cost: f64,
}

impl CostModel {
    pub fn new(fixed_costs: f64, letter_cost: f64) -> Self {
        Self {
            fixed_costs,
            letter_cost,
        }
    }

    /// `fixed_costs + targeted_customers * letter_cost`.
    pub fn total_cost(&self, targeted_customers: usize) -> f64 {
        self.fixed_costs + targeted_customers as f64 * self.letter_cost
    }
}

/// Whether the campaign paid for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignVerdict {
    Successful,
    Unsuccessful,
}

impl CampaignVerdict {
    /// Successful only for strictly positive net revenue.
    pub fn from_net_revenue(net_revenue: f64) -> Self {
        if net_revenue > 0.0 {
            Self::Successful
        } else {
            Self::Unsuccessful
        }
    }
}

/// Return-on-investment report for the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiReport {
    pub targeted_customers: usize,
    pub total_cost: f64,
    /// In-campaign purchases credited to the campaign.
    pub attributed_revenue: f64,
    /// `attributed_revenue - total_cost`.
    pub net_revenue: f64,
    /// `net_revenue / total_cost * 100`.
    pub roi_percent: f64,
    pub verdict: CampaignVerdict,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

pub fn calculate_roi(
    cost_model: &CostModel,
    targeted_customers: usize,
    attributed_revenue: f64,
) -> CampaignResult<RoiReport> {
    let total_cost = cost_model.total_cost(targeted_customers);
    if total_cost == 0.0 {
        return Err(CampaignError::DivisionByZero(
            "total campaign cost is zero; ROI is undefined".into(),
        ));
    }

    let net_revenue = attributed_revenue - total_cost;
    Ok(RoiReport {
        targeted_customers,
        total_cost,
        attributed_revenue,
        net_revenue,
        roi_percent: net_revenue / total_cost * 100.0,
        verdict: CampaignVerdict::from_net_revenue(net_revenue),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
