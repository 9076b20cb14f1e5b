//! Campaign effectiveness reporting: target/control overlap, window-based
//! purchase attribution, control baseline, purchase statistics, trend model,
//! and cost/ROI evaluation.

pub mod attribution;
pub mod budget;
pub mod control;
pub mod overlap;
pub mod report_builder;
pub mod statistics;
pub mod trend;

pub use attribution::{is_within_campaign, AttributionWindow, CampaignAttributionEngine};
pub use budget::{calculate_roi, CampaignVerdict, CostModel, RoiReport};
pub use control::control_group_purchases;
pub use overlap::customer_overlap;
pub use report_builder::{CampaignEvaluator, CampaignReport};
pub use statistics::purchase_statistics;
pub use trend::{evaluate_trend, SplitConfig};
