//! Campaign evaluation report: runs every analysis stage over one loaded
//! dataset and renders the result as text or JSON.

use std::fmt;

use campaign_core::types::format_month;
use campaign_core::{AppConfig, CampaignDataset, CampaignResult, DateRange};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::attribution::{AttributionWindow, CampaignAttribution, CampaignAttributionEngine};
use crate::budget::{calculate_roi, CampaignVerdict, CostModel, RoiReport};
use crate::control::{control_group_purchases, ControlGroupSummary};
use crate::overlap::{customer_overlap, OverlapSummary};
use crate::statistics::{purchase_statistics, PurchaseStatistics};
use crate::trend::{evaluate_trend, SplitConfig, TrendEvaluation};

// ─── Types ──────────────────────────────────────────────────────────────────

/// First rows of one input table, already formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct TablePreview {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub previews: Vec<TablePreview>,
    pub overlap: OverlapSummary,
    pub attribution: CampaignAttribution,
    pub control: ControlGroupSummary,
    pub statistics: PurchaseStatistics,
    pub trend: TrendEvaluation,
    pub roi: RoiReport,
}

impl CampaignReport {
    pub fn is_successful(&self) -> bool {
        self.roi.verdict == CampaignVerdict::Successful
    }

    pub fn to_json(&self) -> CampaignResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable rendering with amounts suffixed by `currency`.
    pub fn text<'a>(&'a self, currency: &'a str) -> TextReport<'a> {
        TextReport {
            report: self,
            currency,
        }
    }
}

// ─── Evaluator ──────────────────────────────────────────────────────────────

pub struct CampaignEvaluator {
    attribution: CampaignAttributionEngine,
    control_period: DateRange,
    split: SplitConfig,
    cost_model: CostModel,
    preview_rows: usize,
}

impl CampaignEvaluator {
    pub fn new(
        window: AttributionWindow,
        control_period: DateRange,
        split: SplitConfig,
        cost_model: CostModel,
        preview_rows: usize,
    ) -> Self {
        Self {
            attribution: CampaignAttributionEngine::new(window),
            control_period,
            split,
            cost_model,
            preview_rows,
        }
    }

    pub fn from_config(config: &AppConfig) -> CampaignResult<Self> {
        Ok(Self::new(
            AttributionWindow::new(config.attribution.window_months),
            config.control_period.range()?,
            SplitConfig {
                seed: config.trend.seed,
                test_fraction: config.trend.test_fraction,
            },
            CostModel::new(config.fixed_costs, config.letter_cost),
            config.preview_rows,
        ))
    }

    /// Run all stages in dependency order. Every stage borrows the dataset
    /// immutably; derived representations stay local to the stage.
    pub fn evaluate(&self, dataset: &CampaignDataset, source: &str) -> CampaignResult<CampaignReport> {
        let previews = build_previews(dataset, self.preview_rows);

        let overlap = customer_overlap(&dataset.target, &dataset.control)?;
        info!(percentage = overlap.percentage, "Target/control overlap computed");

        let attribution = self.attribution.attribute(&dataset.purchases, &dataset.target);
        info!(
            in_campaign = attribution.in_campaign_total,
            out_of_campaign = attribution.out_of_campaign_total,
            "Target purchases attributed"
        );

        let control = control_group_purchases(&dataset.purchases, &dataset.control, self.control_period);
        info!(total = control.total_amount, "Control group purchases summed");

        let statistics = purchase_statistics(&dataset.purchases)?;

        let trend = evaluate_trend(&dataset.purchases, &self.split)?;
        info!(
            mse = trend.mean_squared_error,
            mae = trend.mean_absolute_error,
            "Trend model evaluated"
        );

        let roi = calculate_roi(
            &self.cost_model,
            dataset.target.len(),
            attribution.in_campaign_total,
        )?;
        info!(roi = roi.roi_percent, verdict = ?roi.verdict, "Campaign ROI computed");

        Ok(CampaignReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source: source.to_string(),
            previews,
            overlap,
            attribution,
            control,
            statistics,
            trend,
            roi,
        })
    }
}

pub fn build_previews(dataset: &CampaignDataset, rows: usize) -> Vec<TablePreview> {
    let columns = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();

    vec![
        TablePreview {
            name: "Target".into(),
            columns: columns(&["customer_id", "target_month"]),
            rows: dataset
                .target
                .iter()
                .take(rows)
                .map(|t| vec![t.customer_id.to_string(), format_month(t.target_month)])
                .collect(),
            total_rows: dataset.target.len(),
        },
        TablePreview {
            name: "Control".into(),
            columns: columns(&["customer_id"]),
            rows: dataset
                .control
                .iter()
                .take(rows)
                .map(|c| vec![c.customer_id.to_string()])
                .collect(),
            total_rows: dataset.control.len(),
        },
        TablePreview {
            name: "Purchases".into(),
            columns: columns(&["customer_id", "purchase_month", "purchase_amount"]),
            rows: dataset
                .purchases
                .iter()
                .take(rows)
                .map(|p| {
                    vec![
                        p.customer_id.to_string(),
                        format_month(p.purchase_month),
                        p.purchase_amount.to_string(),
                    ]
                })
                .collect(),
            total_rows: dataset.purchases.len(),
        },
    ]
}

// ─── Text rendering ─────────────────────────────────────────────────────────

pub struct TextReport<'a> {
    report: &'a CampaignReport,
    currency: &'a str,
}

impl fmt::Display for TablePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(col.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        writeln!(f, "{} ({} rows):", self.name, self.total_rows)?;
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:>w$}"))
            .collect();
        writeln!(f, "  {}", header.join("  "))?;
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, &w)| format!("{c:>w$}"))
                .collect();
            writeln!(f, "  {}", cells.join("  "))?;
        }
        writeln!(f, "Columns in {}: [{}]", self.name, self.columns.join(", "))
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        let cur = self.currency;

        writeln!(f, "Campaign evaluation for {}", r.source)?;
        writeln!(f)?;
        for preview in &r.previews {
            writeln!(f, "{preview}")?;
        }

        writeln!(
            f,
            "Target customers also in Control: {:.2}% ({} of {})",
            r.overlap.percentage, r.overlap.shared_customers, r.overlap.target_customers
        )?;
        writeln!(
            f,
            "Target purchases within the {}-month campaign window: {:.2} {cur} ({} purchases)",
            r.attribution.window_months,
            r.attribution.in_campaign_total,
            r.attribution.in_campaign_purchases
        )?;
        writeln!(
            f,
            "Target purchases outside the campaign window: {:.2} {cur} ({} purchases)",
            r.attribution.out_of_campaign_total, r.attribution.out_of_campaign_purchases
        )?;
        writeln!(
            f,
            "Control group purchases {}: {:.2} {cur} ({} purchases)",
            r.control.period, r.control.total_amount, r.control.purchases
        )?;
        writeln!(f)?;

        writeln!(f, "Average purchase amount: {:.2}", r.statistics.mean)?;
        writeln!(f, "Median purchase amount: {:.2}", r.statistics.median)?;
        writeln!(f, "Purchase amount standard deviation: {:.2}", r.statistics.std_dev)?;
        writeln!(
            f,
            "Trend model (seed {}, {} train / {} test rows): slope {:.6}, intercept {:.2}",
            r.trend.seed,
            r.trend.train_size,
            r.trend.test_size,
            r.trend.model.slope,
            r.trend.model.intercept
        )?;
        writeln!(f, "Model Mean Squared Error: {:.4}", r.trend.mean_squared_error)?;
        writeln!(f, "Model Mean Absolute Error: {:.4}", r.trend.mean_absolute_error)?;
        writeln!(f)?;

        writeln!(f, "Total campaign cost: {:.2} {cur}", r.roi.total_cost)?;
        writeln!(f, "Net campaign revenue: {:.2} {cur}", r.roi.net_revenue)?;
        writeln!(f, "Return on investment (ROI): {:.2}%", r.roi.roi_percent)?;
        writeln!(f)?;
        writeln!(f, "Final assessment:")?;
        match r.roi.verdict {
            CampaignVerdict::Successful => writeln!(f, "The campaign was financially successful."),
            CampaignVerdict::Unsuccessful => {
                writeln!(f, "The campaign was not financially successful.")
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
