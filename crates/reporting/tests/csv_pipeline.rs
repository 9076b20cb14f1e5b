//! End-to-end run: CSV sheets on disk -> loader -> evaluator -> report.

use std::fs;

use campaign_core::{AppConfig, CampaignError};
use campaign_reporting::{CampaignEvaluator, CampaignVerdict};

fn write_sheets(dir: &std::path::Path, purchases: &str) {
    fs::write(
        dir.join("Target.csv"),
        "customer_id,target_month\n1,2019-Jan\n2,2019-Feb\n3,2019-Mar\n4,2019-Apr\n",
    )
    .unwrap();
    fs::write(dir.join("Control.csv"), "customer_id\n4\n10\n11\n").unwrap();
    fs::write(dir.join("Purchases.csv"), purchases).unwrap();
}

#[test]
fn test_full_run_from_csv_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_sheets(
        dir.path(),
        "customer_id,purchase_month,purchase_amount\n\
         1,2019-Jan,1000\n\
         1,2019-Apr,2000\n\
         1,2019-May,400\n\
         2,2019-Jan,300\n\
         3,2019-Jun,500\n\
         10,2019-Jun,700\n\
         10,2019-Jul,900\n\
         11,2019-Feb,50\n\
         99,2019-Mar,80\n\
         4,2019-Aug,60\n",
    );

    let dataset = campaign_ingest::load_dataset(dir.path()).unwrap();
    let config = AppConfig {
        fixed_costs: 1000.0,
        letter_cost: 10.0,
        ..AppConfig::default()
    };
    let report = CampaignEvaluator::from_config(&config)
        .unwrap()
        .evaluate(&dataset, "fixture")
        .unwrap();

    assert!((report.overlap.percentage - 25.0).abs() < 1e-9);
    // 1: Jan + Apr in, May out; 2: Jan before window; 3: Jun in; 4: Aug after window.
    assert!((report.attribution.in_campaign_total - 3500.0).abs() < 1e-9);
    assert!((report.attribution.out_of_campaign_total - 760.0).abs() < 1e-9);
    assert_eq!(report.attribution.unattributed_purchases, 4);
    // Control 4 (Aug) and 10 (Jul) are outside Jan-Jun.
    assert!((report.control.total_amount - 750.0).abs() < 1e-9);
    assert_eq!(report.statistics.count, 10);
    assert_eq!(report.roi.total_cost, 1040.0);
    assert!((report.roi.net_revenue - 2460.0).abs() < 1e-9);
    assert_eq!(report.roi.verdict, CampaignVerdict::Successful);
}

#[test]
fn test_malformed_purchase_month_stops_run() {
    let dir = tempfile::tempdir().unwrap();
    write_sheets(
        dir.path(),
        "customer_id,purchase_month,purchase_amount\n1,Jan 2019,10\n",
    );
    assert!(matches!(
        campaign_ingest::load_dataset(dir.path()),
        Err(CampaignError::DateParse { .. })
    ));
}
