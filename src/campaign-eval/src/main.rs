//! Campaign Eval: measures a direct-mail campaign against its control group.
//!
//! Loads the Target / Control / Purchases tables, runs the evaluation and
//! prints the report to stdout.

use std::path::PathBuf;

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_reporting::CampaignEvaluator;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "campaign-eval")]
#[command(about = "Evaluate campaign effectiveness against a control group")]
#[command(version)]
struct Cli {
    /// Workbook (.xlsx/.xls/.ods) or directory of Target/Control/Purchases CSV files
    #[arg(long, short, env = "CAMPAIGN_EVAL__INPUT_PATH")]
    input: Option<PathBuf>,

    /// TOML config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Fixed campaign costs (overrides config)
    #[arg(long)]
    fixed_costs: Option<f64>,

    /// Cost per targeted customer (overrides config)
    #[arg(long)]
    letter_cost: Option<f64>,

    /// Rows shown in each table preview (overrides config)
    #[arg(long)]
    preview_rows: Option<usize>,

    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "campaign_eval=info,campaign_ingest=info,campaign_reporting=info".into()
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Apply CLI overrides
    if let Some(input) = cli.input {
        config.input_path = input;
    }
    if let Some(fixed_costs) = cli.fixed_costs {
        config.fixed_costs = fixed_costs;
    }
    if let Some(letter_cost) = cli.letter_cost {
        config.letter_cost = letter_cost;
    }
    if let Some(rows) = cli.preview_rows {
        config.preview_rows = rows;
    }
    config.validate().context("invalid configuration")?;

    info!(
        input = %config.input_path.display(),
        fixed_costs = config.fixed_costs,
        letter_cost = config.letter_cost,
        "Configuration loaded"
    );

    let dataset = campaign_ingest::load_dataset(&config.input_path)
        .with_context(|| format!("failed to load {}", config.input_path.display()))?;

    let evaluator = CampaignEvaluator::from_config(&config)?;
    let report = evaluator
        .evaluate(&dataset, &config.input_path.display().to_string())
        .context("campaign evaluation failed")?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.text(&config.currency));
    }

    Ok(())
}
