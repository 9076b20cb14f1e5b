//! Typed conversion of raw sheets into campaign records.

use std::collections::HashSet;
use std::path::Path;

use campaign_core::types::{month_start, parse_month};
use campaign_core::{
    CampaignDataset, CampaignError, CampaignResult, ControlCustomer, CustomerId, Purchase,
    TargetCustomer,
};
use chrono::NaiveDate;
use tracing::info;

use crate::adapters::{open_source, SheetAdapter};
use crate::types::{Cell, SheetTable};

pub const TARGET_SHEET: &str = "Target";
pub const CONTROL_SHEET: &str = "Control";
pub const PURCHASES_SHEET: &str = "Purchases";

/// Open `path` and load the three campaign tables.
pub fn load_dataset(path: &Path) -> CampaignResult<CampaignDataset> {
    let mut source = open_source(path)?;
    load_dataset_from(source.as_mut())
}

/// Load the three campaign tables from an already opened source.
pub fn load_dataset_from(source: &mut dyn SheetAdapter) -> CampaignResult<CampaignDataset> {
    let target = parse_target(&source.read_sheet(TARGET_SHEET)?)?;
    let control = parse_control(&source.read_sheet(CONTROL_SHEET)?)?;
    let purchases = parse_purchases(&source.read_sheet(PURCHASES_SHEET)?)?;

    info!(
        source = %source.describe(),
        target = target.len(),
        control = control.len(),
        purchases = purchases.len(),
        "Campaign dataset loaded"
    );

    Ok(CampaignDataset {
        target,
        control,
        purchases,
    })
}

pub fn parse_target(table: &SheetTable) -> CampaignResult<Vec<TargetCustomer>> {
    let id_col = table.column_index("customer_id")?;
    let month_col = table.column_index("target_month")?;
    let mut seen = HashSet::new();

    (0..table.rows.len())
        .map(|row| {
            let customer_id = customer_id_cell(table, row, id_col)?;
            ensure_unique(&mut seen, &customer_id, table, row)?;
            let target_month = month_cell(table, row, month_col)?;
            Ok(TargetCustomer {
                customer_id,
                target_month,
            })
        })
        .collect()
}

pub fn parse_control(table: &SheetTable) -> CampaignResult<Vec<ControlCustomer>> {
    let id_col = table.column_index("customer_id")?;
    let mut seen = HashSet::new();

    (0..table.rows.len())
        .map(|row| {
            let customer_id = customer_id_cell(table, row, id_col)?;
            ensure_unique(&mut seen, &customer_id, table, row)?;
            Ok(ControlCustomer { customer_id })
        })
        .collect()
}

pub fn parse_purchases(table: &SheetTable) -> CampaignResult<Vec<Purchase>> {
    let id_col = table.column_index("customer_id")?;
    let month_col = table.column_index("purchase_month")?;
    let amount_col = table.column_index("purchase_amount")?;

    (0..table.rows.len())
        .map(|row| {
            Ok(Purchase {
                customer_id: customer_id_cell(table, row, id_col)?,
                purchase_month: month_cell(table, row, month_col)?,
                purchase_amount: amount_cell(table, row, amount_col)?,
            })
        })
        .collect()
}

fn location(table: &SheetTable, row: usize, col: usize) -> String {
    format!(
        "sheet '{}', row {}, column '{}'",
        table.name,
        table.display_row(row),
        table.columns[col]
    )
}

fn customer_id_cell(table: &SheetTable, row: usize, col: usize) -> CampaignResult<CustomerId> {
    match table.cell(row, col) {
        Cell::Text(s) => Ok(CustomerId::new(s.clone())),
        // Integral ids beyond i64 keep their float text instead of saturating.
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            Ok(CustomerId::new(format!("{}", *n as i64)))
        }
        Cell::Number(n) => Ok(CustomerId::new(n.to_string())),
        Cell::Date(d) => Ok(CustomerId::new(d.to_string())),
        Cell::Empty => Err(CampaignError::DataLoad(format!(
            "missing customer_id at {}",
            location(table, row, col)
        ))),
    }
}

fn month_cell(table: &SheetTable, row: usize, col: usize) -> CampaignResult<NaiveDate> {
    match table.cell(row, col) {
        Cell::Text(s) => parse_month(s).map_err(|e| match e {
            CampaignError::DateParse { value, context } => CampaignError::DateParse {
                value,
                context: format!("{context} at {}", location(table, row, col)),
            },
            other => other,
        }),
        Cell::Date(d) => Ok(month_start(*d)),
        Cell::Number(n) => Err(CampaignError::date_parse(
            n.to_string(),
            location(table, row, col),
        )),
        Cell::Empty => Err(CampaignError::date_parse(
            "",
            format!("empty month at {}", location(table, row, col)),
        )),
    }
}

fn amount_cell(table: &SheetTable, row: usize, col: usize) -> CampaignResult<f64> {
    let amount = match table.cell(row, col) {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.parse::<f64>().map_err(|_| {
            CampaignError::DataLoad(format!(
                "purchase_amount '{s}' is not a number at {}",
                location(table, row, col)
            ))
        })?,
        other => {
            return Err(CampaignError::DataLoad(format!(
                "purchase_amount {other:?} is not a number at {}",
                location(table, row, col)
            )))
        }
    };

    if !amount.is_finite() || amount < 0.0 {
        return Err(CampaignError::DataLoad(format!(
            "purchase_amount must be a non-negative number, got {amount} at {}",
            location(table, row, col)
        )));
    }
    Ok(amount)
}

fn ensure_unique(
    seen: &mut HashSet<CustomerId>,
    id: &CustomerId,
    table: &SheetTable,
    row: usize,
) -> CampaignResult<()> {
    if seen.insert(id.clone()) {
        Ok(())
    } else {
        Err(CampaignError::DataLoad(format!(
            "duplicate customer_id '{}' in sheet '{}' at row {}",
            id,
            table.name,
            table.display_row(row)
        )))
    }
}
