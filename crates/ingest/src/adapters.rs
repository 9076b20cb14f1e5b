use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataType, Reader, Sheets};
use campaign_core::{CampaignError, CampaignResult};
use tracing::debug;

use crate::types::{Cell, SheetTable};

/// Trait for reading named sheets out of a tabular source.
pub trait SheetAdapter {
    /// Human-readable description of the source, used in logs and reports.
    fn describe(&self) -> String;

    /// Read one sheet by name. A missing sheet is a `DataLoad` error.
    fn read_sheet(&mut self, name: &str) -> CampaignResult<SheetTable>;
}

/// Pick an adapter for `path`: a directory is read as one CSV file per
/// sheet, anything else is opened as a spreadsheet workbook.
pub fn open_source(path: &Path) -> CampaignResult<Box<dyn SheetAdapter>> {
    if path.is_dir() {
        return Ok(Box::new(CsvDirectoryAdapter::new(path)));
    }

    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(Box::new(WorkbookAdapter::open(path)?)),
        _ => Err(CampaignError::DataLoad(format!(
            "unsupported input '{}': expected a workbook (.xlsx, .xls, .ods) or a directory of CSV sheets",
            path.display()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet workbook
// ---------------------------------------------------------------------------

pub struct WorkbookAdapter {
    path: PathBuf,
    workbook: Sheets<std::io::BufReader<std::fs::File>>,
}

impl WorkbookAdapter {
    pub fn open(path: &Path) -> CampaignResult<Self> {
        let workbook = open_workbook_auto(path).map_err(|e| {
            CampaignError::DataLoad(format!("failed to open workbook '{}': {e}", path.display()))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }
}

impl SheetAdapter for WorkbookAdapter {
    fn describe(&self) -> String {
        format!("workbook {}", self.path.display())
    }

    fn read_sheet(&mut self, name: &str) -> CampaignResult<SheetTable> {
        let names = self.workbook.sheet_names();
        if !names.iter().any(|n| n == name) {
            return Err(CampaignError::DataLoad(format!(
                "workbook '{}' has no sheet named '{}' (found: {})",
                self.path.display(),
                name,
                names.join(", ")
            )));
        }

        let range = self.workbook.worksheet_range(name).map_err(|e| {
            CampaignError::DataLoad(format!("failed to read sheet '{name}': {e}"))
        })?;

        // The range starts at the first used cell, not necessarily at A1.
        let header_row = range.start().map_or(0, |(row, _)| row as usize);
        let mut rows = range.rows();
        let columns = rows
            .next()
            .map(|header| header.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();

        let mut cells = Vec::new();
        let mut source_rows = Vec::new();
        for (offset, row) in rows.enumerate() {
            let row: Vec<Cell> = row.iter().map(workbook_cell).collect();
            if !row.iter().all(Cell::is_empty) {
                cells.push(row);
                source_rows.push(header_row + offset + 2);
            }
        }

        debug!(sheet = name, rows = cells.len(), "Read workbook sheet");
        Ok(SheetTable::new(name, columns, cells).with_source_rows(source_rows))
    }
}

fn workbook_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => Cell::Date(date),
            None => Cell::from_text(&cell.to_string()),
        },
        other => Cell::from_text(&other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Directory of CSV files, one per sheet
// ---------------------------------------------------------------------------

pub struct CsvDirectoryAdapter {
    dir: PathBuf,
}

impl CsvDirectoryAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }
}

impl SheetAdapter for CsvDirectoryAdapter {
    fn describe(&self) -> String {
        format!("CSV directory {}", self.dir.display())
    }

    fn read_sheet(&mut self, name: &str) -> CampaignResult<SheetTable> {
        let path = self.sheet_path(name);
        if !path.is_file() {
            return Err(CampaignError::DataLoad(format!(
                "no sheet named '{}': expected file '{}'",
                name,
                path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| CampaignError::DataLoad(format!("failed to open '{}': {e}", path.display())))?;

        let columns = reader
            .headers()
            .map_err(|e| CampaignError::DataLoad(format!("bad header in '{}': {e}", path.display())))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        let mut source_rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| {
                CampaignError::DataLoad(format!("malformed row in '{}': {e}", path.display()))
            })?;
            let row: Vec<Cell> = record.iter().map(Cell::from_text).collect();
            if !row.iter().all(Cell::is_empty) {
                // The reader skips empty lines itself, so count by file line.
                let line = record
                    .position()
                    .map_or(rows.len() + 2, |pos| pos.line() as usize);
                rows.push(row);
                source_rows.push(line);
            }
        }

        debug!(sheet = name, rows = rows.len(), "Read CSV sheet");
        Ok(SheetTable::new(name, columns, rows).with_source_rows(source_rows))
    }
}
