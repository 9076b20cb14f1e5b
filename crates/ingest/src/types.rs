use campaign_core::{CampaignError, CampaignResult};
use chrono::NaiveDate;
use serde::Serialize;

/// A single untyped sheet cell, as read from the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Build a cell from raw text; whitespace-only text is empty.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// One named sheet: a header row plus data rows.
#[derive(Debug, Clone, Serialize)]
pub struct SheetTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// 1-based spreadsheet row of each entry in `rows`. Blank rows are
    /// dropped on read, so this is not always `index + 2`.
    pub source_rows: Vec<usize>,
}

impl SheetTable {
    /// Table whose data rows sit directly under the header with no gaps.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let source_rows = (2..rows.len() + 2).collect();
        Self {
            name: name.into(),
            columns: columns.into_iter().map(|c| c.trim().to_string()).collect(),
            rows,
            source_rows,
        }
    }

    /// Replace the row numbering with the positions the rows were read from.
    pub fn with_source_rows(mut self, source_rows: Vec<usize>) -> Self {
        debug_assert_eq!(source_rows.len(), self.rows.len());
        self.source_rows = source_rows;
        self
    }

    /// Position of a required column, or a `DataLoad` error naming the sheet.
    pub fn column_index(&self, column: &str) -> CampaignResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                CampaignError::DataLoad(format!(
                    "sheet '{}' is missing required column '{}' (found: {})",
                    self.name,
                    column,
                    self.columns.join(", ")
                ))
            })
    }

    /// Cell at `(row, col)`; short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    /// Row number as a spreadsheet user would see it (header is row 1).
    pub fn display_row(&self, row: usize) -> usize {
        self.source_rows.get(row).copied().unwrap_or(row + 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_from_text() {
        assert_eq!(Cell::from_text("  "), Cell::Empty);
        assert_eq!(Cell::from_text(" 2019-Jan "), Cell::Text("2019-Jan".into()));
    }

    #[test]
    fn test_column_index_missing() {
        let table = SheetTable::new("Target", vec![" customer_id ".into()], vec![]);
        assert_eq!(table.column_index("customer_id").unwrap(), 0);
        let err = table.column_index("target_month").unwrap_err();
        assert!(matches!(err, CampaignError::DataLoad(_)));
        assert!(err.to_string().contains("target_month"));
    }

    #[test]
    fn test_short_rows_read_empty() {
        let table = SheetTable::new(
            "Purchases",
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Number(1.0)]],
        );
        assert_eq!(table.cell(0, 0), &Cell::Number(1.0));
        assert!(table.cell(0, 1).is_empty());
        assert!(table.cell(5, 0).is_empty());
    }

    #[test]
    fn test_display_row_follows_source_positions() {
        let rows = vec![vec![Cell::Number(1.0)], vec![Cell::Number(2.0)]];
        let dense = SheetTable::new("Control", vec!["customer_id".into()], rows.clone());
        assert_eq!(dense.display_row(1), 3);

        let sparse = SheetTable::new("Control", vec!["customer_id".into()], rows)
            .with_source_rows(vec![2, 5]);
        assert_eq!(sparse.display_row(0), 2);
        assert_eq!(sparse.display_row(1), 5);
    }
}
