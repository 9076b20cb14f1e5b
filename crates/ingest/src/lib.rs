//! Dataset loading: reads the `Target`, `Control` and `Purchases` sheets from
//! a workbook (or a directory of per-sheet CSV files) and converts them into a
//! typed [`CampaignDataset`](campaign_core::CampaignDataset).

pub mod adapters;
pub mod dataset;
pub mod types;

pub use adapters::{open_source, CsvDirectoryAdapter, SheetAdapter, WorkbookAdapter};
pub use dataset::{load_dataset, load_dataset_from};
pub use types::{Cell, SheetTable};
