use anyhow::{Result, bail};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

use super::{CsvLoader, SheetLoader};

const SHEET_EXTENSIONS: [&str; 5] = ["xls", "xlsx", "xlsm", "xlsb", "ods"];
const DELIMITED_EXTENSIONS: [&str; 3] = ["csv", "txt", "tsv"];

/// Picks the CSV or spreadsheet reader from the file extension.
pub struct TableLoader {
    csv: CsvLoader,
    sheet: SheetLoader,
}

impl TableLoader {
    pub fn new() -> Self {
        TableLoader {
            csv: CsvLoader,
            sheet: SheetLoader,
        }
    }

    pub fn load(&self, path: &str, sheet: Option<&str>, text_columns: &[&str]) -> Result<DataFrame> {
        let file = Path::new(path);
        if !file.exists() {
            bail!("Input file not found: {}", path);
        }

        let extension = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let df = if SHEET_EXTENSIONS.contains(&extension.as_str()) {
            self.sheet.load(file, sheet, text_columns)?
        } else if DELIMITED_EXTENSIONS.contains(&extension.as_str()) {
            self.csv.load(file, text_columns)?
        } else {
            bail!("Unsupported input format '{}' for {}", extension, path);
        };

        info!("Loaded {} rows x {} columns from {}", df.height(), df.width(), path);
        Ok(df)
    }
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::new()
    }
}
