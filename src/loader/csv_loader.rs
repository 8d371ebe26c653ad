use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct CsvLoader;

impl CsvLoader {
    /// Read a delimited export with a header row. Columns named in
    /// `text_columns` are kept as strings so period values such as
    /// `2023.10` survive untouched instead of being inferred as floats.
    pub fn load(&self, path: &Path, text_columns: &[&str]) -> Result<DataFrame> {
        let mut overwrite = Schema::with_capacity(text_columns.len());
        for name in text_columns {
            overwrite.with_column((*name).into(), DataType::String);
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .with_schema_overwrite(Some(Arc::new(overwrite)))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?
            .finish()
            .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?;

        debug!(
            "Read {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );

        Ok(df)
    }
}
