use anyhow::{Result, anyhow};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

/// Columns holding at least one missing value, in table order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValueReport {
    pub row_count: usize,
    pub columns: Vec<ColumnMissing>,
    pub total_missing: usize,
}

/// Read-only reporting over a table: missing-value rates, distinct values,
/// previews and schemas.
pub struct DiagnosticsReporter;

impl DiagnosticsReporter {
    /// Share of missing values in `column`, as a percentage. An empty table reports 0.
    pub fn missing_percentage(&self, df: &DataFrame, column: &str) -> Result<f64> {
        let series = df
            .column(column)
            .map_err(|_| anyhow!("Missing expected column '{}'", column))?;

        if df.height() == 0 {
            return Ok(0.0);
        }

        let missing = missing_count(series)?;
        Ok(missing as f64 / df.height() as f64 * 100.0)
    }

    pub fn missing_value_report(&self, df: &DataFrame) -> Result<MissingValueReport> {
        let mut columns = Vec::new();

        for series in df.get_columns() {
            let missing = missing_count(series)?;
            if missing > 0 {
                columns.push(ColumnMissing {
                    column: series.name().to_string(),
                    missing,
                });
            }
        }

        let total_missing = columns.iter().map(|c| c.missing).sum();

        Ok(MissingValueReport {
            row_count: df.height(),
            columns,
            total_missing,
        })
    }

    pub fn log_missing_percentage(&self, label: &str, df: &DataFrame, column: &str) -> Result<()> {
        let pct = self.missing_percentage(df, column)?;
        info!("{}: {} missing in {}", label, format_percentage(pct), column);
        Ok(())
    }

    pub fn log_missing_report(&self, label: &str, df: &DataFrame) -> Result<()> {
        let report = self.missing_value_report(df)?;

        if report.columns.is_empty() {
            info!("{}: no missing values across {} rows", label, report.row_count);
        } else {
            info!("{}: columns with missing values", label);
            for entry in &report.columns {
                info!("  {:<32} {}", entry.column, entry.missing);
            }
            info!("{}: {} missing values in total", label, report.total_missing);
        }

        debug!("{}", serde_json::to_string(&report)?);
        Ok(())
    }

    /// Distinct values of `column` rendered as text, in order of first
    /// appearance. Nulls show up once as `null`.
    pub fn unique_values(&self, df: &DataFrame, column: &str) -> Result<Vec<String>> {
        let values = df
            .column(column)
            .map_err(|_| anyhow!("Missing expected column '{}'", column))?
            .cast(&DataType::String)?;

        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for value in values.str()?.into_iter() {
            let rendered = value.unwrap_or("null").to_string();
            if seen.insert(rendered.clone()) {
                unique.push(rendered);
            }
        }

        Ok(unique)
    }

    pub fn log_unique_values(&self, label: &str, df: &DataFrame, column: &str) -> Result<()> {
        let unique = self.unique_values(df, column)?;
        info!("{}: {} distinct {} values: {:?}", label, unique.len(), column, unique);
        Ok(())
    }

    pub fn log_preview(&self, label: &str, df: &DataFrame) {
        info!("{} preview:\n{}", label, df.head(Some(5)));
    }

    pub fn log_schema(&self, label: &str, df: &DataFrame) {
        info!("{} schema: {} rows x {} columns", label, df.height(), df.width());
        for series in df.get_columns() {
            info!(
                "  {:<32} {:>8} non-null  {:?}",
                series.name().as_str(),
                series.len() - series.null_count(),
                series.dtype()
            );
        }
    }
}

/// Percentage rendered with two decimals, e.g. `12.50%`.
pub fn format_percentage(pct: f64) -> String {
    format!("{:.2}%", pct)
}

// Nulls always count; NaN counts as missing in float columns too
fn missing_count(series: &Column) -> Result<usize> {
    if series.dtype().is_float() {
        let values = series.cast(&DataType::Float64)?;
        let missing = values
            .f64()?
            .into_iter()
            .filter(|v| v.is_none_or(|x| x.is_nan()))
            .count();
        Ok(missing)
    } else {
        Ok(series.null_count())
    }
}
