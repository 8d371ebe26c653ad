use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Reads spreadsheet exports (xls, xlsx, xlsb, ods) through calamine.
pub struct SheetLoader;

impl SheetLoader {
    pub fn load(&self, path: &Path, sheet: Option<&str>, text_columns: &[&str]) -> Result<DataFrame> {
        // calamine picks the reader from the file extension
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open spreadsheet: {}", path.display()))?;

        let sheet_name = match sheet {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| anyhow!("Spreadsheet has no sheets: {}", path.display()))?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet '{}' from {}", sheet_name, path.display()))?;

        let (row_count, col_count) = range.get_size();
        debug!(
            "Sheet '{}' in {}: {} rows x {} columns",
            sheet_name,
            path.display(),
            row_count,
            col_count
        );

        let rows: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();
        rows_to_dataframe(&rows, text_columns)
            .with_context(|| format!("Failed to convert sheet '{}' from {}", sheet_name, path.display()))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl CellValue {
    fn from_cell(cell: Option<&Data>) -> Self {
        match cell {
            None | Some(Data::Empty) | Some(Data::Error(_)) => CellValue::Missing,
            Some(Data::Int(i)) => CellValue::Int(*i),
            Some(Data::Float(f)) => {
                // Spreadsheets store every number as a float; whole values are ids and years
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    CellValue::Int(*f as i64)
                } else {
                    CellValue::Float(*f)
                }
            }
            Some(Data::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    CellValue::Missing
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            }
            Some(other) => CellValue::Text(other.to_string()),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(f.to_string()),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Missing => None,
        }
    }
}

/// Build a DataFrame from raw sheet rows, the first row being the header.
/// Blank header cells are named `Unnamed: <index>`.
pub fn rows_to_dataframe(rows: &[Vec<Data>], text_columns: &[&str]) -> Result<DataFrame> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Data::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Data::String(_) | Data::Empty => format!("Unnamed: {}", idx),
            other => other.to_string(),
        })
        .collect();

    let mut columns = Vec::with_capacity(headers.len());

    for (idx, name) in headers.iter().enumerate() {
        let cells: Vec<CellValue> = body
            .iter()
            .map(|row| CellValue::from_cell(row.get(idx)))
            .collect();

        let series = if text_columns.contains(&name.as_str()) {
            text_series(name, &cells)
        } else {
            infer_series(name, &cells)
        };

        columns.push(series.into());
    }

    DataFrame::new(columns).map_err(|e| anyhow!("Failed to create DataFrame: {}", e))
}

fn text_series(name: &str, cells: &[CellValue]) -> Series {
    let values: Vec<Option<String>> = cells.iter().map(CellValue::as_text).collect();
    Series::new(name.into(), values)
}

fn infer_series(name: &str, cells: &[CellValue]) -> Series {
    let present = cells.iter().filter(|c| **c != CellValue::Missing);

    let mut all_int = true;
    let mut all_numeric = true;
    for cell in present {
        match cell {
            CellValue::Int(_) => {}
            CellValue::Float(_) => all_int = false,
            _ => {
                all_int = false;
                all_numeric = false;
            }
        }
    }

    if all_int {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                CellValue::Int(i) => Some(*i),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else if all_numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                CellValue::Int(i) => Some(*i as f64),
                CellValue::Float(f) => Some(*f),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else {
        text_series(name, cells)
    }
}
