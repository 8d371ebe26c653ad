use anyhow::Result;
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

/// Drops the stray index column left behind when an extract was written
/// together with its row index.
pub struct ColumnSanitizer;

impl ColumnSanitizer {
    pub fn drop_index_columns(&self, df: DataFrame) -> Result<DataFrame> {
        // "Unnamed: 0" can sit anywhere; blank or generated names only count in the index slot
        let unnamed = Regex::new(r"^Unnamed: \d+$")?;
        let blank_leading = Regex::new(r"^(column_1)?$")?;

        let artifacts: Vec<String> = df
            .get_column_names()
            .iter()
            .enumerate()
            .filter(|(idx, name)| {
                unnamed.is_match(name) || (*idx == 0 && blank_leading.is_match(name))
            })
            .map(|(_, name)| name.to_string())
            .collect();

        if artifacts.is_empty() {
            return Ok(df);
        }

        debug!("Dropping index artifact columns: {:?}", artifacts);
        Ok(df.drop_many(artifacts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_unnamed_index_column() {
        let df = df!(
            "Unnamed: 0" => [0i64, 1],
            "MATERIAL_NBR" => [100i64, 101],
            "PERIOD" => ["2022", "2023"]
        )
        .unwrap();

        let cleaned = ColumnSanitizer.drop_index_columns(df).unwrap();

        assert_eq!(cleaned.width(), 2);
        assert!(cleaned.column("Unnamed: 0").is_err());
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_drops_blank_leading_header() {
        let df = df!(
            "column_1" => [0i64],
            "MATERIAL_NBR" => [100i64]
        )
        .unwrap();

        let cleaned = ColumnSanitizer.drop_index_columns(df).unwrap();
        assert_eq!(cleaned.width(), 1);
        assert!(cleaned.column("MATERIAL_NBR").is_ok());
    }

    #[test]
    fn test_table_without_artifact_is_unchanged() {
        let df = df!(
            "MATERIAL_NBR" => [100i64],
            "UNNAMED_SEGMENT" => ["Retail"],
            "column_1" => [1i64]
        )
        .unwrap();

        let cleaned = ColumnSanitizer.drop_index_columns(df.clone()).unwrap();
        assert!(cleaned.equals(&df));
    }
}
