use anyhow::{Context, Result, bail};
use polars::prelude::*;

pub struct KeyRenamer;

impl KeyRenamer {
    /// Rename the source-specific material id column to the unified name.
    /// Renaming a column onto itself is a no-op.
    pub fn rename_key(&self, mut df: DataFrame, from: &str, to: &str) -> Result<DataFrame> {
        if df.column(from).is_err() {
            bail!("Missing expected key column '{}'", from);
        }

        if from != to {
            df.rename(from, to.into())
                .with_context(|| format!("Failed to rename '{}' to '{}'", from, to))?;
        }

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MATERIAL_NUMBER;

    #[test]
    fn test_rename_material_column() {
        let df = df!("MATERIAL_NBR" => [100i64, 101], "QTY" => [1i64, 2]).unwrap();

        let renamed = KeyRenamer.rename_key(df, "MATERIAL_NBR", MATERIAL_NUMBER).unwrap();

        assert!(renamed.column("MATERIAL_NBR").is_err());
        let ids = renamed.column(MATERIAL_NUMBER).unwrap().i64().unwrap();
        assert_eq!(ids.get(1), Some(101));
    }

    #[test]
    fn test_rename_to_same_name_is_noop() {
        let df = df!("MATERIAL_NUMBER" => [100i64]).unwrap();

        let renamed = KeyRenamer
            .rename_key(df.clone(), MATERIAL_NUMBER, MATERIAL_NUMBER)
            .unwrap();

        assert!(renamed.equals(&df));
    }

    #[test]
    fn test_missing_key_column_is_fatal() {
        let df = df!("SKU" => ["A-1"]).unwrap();

        let err = KeyRenamer.rename_key(df, "MATERIAL_NBR", MATERIAL_NUMBER).unwrap_err();
        assert!(err.to_string().contains("MATERIAL_NBR"));
    }
}
