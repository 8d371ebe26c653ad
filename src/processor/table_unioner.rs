use anyhow::{Result, anyhow, bail};
use polars::prelude::*;
use tracing::info;

/// Stacks normalized region tables on top of each other.
pub struct TableUnioner;

impl TableUnioner {
    /// Columns are matched by name; a column missing from one table is
    /// filled with nulls and numeric columns are widened to a shared type.
    /// All rows are kept, in input order.
    pub fn union(&self, tables: Vec<DataFrame>) -> Result<DataFrame> {
        if tables.is_empty() {
            return Ok(DataFrame::empty());
        }

        let expected_rows: usize = tables.iter().map(|df| df.height()).sum();
        let frames: Vec<LazyFrame> = tables.into_iter().map(|df| df.lazy()).collect();

        let args = UnionArgs {
            to_supertypes: true,
            ..Default::default()
        };

        let combined = concat_lf_diagonal(frames, args)
            .and_then(|lf| lf.collect())
            .map_err(|e| anyhow!("Failed to combine region tables: {}", e))?;

        if combined.height() != expected_rows {
            bail!(
                "Union produced {} rows but the inputs hold {}",
                combined.height(),
                expected_rows
            );
        }

        info!("Combined table has {} rows x {} columns", combined.height(), combined.width());
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_preserves_row_count_and_order() {
        let americas = df!(
            "MATERIAL_NUMBER" => [100i64, 101],
            "YEAR" => [2022i64, 2022],
            "COMMERCIAL_COUNTRY_NAME" => ["Canada", "Mexico"]
        )
        .unwrap();
        let emea = df!(
            "MATERIAL_NUMBER" => [200i64],
            "YEAR" => [2023i64],
            "COMMERCIAL_COUNTRY_NAME" => ["Germany"]
        )
        .unwrap();
        let asia = df!(
            "MATERIAL_NUMBER" => [300i64, 300, 301],
            "YEAR" => [2023i64, 2023, 2024],
            "COMMERCIAL_COUNTRY_NAME" => ["Japan", "Japan", "China"]
        )
        .unwrap();

        let combined = TableUnioner.union(vec![americas, emea, asia]).unwrap();

        assert_eq!(combined.height(), 2 + 1 + 3);
        let ids: Vec<Option<i64>> = combined
            .column("MATERIAL_NUMBER")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ids, vec![Some(100), Some(101), Some(200), Some(300), Some(300), Some(301)]);
    }

    #[test]
    fn test_union_aligns_columns_by_name() {
        let first = df!("YEAR" => [2022i64], "SEGMENT" => ["Retail"]).unwrap();
        let second = df!("SEGMENT" => ["Hospital"], "YEAR" => [2023i64], "EXTRA" => [1.5f64]).unwrap();

        let combined = TableUnioner.union(vec![first, second]).unwrap();

        assert_eq!(combined.height(), 2);
        let segments = combined.column("SEGMENT").unwrap().str().unwrap();
        assert_eq!(segments.get(1), Some("Hospital"));
        let years = combined.column("YEAR").unwrap().i64().unwrap();
        assert_eq!(years.get(1), Some(2023));
        assert_eq!(combined.column("EXTRA").unwrap().null_count(), 1);
    }

    #[test]
    fn test_union_widens_numeric_columns() {
        let first = df!("SALES" => [1i64]).unwrap();
        let second = df!("SALES" => [2.5f64]).unwrap();

        let combined = TableUnioner.union(vec![first, second]).unwrap();

        let sales = combined.column("SALES").unwrap().f64().unwrap();
        assert_eq!(sales.get(0), Some(1.0));
        assert_eq!(sales.get(1), Some(2.5));
    }

    #[test]
    fn test_union_of_nothing_is_empty() {
        assert_eq!(TableUnioner.union(Vec::new()).unwrap().height(), 0);
    }
}
