use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::info;

use super::{ColumnSanitizer, CountryCanonicalizer, KeyRenamer, PeriodStandardizer};
use crate::models::{COUNTRY, MATERIAL_NUMBER, Region};

/// Brings one region extract onto the canonical schema:
/// index artifact dropped, material key renamed, period standardized with
/// the region's period layout, country names canonicalized.
pub struct RegionNormalizer<'a> {
    canonicalizer: &'a CountryCanonicalizer,
}

impl<'a> RegionNormalizer<'a> {
    pub fn new(canonicalizer: &'a CountryCanonicalizer) -> Self {
        RegionNormalizer { canonicalizer }
    }

    pub fn normalize(&self, df: DataFrame, region: Region, material_column: &str) -> Result<DataFrame> {
        let df = ColumnSanitizer.drop_index_columns(df)?;

        let df = KeyRenamer
            .rename_key(df, material_column, MATERIAL_NUMBER)
            .with_context(|| format!("Failed to rename material key for {}", region))?;

        let df = PeriodStandardizer
            .standardize(df, region.period_format())
            .with_context(|| format!("Failed to standardize periods for {}", region))?;

        let df = self
            .canonicalizer
            .canonicalize(df, COUNTRY)
            .with_context(|| format!("Failed to canonicalize countries for {}", region))?;

        info!("Normalized {} table: {} rows", region, df.height());
        Ok(df)
    }
}
