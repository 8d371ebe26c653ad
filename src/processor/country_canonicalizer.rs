use anyhow::{Context, Result, anyhow};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, warn};

// Shipped country table; a file named in the pipeline config replaces it
const DEFAULT_COUNTRY_TABLE: &str = include_str!("../configs/countries.toml");

#[derive(Debug, Deserialize)]
struct CountryTable {
    countries: HashMap<String, String>,
}

/// Maps localized or alternate country spellings onto one English name.
/// Values missing from the table pass through, only trimmed.
pub struct CountryCanonicalizer {
    mappings: HashMap<String, String>,
}

impl CountryCanonicalizer {
    pub fn new() -> Result<Self> {
        Self::from_toml(DEFAULT_COUNTRY_TABLE).context("Built-in country table is invalid")
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read country table: {}", path))?;

        Self::from_toml(&content).with_context(|| format!("Failed to parse country table: {}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let table: CountryTable = toml::from_str(content)?;
        Self::from_mappings(table.countries)
    }

    /// A canonical name may not itself be remapped, otherwise applying the
    /// table twice would give a different answer than applying it once.
    pub fn from_mappings(mappings: HashMap<String, String>) -> Result<Self> {
        let mut trimmed: HashMap<String, String> = HashMap::with_capacity(mappings.len());
        for (variant, canonical) in mappings {
            let variant = variant.trim().to_string();
            if let Some(previous) = trimmed.insert(variant.clone(), canonical.trim().to_string()) {
                return Err(anyhow!(
                    "'{}' is listed more than once (also mapped to '{}')",
                    variant,
                    previous
                ));
            }
        }
        let mappings = trimmed;

        for (variant, canonical) in &mappings {
            if let Some(next) = mappings.get(canonical) {
                if next != canonical {
                    return Err(anyhow!(
                        "'{}' maps to '{}', which is itself mapped to '{}'",
                        variant,
                        canonical,
                        next
                    ));
                }
            }
        }

        Ok(CountryCanonicalizer { mappings })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        let trimmed = name.trim();
        match self.mappings.get(trimmed) {
            Some(canonical) => canonical.as_str(),
            None => trimmed,
        }
    }

    /// Distinct values in `column` that are neither a known variant nor a
    /// canonical name.
    pub fn unmapped_values(&self, df: &DataFrame, column: &str) -> Result<BTreeSet<String>> {
        let canonical: HashSet<&str> = self.mappings.values().map(|s| s.as_str()).collect();
        let values = df
            .column(column)
            .map_err(|_| anyhow!("Missing expected country column '{}'", column))?
            .cast(&DataType::String)?;

        let unmapped = values
            .str()?
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .filter(|name| !self.mappings.contains_key(*name) && !canonical.contains(name))
            .map(|name| name.to_string())
            .collect();

        Ok(unmapped)
    }

    pub fn canonicalize(&self, mut df: DataFrame, column: &str) -> Result<DataFrame> {
        let unmapped = self.unmapped_values(&df, column)?;
        if !unmapped.is_empty() {
            warn!(
                "{} country spellings in '{}' have no canonical mapping and are kept as-is: {:?}",
                unmapped.len(),
                column,
                unmapped
            );
        }

        let values = df.column(column)?.cast(&DataType::String)?;
        let mut remapped = 0usize;

        let canonicalized: Vec<Option<String>> = values
            .str()?
            .into_iter()
            .map(|value| {
                value.map(|name| {
                    let canonical = self.canonical_name(name);
                    if canonical != name {
                        remapped += 1;
                    }
                    canonical.to_string()
                })
            })
            .collect();

        info!("Canonicalized {} country values in '{}'", remapped, column);
        df.with_column(Series::new(column.into(), canonicalized))?;

        Ok(df)
    }
}
