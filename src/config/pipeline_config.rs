use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{FORECAST_COUNTRY, MATERIAL_NUMBER, Region};

/// Describes where the four pipeline inputs live and how their
/// source-specific headers map onto the canonical schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Optional TOML file overriding the built-in country table
    pub country_map: Option<String>,
    pub regions: Vec<RegionSource>,
    pub forecast: ForecastSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSource {
    pub name: String,
    pub region: Region,
    pub path: String,
    pub material_column: String,
    /// Worksheet to read for spreadsheet sources; the first sheet otherwise
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSource {
    pub path: String,
    #[serde(default = "default_forecast_material_column")]
    pub material_column: String,
    #[serde(default = "default_forecast_country_column")]
    pub country_column: String,
    pub sheet: Option<String>,
}

fn default_forecast_material_column() -> String {
    MATERIAL_NUMBER.to_string()
}

fn default_forecast_country_column() -> String {
    FORECAST_COUNTRY.to_string()
}

impl PipelineConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config file: {}", path))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse pipeline config file: {}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Every region must be configured exactly once, and every source needs a path.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for source in &self.regions {
            if source.path.trim().is_empty() {
                return Err(anyhow!("Region source '{}' has an empty path", source.name));
            }
            if source.material_column.trim().is_empty() {
                return Err(anyhow!(
                    "Region source '{}' has an empty material column",
                    source.name
                ));
            }
            if !seen.insert(source.region) {
                return Err(anyhow!("Region {} is configured more than once", source.region));
            }
        }

        for region in Region::ALL {
            if !seen.contains(&region) {
                return Err(anyhow!("No source configured for region {}", region));
            }
        }

        if self.forecast.path.trim().is_empty() {
            return Err(anyhow!("Forecast source has an empty path"));
        }

        Ok(())
    }

    /// Region sources in union order: Americas, EMEA, Asia.
    pub fn ordered_regions(&self) -> Vec<&RegionSource> {
        Region::ALL
            .iter()
            .filter_map(|region| self.regions.iter().find(|s| s.region == *region))
            .collect()
    }
}
