use anyhow::{Context, Result};
use config::{ForecastSource, PipelineConfig, RegionSource};
use loader::TableLoader;
use models::{COUNTRY, MATERIAL_NUMBER, PERIOD};
use polars::prelude::*;
use processor::{
    ColumnSanitizer, CountryCanonicalizer, DiagnosticsReporter, ForecastJoiner, KeyRenamer,
    RegionNormalizer, TableUnioner,
};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod loader;
mod models;
mod processor;

const DEFAULT_CONFIG_PATH: &str = "src/configs/pipeline.toml";

fn main() -> Result<()> {
    // Load environment variables first so RUST_LOG from .env is honoured
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = env::var("PIPELINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = PipelineConfig::from_file(&config_path)
        .context("Failed to load pipeline configuration")?;

    info!("🚀 Starting sales reconciliation ({} region sources)", config.regions.len());

    let canonicalizer = match &config.country_map {
        Some(path) => CountryCanonicalizer::from_file(path)?,
        None => CountryCanonicalizer::new()?,
    };
    info!("Loaded country table with {} spellings", canonicalizer.len());

    let loader = TableLoader::new();
    let normalizer = RegionNormalizer::new(&canonicalizer);
    let diagnostics = DiagnosticsReporter;

    let mut regions = Vec::with_capacity(config.regions.len());
    for source in config.ordered_regions() {
        info!("\n=== Processing region: {} ({}) ===", source.name, source.region);
        let df = process_region(source, &loader, &normalizer, &diagnostics)
            .with_context(|| format!("Failed to process region source '{}'", source.name))?;
        regions.push(df);
    }

    info!("\n=== Processing forecast ===");
    let forecast = process_forecast(&config.forecast, &loader, &diagnostics)
        .context("Failed to process forecast source")?;

    info!("\n=== Combining regions ===");
    let combined = TableUnioner.union(regions)?;
    diagnostics.log_schema("Combined", &combined);

    info!("\n=== Joining with forecast ===");
    let joined = ForecastJoiner::new(&config.forecast.country_column).join(combined, forecast)?;

    diagnostics.log_preview("Joined", &joined);
    diagnostics.log_schema("Joined", &joined);
    diagnostics.log_missing_percentage("Joined", &joined, MATERIAL_NUMBER)?;
    diagnostics.log_missing_report("Joined", &joined)?;

    info!("🎉 Reconciliation finished with {} joined rows", joined.height());
    Ok(())
}

fn process_region(
    source: &RegionSource,
    loader: &TableLoader,
    normalizer: &RegionNormalizer,
    diagnostics: &DiagnosticsReporter,
) -> Result<DataFrame> {
    let raw = loader.load(&source.path, source.sheet.as_deref(), &[PERIOD])?;
    diagnostics.log_preview(&source.name, &raw);
    diagnostics.log_schema(&format!("{} (raw)", source.name), &raw);
    diagnostics.log_missing_percentage(&source.name, &raw, &source.material_column)?;
    diagnostics.log_unique_values(&format!("{} (raw)", source.name), &raw, PERIOD)?;
    diagnostics.log_unique_values(&format!("{} (raw)", source.name), &raw, COUNTRY)?;

    let df = normalizer.normalize(raw, source.region, &source.material_column)?;
    diagnostics.log_unique_values(&source.name, &df, PERIOD)?;
    diagnostics.log_unique_values(&source.name, &df, COUNTRY)?;
    diagnostics.log_schema(&source.name, &df);

    Ok(df)
}

fn process_forecast(
    source: &ForecastSource,
    loader: &TableLoader,
    diagnostics: &DiagnosticsReporter,
) -> Result<DataFrame> {
    let raw = loader.load(&source.path, source.sheet.as_deref(), &[])?;
    diagnostics.log_preview("Forecast", &raw);
    diagnostics.log_schema("Forecast (raw)", &raw);

    let df = ColumnSanitizer.drop_index_columns(raw)?;
    let df = KeyRenamer.rename_key(df, &source.material_column, MATERIAL_NUMBER)?;
    diagnostics.log_missing_percentage("Forecast", &df, MATERIAL_NUMBER)?;
    diagnostics.log_schema("Forecast", &df);

    Ok(df)
}
