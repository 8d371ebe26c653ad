use anyhow::Result;
use polars::prelude::*;

#[path = "../models/mod.rs"]
mod models;

#[path = "../processor/mod.rs"]
mod processor;

use models::{COUNTRY, FORECAST_COUNTRY, MATERIAL_NUMBER, PERIOD, Region};
use processor::{CountryCanonicalizer, DiagnosticsReporter, ForecastJoiner, RegionNormalizer, TableUnioner, format_percentage};

fn main() -> Result<()> {
    println!("=== TESTING RECONCILIATION PIPELINE ON SAMPLE DATA ===\n");

    // Americas reports whole years, EMEA and Asia report year.month
    let americas = df!(
        "Unnamed: 0" => [0i64, 1, 2],
        "MATERIAL_NBR" => [100i64, 101, 102],
        "PERIOD" => ["2022", "2022", "2023"],
        "COMMERCIAL_COUNTRY_NAME" => ["Canadá", "U.S.A", "México"],
        "SEGMENT" => ["Retail", "Hospital", "Retail"],
        "SALES" => [Some(120.0f64), Some(80.5), None]
    )?;

    let emea = df!(
        "MATERIAL_NBR" => [100i64, 200],
        "PERIOD" => ["2022.7", "2023"],
        "COMMERCIAL_COUNTRY_NAME" => ["Deutschland", "Atlantis"],
        "SEGMENT" => ["Retail", "Clinic"],
        "SALES" => [Some(55.0f64), Some(12.0)]
    )?;

    let asia = df!(
        "MATERIAL_NBR" => [300i64],
        "PERIOD" => ["2022.12"],
        "COMMERCIAL_COUNTRY_NAME" => ["Nippon"],
        "SEGMENT" => ["Retail"],
        "SALES" => [Some(9.5f64)]
    )?;

    let forecast = df!(
        "MATERIAL_NUMBER" => [100i64, 101, 100, 300, 300],
        "YEAR" => [2022i64, 2022, 2022, 2022, 2022],
        "CMRCL_CNTRY_DSC" => ["Canada", "United States", "Germany", "Japan", "Japan"],
        "FORECAST_QTY" => [130.0f64, 75.0, 60.0, 5.0, 6.0]
    )?;

    let canonicalizer = CountryCanonicalizer::new()?;
    let normalizer = RegionNormalizer::new(&canonicalizer);
    let diagnostics = DiagnosticsReporter;

    println!("0. Raw Americas periods: {:?}", diagnostics.unique_values(&americas, PERIOD)?);
    println!("   Raw Americas countries: {:?}\n", diagnostics.unique_values(&americas, COUNTRY)?);

    let americas = normalizer.normalize(americas, Region::Americas, "MATERIAL_NBR")?;
    let emea = normalizer.normalize(emea, Region::Emea, "MATERIAL_NBR")?;
    let asia = normalizer.normalize(asia, Region::Asia, "MATERIAL_NBR")?;

    println!("1. Normalized Americas:");
    println!("{}", americas);
    println!("   Standardized countries: {:?}", diagnostics.unique_values(&americas, COUNTRY)?);
    println!("\n2. Normalized EMEA:");
    println!("{}", emea);
    println!("\n3. Normalized Asia:");
    println!("{}", asia);

    let region_rows = americas.height() + emea.height() + asia.height();
    let combined = TableUnioner.union(vec![americas, emea, asia])?;

    println!("\n4. Combined ({} rows, inputs held {}):", combined.height(), region_rows);
    println!("{}", combined);

    let joined = ForecastJoiner::new(FORECAST_COUNTRY).join(combined, forecast)?;

    println!("\n5. Joined with forecast (FINAL RESULT):");
    println!("{}", joined);

    println!("\n=== MISSING VALUE ANALYSIS ===");
    let pct = diagnostics.missing_percentage(&joined, MATERIAL_NUMBER)?;
    println!("{} missing: {}", MATERIAL_NUMBER, format_percentage(pct));

    let report = diagnostics.missing_value_report(&joined)?;
    for entry in &report.columns {
        println!("   {}: {}", entry.column, entry.missing);
    }
    println!("   total: {}", report.total_missing);

    println!("\n✅ Expected: 5 joined rows. Mexico/2023 and the unmapped Atlantis row drop out,");
    println!("   material 300 fans out to two rows against the duplicated Japan forecast.");

    Ok(())
}
