use anyhow::{Result, anyhow, bail};
use polars::prelude::*;
use tracing::{info, warn};

use crate::models::{COUNTRY, MATERIAL_NUMBER, YEAR};

const JOIN_COUNTRY: &str = "__forecast_join_country";

/// Inner-joins combined actuals against the forecast on
/// (material, year, country). Duplicate keys fan out like any relational join.
pub struct ForecastJoiner {
    forecast_country_column: String,
}

impl ForecastJoiner {
    pub fn new(forecast_country_column: &str) -> Self {
        ForecastJoiner {
            forecast_country_column: forecast_country_column.to_string(),
        }
    }

    pub fn join(&self, actuals: DataFrame, forecast: DataFrame) -> Result<DataFrame> {
        let forecast_country = self.forecast_country_column.as_str();

        require_columns(&actuals, "combined actuals", &[MATERIAL_NUMBER, YEAR, COUNTRY])?;
        require_columns(&forecast, "forecast", &[MATERIAL_NUMBER, YEAR, forecast_country])?;

        let actual_rows = actuals.height();

        let actuals = narrow_whole_floats(actuals, MATERIAL_NUMBER)?;
        let forecast = narrow_whole_floats(forecast, MATERIAL_NUMBER)?;
        let material_type = shared_key_type(
            actuals.column(MATERIAL_NUMBER)?.dtype(),
            forecast.column(MATERIAL_NUMBER)?.dtype(),
        );

        // Both sides need identical key types before polars will match them
        let left = actuals.lazy().with_columns([
            col(MATERIAL_NUMBER).cast(material_type.clone()),
            col(YEAR).cast(DataType::Int64),
            col(COUNTRY).cast(DataType::String),
        ]);
        // The forecast country is matched through a copy so the original
        // column survives the join instead of being merged into the left key
        let right = forecast.lazy().with_columns([
            col(MATERIAL_NUMBER).cast(material_type),
            col(YEAR).cast(DataType::Int64),
            col(forecast_country).cast(DataType::String).alias(JOIN_COUNTRY),
        ]);

        let joined = left
            .join(
                right,
                [col(MATERIAL_NUMBER), col(YEAR), col(COUNTRY)],
                [col(MATERIAL_NUMBER), col(YEAR), col(JOIN_COUNTRY)],
                JoinArgs {
                    how: JoinType::Inner,
                    suffix: Some("_forecast".into()),
                    maintain_order: MaintainOrderJoin::Left,
                    ..Default::default()
                },
            )
            .collect()
            .map_err(|e| anyhow!("Failed to join actuals with forecast: {}", e))?;

        // Coalescing already folds the helper key away; drop it if it lingers
        let joined = joined.drop_many([JOIN_COUNTRY]);

        if joined.height() == 0 {
            warn!(
                "Join of {} actual rows against the forecast produced no rows",
                actual_rows
            );
        } else {
            info!(
                "Joined {} actual rows with the forecast into {} rows",
                actual_rows,
                joined.height()
            );
        }

        Ok(joined)
    }
}

/// Float ids holding only whole values (`100.0`) become `Int64`, so they
/// compare equal to integer ids from other sources.
fn narrow_whole_floats(mut df: DataFrame, column: &str) -> Result<DataFrame> {
    let key = df.column(column)?;
    if !key.dtype().is_float() {
        return Ok(df);
    }

    let whole = key
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .flatten()
        .all(|v| v.is_finite() && v.fract() == 0.0);

    if whole {
        let narrowed = key.cast(&DataType::Int64)?;
        df.with_column(narrowed)?;
    }

    Ok(df)
}

/// Numeric keys compare numerically; text on either side means text on both.
fn shared_key_type(left: &DataType, right: &DataType) -> DataType {
    let numeric = |dtype: &DataType| dtype.is_integer() || dtype.is_float();

    if numeric(left) && numeric(right) {
        if left.is_float() || right.is_float() {
            DataType::Float64
        } else {
            DataType::Int64
        }
    } else {
        DataType::String
    }
}

fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    for name in columns {
        if df.column(name).is_err() {
            bail!("Missing expected column '{}' in {} table", name, table);
        }
    }
    Ok(())
}
