use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use polars::prelude::*;

use crate::models::{PERIOD, PeriodFormat, YEAR};

// Characters accepted between the year and month parts of a period
const SEPARATORS: [char; 3] = ['.', '-', '/'];

/// Rewrites the `PERIOD` column into `YYYY.MM` form and derives `YEAR`
/// from it, using the period layout of the table's region.
pub struct PeriodStandardizer;

impl PeriodStandardizer {
    pub fn standardize(&self, mut df: DataFrame, format: PeriodFormat) -> Result<DataFrame> {
        let raw = df
            .column(PERIOD)
            .map_err(|_| anyhow!("Missing expected period column '{}'", PERIOD))?
            .cast(&DataType::String)?;
        let raw = raw.str()?;

        let mut periods = Vec::with_capacity(raw.len());
        let mut years = Vec::with_capacity(raw.len());

        for (row, value) in raw.into_iter().enumerate() {
            let value = value.ok_or_else(|| anyhow!("Row {}: {} is missing", row, PERIOD))?;
            let period = standardize_period(format, value)
                .with_context(|| format!("Row {}: invalid {} value '{}'", row, PERIOD, value))?;

            years.push(year_of(&period)?);
            periods.push(period);
        }

        df.with_column(Series::new(PERIOD.into(), periods))?;
        df.with_column(Series::new(YEAR.into(), years))?;

        Ok(df)
    }
}

/// Canonical `YYYY.MM` form of a single raw period value.
pub fn standardize_period(format: PeriodFormat, raw: &str) -> Result<String> {
    let raw = raw.trim();

    let (year, month) = match format {
        PeriodFormat::YearOnly => (parse_year(raw)?, 12),
        PeriodFormat::YearMonth => match raw.split_once(SEPARATORS) {
            Some((year, month)) => (parse_year(year)?, parse_part(month, "month")?),
            None => (parse_year(raw)?, 1),
        },
    };
    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        bail!("month {} is out of range", month);
    }

    Ok(format!("{:04}.{:02}", year, month))
}

/// Year encoded in the leading four characters of a canonical period.
pub fn year_of(period: &str) -> Result<i64> {
    let prefix = period
        .get(..4)
        .ok_or_else(|| anyhow!("period '{}' is shorter than four characters", period))?;

    prefix
        .parse::<i64>()
        .with_context(|| format!("period '{}' does not start with a year", period))
}

// Exactly four digits; short years like "22" are not padded into "0022"
fn parse_year(part: &str) -> Result<i32> {
    let part = part.trim();
    if part.len() != 4 || !part.chars().all(|c| c.is_ascii_digit()) {
        bail!("year '{}' is not a four-digit number", part);
    }
    parse_part(part, "year")
}

fn parse_part<T: std::str::FromStr>(part: &str, what: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let part = part.trim();
    part.parse::<T>()
        .map_err(|e| anyhow!("{} '{}' is not an integer: {}", what, part, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_only_appends_december() {
        for year in [1999, 2022, 2023] {
            let raw = year.to_string();
            assert_eq!(
                standardize_period(PeriodFormat::YearOnly, &raw).unwrap(),
                format!("{}.12", year)
            );
        }
    }

    #[test]
    fn test_year_month_pads_month() {
        assert_eq!(standardize_period(PeriodFormat::YearMonth, "2023.7").unwrap(), "2023.07");
        assert_eq!(standardize_period(PeriodFormat::YearMonth, "2023.10").unwrap(), "2023.10");
        assert_eq!(standardize_period(PeriodFormat::YearMonth, "2023-03").unwrap(), "2023.03");
        assert_eq!(standardize_period(PeriodFormat::YearMonth, " 2023/011 ").unwrap(), "2023.11");
    }

    #[test]
    fn test_year_month_bare_year_is_january() {
        assert_eq!(standardize_period(PeriodFormat::YearMonth, "2023").unwrap(), "2023.01");
    }

    #[test]
    fn test_malformed_periods_are_rejected() {
        assert!(standardize_period(PeriodFormat::YearOnly, "FY2022").is_err());
        assert!(standardize_period(PeriodFormat::YearOnly, "2022.5").is_err());
        assert!(standardize_period(PeriodFormat::YearMonth, "2023.Q1").is_err());
        assert!(standardize_period(PeriodFormat::YearMonth, "2023.13").is_err());
        assert!(standardize_period(PeriodFormat::YearMonth, "2023.0").is_err());
        assert!(standardize_period(PeriodFormat::YearMonth, "").is_err());
        assert!(standardize_period(PeriodFormat::YearMonth, "12023.1").is_err());
    }

    #[test]
    fn test_short_years_are_rejected() {
        assert!(standardize_period(PeriodFormat::YearOnly, "22").is_err());
        assert!(standardize_period(PeriodFormat::YearMonth, "22.1").is_err());
        assert!(standardize_period(PeriodFormat::YearMonth, "923").is_err());
        assert!(standardize_period(PeriodFormat::YearOnly, "+202").is_err());

        let df = df!("PERIOD" => [22i64]).unwrap();
        assert!(PeriodStandardizer.standardize(df, PeriodFormat::YearOnly).is_err());
    }

    #[test]
    fn test_year_of_reads_leading_digits() {
        assert_eq!(year_of("2022.12").unwrap(), 2022);
        assert!(year_of("22").is_err());
    }

    #[test]
    fn test_standardize_integer_year_column() {
        let df = df!("MATERIAL_NUMBER" => [100i64, 101], "PERIOD" => [2022i64, 2021]).unwrap();

        let df = PeriodStandardizer.standardize(df, PeriodFormat::YearOnly).unwrap();

        let periods = df.column("PERIOD").unwrap().str().unwrap();
        assert_eq!(periods.get(0), Some("2022.12"));
        assert_eq!(periods.get(1), Some("2021.12"));

        let years = df.column("YEAR").unwrap().i64().unwrap();
        assert_eq!(years.get(0), Some(2022));
        assert_eq!(years.get(1), Some(2021));
    }

    #[test]
    fn test_standardize_text_period_column() {
        let df = df!("PERIOD" => ["2023.7", "2023", "2024.12"]).unwrap();

        let df = PeriodStandardizer.standardize(df, PeriodFormat::YearMonth).unwrap();

        let periods: Vec<Option<&str>> = df.column("PERIOD").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(periods, vec![Some("2023.07"), Some("2023.01"), Some("2024.12")]);

        let years: Vec<Option<i64>> = df.column("YEAR").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(years, vec![Some(2023), Some(2023), Some(2024)]);
    }

    #[test]
    fn test_bad_row_is_fatal_and_named() {
        let df = df!("PERIOD" => ["2023.1", "n/a"]).unwrap();

        let err = PeriodStandardizer.standardize(df, PeriodFormat::YearMonth).unwrap_err();
        assert!(format!("{:#}", err).contains("Row 1"));
    }

    #[test]
    fn test_null_period_is_fatal() {
        let df = df!("PERIOD" => [Some("2023.1"), None]).unwrap();

        assert!(PeriodStandardizer.standardize(df, PeriodFormat::YearMonth).is_err());
    }

    #[test]
    fn test_missing_period_column_is_fatal() {
        let df = df!("MATERIAL_NUMBER" => [1i64]).unwrap();

        assert!(PeriodStandardizer.standardize(df, PeriodFormat::YearOnly).is_err());
    }
}
