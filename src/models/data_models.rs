use serde::{Deserialize, Serialize};
use std::fmt;

// Canonical column names shared by every normalized table
pub const MATERIAL_NUMBER: &str = "MATERIAL_NUMBER";
pub const COUNTRY: &str = "COMMERCIAL_COUNTRY_NAME";
pub const PERIOD: &str = "PERIOD";
pub const YEAR: &str = "YEAR";

// Forecast exports describe the country under a different header
pub const FORECAST_COUNTRY: &str = "CMRCL_CNTRY_DSC";

/// Geography a sales extract belongs to. Each region exports its periods
/// in its own layout, see [`Region::period_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Americas,
    Emea,
    Asia,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Americas, Region::Emea, Region::Asia];

    pub fn period_format(self) -> PeriodFormat {
        match self {
            Region::Americas => PeriodFormat::YearOnly,
            Region::Emea | Region::Asia => PeriodFormat::YearMonth,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Americas => "Americas",
            Region::Emea => "EMEA",
            Region::Asia => "Asia",
        };
        f.write_str(name)
    }
}

/// How a region encodes its `PERIOD` values before standardization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFormat {
    /// Bare year, aggregated at year end (`2022` -> `2022.12`)
    YearOnly,
    /// `year.month`, or a bare year meaning January (`2023.7` -> `2023.07`, `2023` -> `2023.01`)
    YearMonth,
}
