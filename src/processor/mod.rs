pub mod column_sanitizer;
pub mod country_canonicalizer;
pub mod diagnostics;
pub mod forecast_joiner;
pub mod key_renamer;
pub mod period_standardizer;
pub mod region_normalizer;
pub mod table_unioner;

pub use column_sanitizer::*;
pub use country_canonicalizer::*;
pub use diagnostics::*;
pub use forecast_joiner::*;
pub use key_renamer::*;
pub use period_standardizer::*;
pub use region_normalizer::*;
pub use table_unioner::*;
