pub mod csv_loader;
pub mod sheet_loader;
pub mod table_loader;

pub use csv_loader::*;
pub use sheet_loader::*;
pub use table_loader::*;
