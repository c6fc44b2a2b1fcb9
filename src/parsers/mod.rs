pub mod csv;
pub mod type_conversion;

pub use csv::{CsvLoader, DEFAULT_NA_VALUES};
pub use type_conversion::{convert_value_to_type, parse_number, FieldType};
