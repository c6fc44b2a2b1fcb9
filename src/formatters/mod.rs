mod csv;

pub use csv::CsvWriter;
