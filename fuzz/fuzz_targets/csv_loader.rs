#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use vgclean::parsers::CsvLoader;
use vgclean::{CleaningStats, Pipeline};

fuzz_target!(|data: &[u8]| {
    // Load errors are fine; the stages must never panic on a loaded table.
    if let Ok(table) = CsvLoader::new().load_reader(data, Path::new("fuzz.csv")) {
        let mut stats = CleaningStats::new();
        let _ = Pipeline::standard().run(table, &mut stats);
    }
});
